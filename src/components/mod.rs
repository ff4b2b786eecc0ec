pub mod ui;

pub(crate) mod folder_tree;
pub(crate) mod links_table;
pub(crate) mod move_items;
pub(crate) mod new_folder;
pub(crate) mod notices;

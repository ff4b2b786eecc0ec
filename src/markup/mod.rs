//! Reads the server-rendered page the app takes over: the folder tree list
//! and the first table body.

use crate::models::FolderNode;
use crate::util::dom;
use web_sys::{Document, Element};

pub(crate) const TREE_SOURCE_SELECTOR: &str = "#folder-tree";
pub(crate) const TABLE_SOURCE_SELECTOR: &str = ".vested-table";

/// What the server page hands over at startup.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct PageSource {
    pub folders: Vec<FolderNode>,
    pub table_html: String,
}

impl PageSource {
    /// Reads the page, then hides the tree list and drops the server table
    /// so that only the mounted copies stay interactive.
    pub fn take_from(doc: &Document) -> Self {
        let mut source = Self::default();

        if let Ok(Some(tree)) = doc.query_selector(TREE_SOURCE_SELECTOR) {
            source.folders = read_folders(&tree);
            dom::set_shown(&tree, false);
        }

        if let Ok(Some(table)) = doc.query_selector(TABLE_SOURCE_SELECTOR) {
            if let Some(body) = dom::query(&table, "tbody") {
                source.table_html = body.inner_html();
            }
            let pane = dom::closest(&table, ".tab-pane").unwrap_or(table);
            pane.remove();
        }

        source
    }
}

/// Folder nodes from nested `li[data-folder_id]` items; nesting gives parents.
pub(crate) fn read_folders(root: &Element) -> Vec<FolderNode> {
    dom::query_all(root, "li[data-folder_id]")
        .into_iter()
        .filter_map(|li| {
            let id = dom::attr(&li, "data-folder_id")?;
            let parent_id = li
                .parent_element()
                .and_then(|p| dom::closest(&p, "li[data-folder_id]"))
                .and_then(|p| dom::attr(&p, "data-folder_id"));
            Some(FolderNode {
                id,
                parent_id,
                name: folder_label(&li),
            })
        })
        .collect()
}

/// The item's own label: its first direct link, else its direct text.
fn folder_label(li: &Element) -> String {
    if let Some(a) = dom::query(li, ":scope > a") {
        return a.text_content().unwrap_or_default().trim().to_string();
    }
    let nodes = li.child_nodes();
    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter(|n| n.node_type() == web_sys::Node::TEXT_NODE)
        .filter_map(|n| n.text_content())
        .collect::<String>()
        .trim()
        .to_string()
}

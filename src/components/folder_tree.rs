use crate::state::tree_sync::TreeSyncController;
use crate::state::AppContext;
use crate::tree::FolderTree;
use icons::{ChevronDown, ChevronRight};
use leptos::html;
use leptos::prelude::*;
use std::collections::HashSet;

/// `DataTransfer` prefix for tree-node drags (table rows use `DragItem`).
const TREE_DRAG_PREFIX: &str = "tree-folder:";

/// View-only tree state shared by all rendered nodes.
#[derive(Clone, Copy)]
struct TreeUi {
    tree: RwSignal<FolderTree>,
    renaming: RwSignal<Option<String>>,
    rename_value: RwSignal<String>,
    collapsed: RwSignal<HashSet<String>>,
    drop_target: RwSignal<Option<String>>,
}

#[component]
pub fn FolderTreeView() -> impl IntoView {
    let tree_sync = expect_context::<TreeSyncController>();
    let tree = tree_sync.tree();

    let ui = TreeUi {
        tree,
        renaming: RwSignal::new(None),
        rename_value: RwSignal::new(String::new()),
        collapsed: RwSignal::new(HashSet::new()),
        drop_target: RwSignal::new(None),
    };

    let root_ids = move || {
        tree.with(|t| {
            t.children(None)
                .into_iter()
                .map(|n| n.id.clone())
                .collect::<Vec<String>>()
        })
    };

    view! {
        <nav id="folder-tree-view" class="flex flex-col text-sm" aria-label="Folders">
            <Show
                when=move || !tree.with(|t| t.is_empty())
                fallback=|| view! { <div class="px-2 py-1 text-xs text-muted-foreground">"No folders."</div> }
            >
                <For
                    each=root_ids
                    key=|id| id.clone()
                    children=move |id| render_node(ui, id, 0)
                />
            </Show>
        </nav>
    }
}

fn render_node(ui: TreeUi, id: String, depth: usize) -> AnyView {
    let tree_sync = expect_context::<TreeSyncController>();
    let app_state = expect_context::<AppContext>();

    let id_sv = StoredValue::new(id);
    let sync_sv = StoredValue::new(tree_sync);
    let app_sv = StoredValue::new(app_state);
    let input_ref: NodeRef<html::Input> = NodeRef::new();

    let is_renaming =
        move || ui.renaming.get().as_deref() == Some(id_sv.get_value().as_str());

    // Focus the inline rename input once it is mounted.
    Effect::new(move |_| {
        if !is_renaming() {
            return;
        }
        if let Some(el) = input_ref.get() {
            let _ = el.focus();
            el.select();
        }
    });

    let commit_rename = move || {
        let id = id_sv.get_value();
        if ui.renaming.get_untracked().as_deref() != Some(id.as_str()) {
            return;
        }
        ui.renaming.set(None);
        let name = ui.rename_value.get_untracked();
        let unchanged = ui
            .tree
            .with_untracked(|t| t.get(&id).map(|n| n.name == name.trim()).unwrap_or(true));
        if !unchanged {
            sync_sv.with_value(|s| s.rename(&id, &name));
        }
    };

    let on_select = move |_| {
        let id = id_sv.get_value();
        let selected = ui.tree.try_update(|t| t.select_node(Some(&id))).unwrap_or(false);
        if selected {
            app_sv.with_value(|a| a.show_folder_contents(id));
        }
    };

    let start_rename = move |ev: web_sys::MouseEvent| {
        ev.stop_propagation();
        let id = id_sv.get_value();
        let name = ui
            .tree
            .with_untracked(|t| t.get(&id).map(|n| n.name.clone()))
            .unwrap_or_default();
        ui.rename_value.set(name);
        ui.renaming.set(Some(id));
    };

    let on_delete = move |ev: web_sys::MouseEvent| {
        ev.stop_propagation();
        sync_sv.with_value(|s| s.delete(&id_sv.get_value()));
    };

    let on_toggle = move |ev: web_sys::MouseEvent| {
        ev.stop_propagation();
        let id = id_sv.get_value();
        ui.collapsed.update(|c| {
            if !c.remove(&id) {
                c.insert(id);
            }
        });
    };

    let on_dragstart = move |ev: web_sys::DragEvent| {
        ev.stop_propagation();
        if let Some(dt) = ev.data_transfer() {
            let _ = dt.set_data(
                "text/plain",
                &format!("{}{}", TREE_DRAG_PREFIX, id_sv.get_value()),
            );
            dt.set_effect_allowed("move");
        }
    };

    let on_dragover = move |ev: web_sys::DragEvent| {
        ev.prevent_default();
        ev.stop_propagation();
        if let Some(dt) = ev.data_transfer() {
            dt.set_drop_effect("move");
        }
        ui.drop_target.set(Some(id_sv.get_value()));
    };

    let on_dragleave = move |_ev: web_sys::DragEvent| {
        if ui.drop_target.get_untracked().as_deref() == Some(id_sv.get_value().as_str()) {
            ui.drop_target.set(None);
        }
    };

    let on_drop = move |ev: web_sys::DragEvent| {
        ev.prevent_default();
        ev.stop_propagation();
        ui.drop_target.set(None);

        let dragged = ev
            .data_transfer()
            .and_then(|dt| dt.get_data("text/plain").ok())
            .unwrap_or_default();
        let Some(dragged) = dragged.strip_prefix(TREE_DRAG_PREFIX) else {
            return;
        };
        let target = id_sv.get_value();
        if dragged.trim().is_empty() || dragged == target {
            return;
        }
        sync_sv.with_value(|s| s.move_to(dragged, &target));
    };

    let on_rename_keydown = move |ev: web_sys::KeyboardEvent| match ev.key().as_str() {
        "Enter" => {
            ev.prevent_default();
            commit_rename();
        }
        "Escape" => {
            ev.prevent_default();
            ui.renaming.set(None);
        }
        _ => {}
    };

    let on_rename_input = move |ev: web_sys::Event| {
        ui.rename_value.set(event_target_value(&ev));
    };

    (move || {
        let id = id_sv.get_value();
        let Some(node) = ui.tree.with(|t| t.get(&id).cloned()) else {
            return ().into_any();
        };
        let kid_ids: Vec<String> = ui.tree.with(|t| {
            t.children(Some(&id))
                .into_iter()
                .map(|n| n.id.clone())
                .collect()
        });
        let has_kids = !kid_ids.is_empty();
        let is_collapsed = ui.collapsed.with(|c| c.contains(&id));
        let is_selected = ui.tree.with(|t| t.selected() == Some(id.as_str()));
        let is_drop_target = ui.drop_target.get().as_deref() == Some(id.as_str());

        let row_class = if is_drop_target {
            "group flex items-center gap-1 rounded-md px-1 py-0.5 ring-1 ring-primary/40 bg-primary/10"
        } else if is_selected {
            "group flex items-center gap-1 rounded-md px-1 py-0.5 bg-accent text-accent-foreground"
        } else {
            "group flex items-center gap-1 rounded-md px-1 py-0.5 hover:bg-accent/50"
        };

        let toggle = if has_kids {
            view! {
                <button type="button" class="size-4 text-muted-foreground" on:click=on_toggle>
                    {if is_collapsed {
                        view! { <ChevronRight class="size-4" /> }.into_any()
                    } else {
                        view! { <ChevronDown class="size-4" /> }.into_any()
                    }}
                </button>
            }
            .into_any()
        } else {
            view! { <span class="size-4"></span> }.into_any()
        };

        let label = if is_renaming() {
            view! {
                <input
                    class="h-6 flex-1 rounded border border-input bg-transparent px-1 text-sm"
                    prop:value=move || ui.rename_value.get()
                    on:input=on_rename_input
                    on:keydown=on_rename_keydown
                    on:blur=move |_| commit_rename()
                    on:click=|ev: web_sys::MouseEvent| ev.stop_propagation()
                    node_ref=input_ref
                />
            }
            .into_any()
        } else {
            view! {
                <span class="flex-1 truncate cursor-pointer" on:dblclick=start_rename>
                    {node.name.clone()}
                </span>
            }
            .into_any()
        };

        let children_view = if has_kids && !is_collapsed {
            kid_ids
                .into_iter()
                .map(|kid| render_node(ui, kid, depth + 1))
                .collect_view()
                .into_any()
        } else {
            ().into_view().into_any()
        };

        view! {
            <div data-folder_id=id.clone()>
                <div
                    class=row_class
                    style=format!("padding-left: {}px", depth * 14)
                    draggable="true"
                    on:click=on_select
                    on:dragstart=on_dragstart
                    on:dragover=on_dragover
                    on:dragleave=on_dragleave
                    on:drop=on_drop
                >
                    {toggle}
                    {label}
                    <span class="hidden items-center gap-1 group-hover:flex">
                        <button
                            type="button"
                            class="text-muted-foreground hover:text-foreground"
                            title="Rename"
                            on:click=start_rename
                        >
                            <svg
                                xmlns="http://www.w3.org/2000/svg"
                                width="14"
                                height="14"
                                viewBox="0 0 24 24"
                                fill="none"
                                stroke="currentColor"
                                stroke-width="2"
                                stroke-linecap="round"
                                stroke-linejoin="round"
                                aria-hidden="true"
                            >
                                <path d="M12 20h9" />
                                <path d="M16.5 3.5a2.121 2.121 0 0 1 3 3L7 19l-4 1 1-4Z" />
                            </svg>
                        </button>
                        <button
                            type="button"
                            class="text-destructive/80 hover:text-destructive"
                            title="Delete"
                            on:click=on_delete
                        >
                            <svg
                                xmlns="http://www.w3.org/2000/svg"
                                width="14"
                                height="14"
                                viewBox="0 0 24 24"
                                fill="none"
                                stroke="currentColor"
                                stroke-width="2"
                                stroke-linecap="round"
                                stroke-linejoin="round"
                                aria-hidden="true"
                            >
                                <path d="M3 6h18" />
                                <path d="M19 6v14a2 2 0 0 1-2 2H7a2 2 0 0 1-2-2V6" />
                                <path d="M8 6V4a2 2 0 0 1 2-2h4a2 2 0 0 1 2 2v2" />
                            </svg>
                        </button>
                    </span>
                </div>
                {children_view}
            </div>
        }
        .into_any()
    })
    .into_any()
}

use crate::api::delete_outcome;
use crate::components::ui::Spinner;
use crate::models::{DragItem, EditableField, FieldKind, Severity};
use crate::state::field_saver::{FieldHandle, FieldSaverController, SaveStatus};
use crate::state::AppContext;
use crate::util::dom;
use leptos::ev;
use leptos::html;
use leptos::logging::warn;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dom::helpers::window_event_listener;
use wasm_bindgen::JsCast;
use web_sys::Element;

/// Id of the delegating pane around the table body.
pub(crate) const LINKS_PANE_ID: &str = "links-table-pane";

const RENAME_FORM_HTML: &str = r#"<span class="rename-folder-form"><input type="text" name="folder_name" class="h-7 rounded border border-input bg-transparent px-1 text-sm"> <input type="button" name="rename_folder_save" value="Save" class="cursor-pointer text-primary"> <input type="button" name="rename_folder_cancel" value="Cancel" class="cursor-pointer text-muted-foreground"></span>"#;

/// A notes textarea or title input living in the server-rendered table.
struct DomField {
    input: Element,
    status: Option<Element>,
}

impl FieldHandle for DomField {
    fn current_value(&self) -> Option<String> {
        if !self.input.is_connected() {
            return None;
        }
        dom::field_value(&self.input)
    }

    fn show_status(&self, status: SaveStatus) {
        if let Some(el) = &self.status {
            dom::set_text(el, status.label());
        }
    }
}

/// Resolve an edited element to its field, link id and status element.
fn editable_field_for(target: &Element) -> Option<(EditableField, DomField)> {
    if dom::matches(target, ".link-details textarea") {
        // The details row follows the link row it belongs to.
        let row = dom::closest(target, "tr")?;
        let link_row = row
            .previous_element_sibling()
            .filter(|r| dom::matches(r, ".link-row"))?;
        let link_id = dom::attr(&link_row, "link_id")?;
        let status = dom::prev_sibling_matching(
            target,
            &format!(".{}", FieldKind::Notes.status_class()),
        );
        return Some((
            EditableField::new(FieldKind::Notes, link_id),
            DomField {
                input: target.clone(),
                status,
            },
        ));
    }

    if dom::matches(target, ".linky-abbr-title input") {
        let row = dom::closest(target, "tr")?;
        let link_id = dom::attr(&row, "link_id")?;
        let status = dom::next_sibling_matching(
            target,
            &format!(".{}", FieldKind::Title.status_class()),
        );
        return Some((
            EditableField::new(FieldKind::Title, link_id),
            DomField {
                input: target.clone(),
                status,
            },
        ));
    }

    None
}

fn drag_item_for_row(row: &Element) -> Option<DragItem> {
    if dom::matches(row, ".folder-row") {
        dom::attr(row, "folder_id").map(DragItem::Folder)
    } else {
        dom::attr(row, "link_id").map(DragItem::Link)
    }
}

fn row_selector(item: &DragItem) -> String {
    match item {
        DragItem::Link(id) => format!("tr[link_id=\"{}\"]", id),
        DragItem::Folder(id) => format!("tr.folder-row[folder_id=\"{}\"]", id),
    }
}

/// `(links, folders)` ids of every checked item checkbox.
pub(crate) fn checked_items(pane: &Element) -> (Vec<String>, Vec<String>) {
    let mut links = vec![];
    let mut folders = vec![];
    for cb in dom::query_all(pane, "input.checkbox:checked") {
        let Some(row) = dom::closest(&cb, "tr") else {
            continue;
        };
        match drag_item_for_row(&row) {
            Some(DragItem::Link(id)) => links.push(id),
            Some(DragItem::Folder(id)) => folders.push(id),
            None => {}
        }
    }
    (links, folders)
}

fn folder_link(row: &Element) -> Option<Element> {
    dom::query(row, ".folder-name a").or_else(|| dom::query(row, "a"))
}

fn show_rename_form(row: &Element) {
    if let Some(tools) = dom::query(row, ".tool-block") {
        dom::set_shown(&tools, false);
    }
    let Some(name_link) = folder_link(row) else {
        return;
    };
    if dom::query(row, ".rename-folder-form").is_some() {
        return;
    }

    let Some(doc) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    // Prefer the page's own form template when it ships one.
    let form = doc
        .query_selector("#form_templates .rename-folder-form")
        .ok()
        .flatten()
        .and_then(|t| t.clone_node_with_deep(true).ok())
        .and_then(|n| n.dyn_into::<Element>().ok())
        .or_else(|| {
            let holder = doc.create_element("span").ok()?;
            holder.set_inner_html(RENAME_FORM_HTML);
            holder.first_element_child()
        });
    let Some(form) = form else {
        return;
    };

    dom::set_shown(&name_link, false);
    let _ = name_link.after_with_node_1(&form);
    dom::set_shown(&form, true);
    if let Some(input) = dom::query(&form, "input[name=\"folder_name\"]") {
        let current = name_link.text_content().unwrap_or_default();
        dom::set_field_value(&input, current.trim());
        if let Some(h) = input.dyn_ref::<web_sys::HtmlElement>() {
            let _ = h.focus();
        }
    }
}

fn close_rename_form(row: &Element) {
    if let Some(name_link) = folder_link(row) {
        dom::clear_display(&name_link);
    }
    if let Some(form) = dom::query(row, ".rename-folder-form") {
        form.remove();
    }
    // Let the :hover rule show the tools again.
    if let Some(tools) = dom::query(row, ".tool-block") {
        dom::clear_display(&tools);
    }
}

/// The links/folders table. Its body is a server-rendered HTML fragment, so
/// all interaction is delegated from the surrounding pane.
#[component]
pub fn LinksTable() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let saver = expect_context::<FieldSaverController>();
    let table_html = app_state.0.table_html;
    let table_loading = app_state.0.table_loading;
    let checked_count = app_state.0.checked_count;
    let pane_ref: NodeRef<html::Div> = NodeRef::new();

    let app_sv = StoredValue::new(app_state);
    let saver_sv = StoredValue::new(saver);

    let pane_el = move || -> Option<Element> { pane_ref.get_untracked().map(|p| p.into()) };

    let recount_checked = move || {
        if let Some(pane) = pane_el() {
            checked_count.set(dom::query_all(&pane, "input.checkbox:checked").len());
        }
    };

    // After every body swap: rows become draggable, selection is recounted.
    Effect::new(move |_| {
        let _ = table_html.get();
        let Some(pane) = pane_ref.get().map(Element::from) else {
            return;
        };
        for row in dom::query_all(&pane, "tbody tr.link-row, tbody tr.folder-row") {
            let _ = row.set_attribute("draggable", "true");
        }
        checked_count.set(dom::query_all(&pane, "input.checkbox:checked").len());
    });

    let dragend = window_event_listener(ev::dragend, move |_ev: web_sys::DragEvent| {
        dom::set_body_class("dragging", false);
    });
    on_cleanup(move || dragend.remove());

    let on_click = move |ev: web_sys::MouseEvent| {
        let ev: &web_sys::Event = ev.as_ref();

        if let Some(a) = dom::closest_from_event(ev, ".linky-details-link a") {
            ev.prevent_default();
            if let Some(details) = dom::closest(&a, "tr")
                .and_then(|row| row.next_element_sibling())
                .filter(|r| dom::matches(r, ".link-details"))
            {
                dom::toggle_shown(&details);
            }
            return;
        }

        if let Some(a) = dom::closest_from_event(ev, ".folder-row a.delete") {
            ev.prevent_default();
            let Some(row) = dom::closest(&a, ".folder-row") else {
                return;
            };
            let Some(href) = folder_link(&row).and_then(|l| dom::attr(&l, "href")) else {
                return;
            };
            if !dom::confirm("Really delete folder?") {
                return;
            }
            let api_client = app_sv.with_value(|a| a.0.api_client.get_untracked());
            let app_state = app_sv.get_value();
            spawn_local(async move {
                let resp = match api_client.delete_folder_at(&href).await {
                    Ok(resp) => resp,
                    Err(e) => {
                        app_state.inform_user(e.user_message(), Severity::Danger);
                        return;
                    }
                };
                // Application-level refusals get a blocking alert here.
                match delete_outcome(resp) {
                    Ok(()) => row.remove(),
                    Err(e) => dom::alert(&e.user_message()),
                }
            });
            return;
        }

        if let Some(a) = dom::closest_from_event(ev, ".folder-row a.rename") {
            ev.prevent_default();
            if let Some(row) = dom::closest(&a, ".folder-row") {
                show_rename_form(&row);
            }
            return;
        }

        if let Some(btn) = dom::closest_from_event(ev, ".folder-row input[name=\"rename_folder_cancel\"]") {
            if let Some(row) = dom::closest(&btn, ".folder-row") {
                close_rename_form(&row);
            }
            return;
        }

        if let Some(btn) = dom::closest_from_event(ev, ".folder-row input[name=\"rename_folder_save\"]") {
            let Some(row) = dom::closest(&btn, ".folder-row") else {
                return;
            };
            let new_name = dom::query(&row, "input[name=\"folder_name\"]")
                .and_then(|i| dom::field_value(&i))
                .unwrap_or_default();
            if new_name.trim().is_empty() {
                return;
            }
            let Some(name_link) = folder_link(&row) else {
                return;
            };
            let Some(href) = dom::attr(&name_link, "href") else {
                return;
            };
            let api_client = app_sv.with_value(|a| a.0.api_client.get_untracked());
            let app_state = app_sv.get_value();
            spawn_local(async move {
                match api_client.rename_folder_at(&href, &new_name).await {
                    Ok(()) => {
                        dom::set_text(&name_link, &new_name);
                        close_rename_form(&row);
                    }
                    Err(e) => app_state.inform_user(e.user_message(), Severity::Danger),
                }
            });
            return;
        }

        if dom::closest_from_event(ev, "input.checkbox").is_some() {
            recount_checked();
        }
    };

    let on_input = move |ev: web_sys::Event| {
        let Some(target) = ev.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        let Some((field, handle)) = editable_field_for(&target) else {
            return;
        };
        saver_sv.with_value(|s| s.on_edit(field, handle));
    };

    let on_dragstart = move |ev: web_sys::DragEvent| {
        let Some(row) = dom::closest_from_event(ev.as_ref(), "tbody tr") else {
            return;
        };
        let Some(item) = drag_item_for_row(&row) else {
            return;
        };
        if let Some(dt) = ev.data_transfer() {
            let _ = dt.set_data("text/plain", &item.to_transfer_string());
            dt.set_effect_allowed("move");
        }
        dom::set_body_class("dragging", true);
    };

    let on_dragover = move |ev: web_sys::DragEvent| {
        let Some(row) = dom::closest_from_event(ev.as_ref(), ".folder-row") else {
            return;
        };
        ev.prevent_default();
        let _ = row.class_list().add_1("ui-selected");
    };

    let on_dragleave = move |ev: web_sys::DragEvent| {
        if let Some(row) = dom::closest_from_event(ev.as_ref(), ".folder-row") {
            let _ = row.class_list().remove_1("ui-selected");
        }
    };

    let on_drop = move |ev: web_sys::DragEvent| {
        let Some(row) = dom::closest_from_event(ev.as_ref(), ".folder-row") else {
            return;
        };
        ev.prevent_default();
        let _ = row.class_list().remove_1("ui-selected");
        dom::set_body_class("dragging", false);

        let Some(target_id) = dom::attr(&row, "folder_id") else {
            return;
        };
        let Some(item) = ev
            .data_transfer()
            .and_then(|dt| dt.get_data("text/plain").ok())
            .and_then(|s| DragItem::from_transfer_string(&s))
        else {
            return;
        };
        if item == DragItem::Folder(target_id.clone()) {
            return;
        }

        let Some(pane) = pane_el() else {
            return;
        };
        let dragged_row = dom::query(&pane, &row_selector(&item));
        let api_client = app_sv.with_value(|a| a.0.api_client.get_untracked());
        let app_state = app_sv.get_value();
        spawn_local(async move {
            let (links, folders) = item.into_move_lists();
            match api_client
                .move_selected_items_to(&target_id, links, folders)
                .await
            {
                Ok(()) => {
                    if let Some(r) = dragged_row {
                        r.remove();
                    }
                }
                Err(e) => {
                    warn!("moving item into folder {} failed: {}", target_id, e);
                    app_state.inform_user(e.user_message(), Severity::Danger);
                }
            }
        });
    };

    view! {
        <div
            id=LINKS_PANE_ID
            class="tab-pane relative"
            node_ref=pane_ref
            on:click=on_click
            on:input=on_input
            on:dragstart=on_dragstart
            on:dragover=on_dragover
            on:dragleave=on_dragleave
            on:drop=on_drop
        >
            <Show when=move || table_loading.get() fallback=|| ().into_view()>
                <div class="absolute right-2 top-2 text-muted-foreground">
                    <Spinner label="Loading folder" />
                </div>
            </Show>
            <table class="vested-table w-full text-sm">
                <tbody inner_html=move || table_html.get()></tbody>
            </table>
        </div>
    }
}

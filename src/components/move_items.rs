use crate::components::links_table::{checked_items, LINKS_PANE_ID};
use crate::components::ui::{Button, ButtonSize, ButtonVariant};
use crate::models::Severity;
use crate::state::tree_sync::TreeSyncController;
use crate::state::AppContext;
use leptos::logging::log;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// "Move selected items to ..." control above the links table.
#[component]
pub fn MoveItemsMenu() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let tree = expect_context::<TreeSyncController>().tree();
    let checked_count = app_state.0.checked_count;

    let target = RwSignal::new(String::new());
    let moving = RwSignal::new(false);
    let app_sv = StoredValue::new(app_state);

    let options = move || {
        tree.with(|t| {
            t.walk()
                .into_iter()
                .map(|(depth, n)| (n.id.clone(), format!("{}{}", "\u{a0}\u{a0}".repeat(depth), n.name)))
                .collect::<Vec<(String, String)>>()
        })
    };

    let disabled = Signal::derive(move || {
        checked_count.get() == 0 || target.get().is_empty() || moving.get()
    });

    let on_move = move |_| {
        let target_id = target.get_untracked();
        if target_id.is_empty() {
            return;
        }
        let Some(pane) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(LINKS_PANE_ID))
        else {
            return;
        };
        let (links, folders) = checked_items(&pane);
        if links.is_empty() && folders.is_empty() {
            return;
        }

        let app_state = app_sv.get_value();
        let api_client = app_state.0.api_client.get_untracked();
        moving.set(true);
        spawn_local(async move {
            log!(
                "moving {} links and {} folders into folder {}",
                links.len(),
                folders.len(),
                target_id
            );
            match api_client
                .move_selected_items_to(&target_id, links, folders)
                .await
            {
                Ok(()) => app_state.reload_folder_contents(),
                Err(e) => app_state.inform_user(e.user_message(), Severity::Danger),
            }
            moving.set(false);
        });
    };

    view! {
        <div class="flex items-center gap-2">
            <select
                class="h-8 rounded-md border border-input bg-transparent px-2 text-sm"
                aria-label="Target folder"
                prop:value=move || target.get()
                on:change=move |ev| target.set(event_target_value(&ev))
            >
                <option value="">"Move to folder..."</option>
                <For
                    each=options
                    key=|(id, label)| (id.clone(), label.clone())
                    children=|(id, label)| view! { <option value=id>{label}</option> }
                />
            </select>
            <Button
                variant=ButtonVariant::Outline
                size=ButtonSize::Sm
                attr:disabled=move || disabled.get()
                on:click=on_move
            >
                {move || {
                    let n = checked_count.get();
                    if n == 0 {
                        "Move".to_string()
                    } else {
                        format!("Move {} selected", n)
                    }
                }}
            </Button>
        </div>
    }
}

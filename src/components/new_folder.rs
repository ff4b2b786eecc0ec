use crate::components::ui::{Button, ButtonSize, ButtonVariant};
use crate::config::csrf_token;
use crate::state::AppContext;
use crate::util::page_url;
use leptos::html;
use leptos::prelude::*;

/// Toggleable "new folder" form. Submission is a plain form POST handled by
/// the server page.
#[component]
pub fn NewFolderForm() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let current_folder = app_state.0.current_folder_id;
    let api_client = app_state.0.api_client;

    let open = RwSignal::new(false);
    let name = RwSignal::new(String::new());
    let input_ref: NodeRef<html::Input> = NodeRef::new();

    let action = move || match current_folder.get() {
        Some(id) => api_client.with(|c| c.folder_url(&id)),
        None => page_url(),
    };

    let toggle = move |_| {
        open.update(|o| *o = !*o);
        name.set(String::new());
    };

    Effect::new(move |_| {
        if !open.get() {
            return;
        }
        if let Some(el) = input_ref.get() {
            let _ = el.focus();
        }
    });

    view! {
        <div id="new_folder_container" class="flex items-center gap-2">
            <Show
                when=move || open.get()
                fallback=move || {
                    view! {
                        <Button
                            variant=ButtonVariant::Outline
                            size=ButtonSize::Sm
                            attr:id="new_folder_show"
                            on:click=toggle
                        >
                            "New folder"
                        </Button>
                    }
                }
            >
                <form
                    id="new_folder_name_container"
                    method="post"
                    action=action
                    class="flex items-center gap-2"
                >
                    <input
                        type="hidden"
                        name="csrfmiddlewaretoken"
                        value=csrf_token().unwrap_or_default()
                    />
                    <input
                        id="new_folder_name"
                        name="new_folder_name"
                        type="text"
                        placeholder="Folder name"
                        class="h-8 rounded-md border border-input bg-transparent px-2 text-sm"
                        prop:value=move || name.get()
                        on:input=move |ev| name.set(event_target_value(&ev))
                        node_ref=input_ref
                    />
                    <Button
                        size=ButtonSize::Sm
                        attr:id="new_folder_submit"
                        attr:r#type="submit"
                        attr:disabled=move || name.get().trim().is_empty()
                    >
                        "Create"
                    </Button>
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Sm
                        attr:id="new_folder_cancel"
                        attr:r#type="button"
                        on:click=toggle
                    >
                        "Cancel"
                    </Button>
                </form>
            </Show>
        </div>
    }
}

use crate::components::ui::{Alert, AlertDescription};
use crate::state::AppContext;
use leptos::prelude::*;

/// Renders the "inform user" messages, newest last.
#[component]
pub fn NoticeList() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let notices = app_state.0.notices;

    view! {
        <Show when=move || !notices.get().is_empty() fallback=|| ().into_view()>
            <div class="mb-4 flex flex-col gap-2">
                <For
                    each=move || notices.get()
                    key=|n| n.id
                    children=move |n| {
                        let id = n.id;
                        view! {
                            <Alert
                                severity=n.severity
                                on_dismiss=move |_| notices.update(|list| list.retain(|x| x.id != id))
                            >
                                <AlertDescription>{n.message}</AlertDescription>
                            </Alert>
                        }
                    }
                />
            </div>
        </Show>
    }
}

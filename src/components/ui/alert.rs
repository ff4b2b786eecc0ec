use crate::models::Severity;
use icons::X;
use leptos::prelude::*;
use leptos_ui::clx;
use tw_merge::tw_merge;

mod components {
    use super::*;
    clx! {AlertDescription, p, "text-sm [&_p]:leading-relaxed break-words"}
}

pub use components::*;

fn severity_class(severity: Severity) -> &'static str {
    match severity {
        Severity::Danger => "border-destructive/30 text-destructive",
        Severity::Warning => "border-warning/40 text-warning-foreground",
        Severity::Info => "border-border text-foreground",
        Severity::Success => "border-success/40 text-success-foreground",
    }
}

/// Dismissible banner for one "inform user" message.
#[component]
pub fn Alert(
    severity: Severity,
    #[prop(into, optional)] class: String,
    #[prop(into)] on_dismiss: Callback<()>,
    children: Children,
) -> impl IntoView {
    let merged_class = tw_merge!(
        "relative flex w-full items-start gap-2 rounded-lg border px-4 py-3 text-sm",
        severity_class(severity),
        class
    );

    view! {
        <div data-name="Alert" role="alert" class=merged_class data-severity=severity.to_string()>
            <div class="flex-1">{children()}</div>
            <button
                type="button"
                class="shrink-0 opacity-70 hover:opacity-100"
                aria-label="Dismiss"
                on:click=move |_| on_dismiss.run(())
            >
                <X class="size-4" />
            </button>
        </div>
    }
}

use crate::components::folder_tree::FolderTreeView;
use crate::components::links_table::LinksTable;
use crate::components::move_items::MoveItemsMenu;
use crate::components::new_folder::NewFolderForm;
use crate::components::notices::NoticeList;
use crate::components::ui::{Button, ButtonSize, ButtonVariant};
use crate::state::AppContext;
use leptos::prelude::*;

/// The links list: folder tree on the left, folder contents on the right.
#[component]
pub fn LinksListPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let table_loading = app_state.0.table_loading;
    let app_sv = StoredValue::new(app_state);

    let sidebar_collapsed = RwSignal::new(false);
    let sidebar_width_class = move || {
        if sidebar_collapsed.get() {
            "w-10"
        } else {
            "w-60"
        }
    };

    view! {
        <div class="links-list flex w-full gap-4 text-foreground">
            <aside class=move || format!("{} shrink-0", sidebar_width_class())>
                <div class="sticky top-6 space-y-2">
                    <div class="flex items-center justify-between">
                        <Show when=move || !sidebar_collapsed.get() fallback=|| ()>
                            <span class="text-sm font-medium">"Folders"</span>
                        </Show>
                        <Button
                            variant=ButtonVariant::Outline
                            size=ButtonSize::Icon
                            on:click=move |_| sidebar_collapsed.update(|c| *c = !*c)
                            attr:title="Toggle folders"
                            class="h-8 w-8"
                        >
                            <span class="text-xs text-muted-foreground">
                                {move || if sidebar_collapsed.get() { ">" } else { "<" }}
                            </span>
                        </Button>
                    </div>
                    <Show when=move || !sidebar_collapsed.get() fallback=|| ()>
                        <div class="rounded-md border p-2">
                            <FolderTreeView />
                        </div>
                    </Show>
                </div>
            </aside>

            <main class="min-w-0 flex-1 space-y-3">
                <NoticeList />
                <div class="flex flex-wrap items-center justify-between gap-2">
                    <NewFolderForm />
                    <div class="flex items-center gap-2">
                        <MoveItemsMenu />
                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Sm
                            attr:title="Reload folder"
                            attr:disabled=move || table_loading.get()
                            on:click=move |_| app_sv.with_value(|a| a.reload_folder_contents())
                        >
                            "Refresh"
                        </Button>
                    </div>
                </div>
                <LinksTable />
            </main>
        </div>
    }
}

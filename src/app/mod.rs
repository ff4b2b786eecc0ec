use crate::config::EnvConfig;
use crate::markup::PageSource;
use crate::pages::LinksListPage;
use crate::state::field_saver::FieldSaverController;
use crate::state::tree_sync::TreeSyncController;
use crate::state::{AppContext, AppState};
use crate::tree::FolderTree;
use leptos::prelude::*;

#[component]
pub fn App(config: EnvConfig, source: PageSource) -> impl IntoView {
    let window_ms = config.save_window_ms();
    let app_state = AppContext(AppState::new(config));
    app_state.0.table_html.set(source.table_html);

    let tree = RwSignal::new(FolderTree::from_nodes(source.folders));
    provide_context(TreeSyncController::new(app_state.clone(), tree));
    provide_context(FieldSaverController::new(app_state.clone(), window_ms));
    provide_context(app_state);

    view! { <LinksListPage /> }
}

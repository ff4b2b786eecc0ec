pub(crate) mod field_saver;
pub(crate) mod tree_sync;

use crate::api::ApiClient;
use crate::config::EnvConfig;
use crate::models::{Notice, Severity};
use leptos::logging::error;
use leptos::prelude::*;

#[derive(Clone)]
pub(crate) struct AppState {
    pub api_client: RwSignal<ApiClient>,
    pub config: EnvConfig,

    /// Messages from the generic "inform user" channel, newest last.
    pub notices: RwSignal<Vec<Notice>>,
    pub notice_seq: RwSignal<u64>,

    /// Folder whose contents fill the links table.
    pub current_folder_id: RwSignal<Option<String>>,
    /// Raw HTML fragment served by the folder contents endpoint.
    pub table_html: RwSignal<String>,
    pub table_loading: RwSignal<bool>,
    /// Ignore stale folder-contents responses.
    pub table_request_id: RwSignal<u64>,

    /// Number of checked item checkboxes in the table.
    pub checked_count: RwSignal<usize>,
}

impl AppState {
    pub fn new(config: EnvConfig) -> Self {
        Self {
            api_client: RwSignal::new(ApiClient::from_config(&config)),
            config,
            notices: RwSignal::new(vec![]),
            notice_seq: RwSignal::new(0),
            current_folder_id: RwSignal::new(None),
            table_html: RwSignal::new(String::new()),
            table_loading: RwSignal::new(false),
            table_request_id: RwSignal::new(0),
            checked_count: RwSignal::new(0),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(EnvConfig::from_window())
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);

impl AppContext {
    /// The page's generic error channel.
    pub fn inform_user(&self, message: impl Into<String>, severity: Severity) {
        let message = message.into();
        if severity == Severity::Danger {
            error!("{}", message);
        }

        let id = self.0.notice_seq.get_untracked() + 1;
        self.0.notice_seq.set(id);
        self.0.notices.update(|list| {
            list.push(Notice {
                id,
                message,
                severity,
            });
        });
    }

    /// Load a folder's contents into the table (`select_node` with one node).
    pub fn show_folder_contents(&self, folder_id: String) {
        let state = self.0.clone();
        let req_id = state.table_request_id.get_untracked() + 1;
        state.table_request_id.set(req_id);
        state.current_folder_id.set(Some(folder_id.clone()));
        state.table_loading.set(true);

        let api_client = state.api_client.get_untracked();
        leptos::task::spawn_local(async move {
            let html = match api_client.folder_contents(&folder_id).await {
                Ok(html) => html,
                // The error page still replaces the table body.
                Err(e) => e.body().map(|b| b.to_string()).unwrap_or_default(),
            };
            if state.table_request_id.get_untracked() != req_id {
                return;
            }
            state.table_html.set(html);
            state.checked_count.set(0);
            state.table_loading.set(false);
        });
    }

    /// Refresh the table; without a selected folder the server page itself
    /// is reloaded.
    pub fn reload_folder_contents(&self) {
        match self.0.current_folder_id.get_untracked() {
            Some(id) => self.show_folder_contents(id),
            None => {
                if let Some(w) = web_sys::window() {
                    let _ = w.location().reload();
                }
            }
        }
    }
}

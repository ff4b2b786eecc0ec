use crate::models::{EditableField, Severity};
use crate::state::AppContext;
use crate::util::now_ms;
use leptos::logging::{log, warn};
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use wasm_bindgen::JsCast;

/// Save-status text shown next to an edited field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SaveStatus {
    Saving,
    Saved,
}

impl SaveStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SaveStatus::Saving => "saving ...",
            SaveStatus::Saved => "saved.",
        }
    }
}

/// Debounce state for one editable field.
///
/// Every edit schedules one deferred check; a check sends only if an edit
/// happened since the last send. `last_save_ms` moves only when a check
/// fires, which is what collapses a burst into a single request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct DebouncedField {
    window_ms: i64,
    save_needed: bool,
    /// Starts at the field's first edit.
    last_save_ms: Option<i64>,
}

impl DebouncedField {
    pub fn new(window_ms: i64) -> Self {
        Self {
            window_ms: window_ms.max(0),
            save_needed: false,
            last_save_ms: None,
        }
    }

    pub fn save_needed(&self) -> bool {
        self.save_needed
    }

    /// Record an edit; returns how long to wait before its check fires.
    pub fn on_edit(&mut self, now_ms: i64) -> i64 {
        self.save_needed = true;
        let last = *self.last_save_ms.get_or_insert(now_ms);
        (self.window_ms - (now_ms - last)).clamp(0, self.window_ms)
    }

    /// A scheduled check fired. Returns true if the caller should send the
    /// field's current value now.
    ///
    /// `live` is false when the check belongs to an element that has since
    /// been replaced; such a check leaves a pending edit to the check that
    /// the replacement scheduled.
    pub fn on_check(&mut self, now_ms: i64, live: bool) -> bool {
        if self.save_needed && !live {
            return false;
        }
        let send = std::mem::take(&mut self.save_needed);
        self.last_save_ms = Some(now_ms);
        send
    }
}

/// DOM side of one field: where the live value and the status text live.
pub(crate) trait FieldHandle: 'static {
    /// Read at send time, not at edit time.
    fn current_value(&self) -> Option<String>;
    fn show_status(&self, status: SaveStatus);
}

/// Page-wide autosave for link notes and titles.
///
/// Holds one `DebouncedField` per `(kind, link_id)` so fields never share
/// timing state.
#[derive(Clone)]
pub(crate) struct FieldSaverController {
    app_state: AppContext,
    window_ms: i64,
    fields: Arc<Mutex<HashMap<EditableField, DebouncedField>>>,
}

impl FieldSaverController {
    pub fn new(app_state: AppContext, window_ms: i64) -> Self {
        Self {
            app_state,
            window_ms,
            fields: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Called on every `input` event of a notes textarea or title input.
    pub fn on_edit(&self, field: EditableField, handle: impl FieldHandle) {
        if field.link_id.trim().is_empty() {
            return;
        }

        handle.show_status(SaveStatus::Saving);

        let delay = match self.fields.lock() {
            Ok(mut map) => map
                .entry(field.clone())
                .or_insert_with(|| DebouncedField::new(self.window_ms))
                .on_edit(now_ms()),
            Err(_) => return,
        };

        let Some(win) = web_sys::window() else {
            return;
        };

        let s2 = self.clone();
        let cb = wasm_bindgen::closure::Closure::once_into_js(move || {
            s2.on_check(field, handle);
        });
        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(
            cb.as_ref().unchecked_ref(),
            delay.min(i32::MAX as i64) as i32,
        );
    }

    fn on_check(&self, field: EditableField, handle: impl FieldHandle) {
        let value = handle.current_value();
        let send = match self.fields.lock() {
            Ok(mut map) => map
                .get_mut(&field)
                .map(|f| f.on_check(now_ms(), value.is_some()))
                .unwrap_or(false),
            Err(_) => false,
        };
        let Some(value) = value.filter(|_| send) else {
            return;
        };

        let api_client = self.app_state.0.api_client.get_untracked();
        let app_state = self.app_state.clone();
        spawn_local(async move {
            log!("saving {} for link {}", field.kind, field.link_id);
            match api_client
                .save_field(field.kind, &field.link_id, &value)
                .await
            {
                Ok(_) => handle.show_status(SaveStatus::Saved),
                Err(e) => {
                    warn!("saving {} for link {} failed: {}", field.kind, field.link_id, e);
                    app_state.inform_user(e.user_message(), Severity::Danger);
                }
            }
        });
    }
}

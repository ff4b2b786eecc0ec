use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

pub(crate) const FOLDER_ID_PLACEHOLDER: &str = "FOLDER_ID";
pub(crate) const DEFAULT_FOLDER_CONTENTS_URL: &str = "/manage/folder/FOLDER_ID";
pub(crate) const DEFAULT_SAVE_BUFFER_SECONDS: f64 = 3.0;
pub(crate) const DEFAULT_MOUNT_ID: &str = "links-list-root";
pub(crate) const CSRF_COOKIE: &str = "csrftoken";

/// Page configuration supplied by the server-rendered template.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct EnvConfig {
    /// URL template containing `FOLDER_ID`.
    pub folder_contents_url: String,
    pub save_buffer_seconds: f64,
    pub mount_id: String,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            folder_contents_url: DEFAULT_FOLDER_CONTENTS_URL.to_string(),
            save_buffer_seconds: DEFAULT_SAVE_BUFFER_SECONDS,
            mount_id: DEFAULT_MOUNT_ID.to_string(),
        }
    }
}

impl EnvConfig {
    /// Reads `window.ENV`, then the legacy `folderContentsURL` global.
    pub fn from_window() -> Self {
        let Some(window) = web_sys::window() else {
            return Self::default();
        };

        let env = window.get("ENV").map(JsValue::from);
        let read = |upper: &str, lower: &str| -> Option<JsValue> {
            let env = env.as_ref().filter(|e| !e.is_undefined() && e.is_object())?;
            // Prefer upper-case keys; accept lower-case ones too.
            [upper, lower]
                .into_iter()
                .filter_map(|k| js_sys::Reflect::get(env, &k.into()).ok())
                .find(|v| !v.is_undefined() && !v.is_null())
        };

        let folder_contents_url = read("FOLDER_CONTENTS_URL", "folder_contents_url")
            .and_then(|v| v.as_string())
            .or_else(|| {
                window
                    .get("folderContentsURL")
                    .and_then(|v| JsValue::from(v).as_string())
            });
        let save_buffer_seconds = read("SAVE_BUFFER_SECONDS", "save_buffer_seconds")
            .and_then(|v| v.as_f64().or_else(|| v.as_string()?.trim().parse().ok()));
        let mount_id = read("MOUNT_ID", "mount_id").and_then(|v| v.as_string());

        Self::from_parts(folder_contents_url, save_buffer_seconds, mount_id)
    }

    pub(crate) fn from_parts(
        folder_contents_url: Option<String>,
        save_buffer_seconds: Option<f64>,
        mount_id: Option<String>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            folder_contents_url: folder_contents_url
                .filter(|u| u.contains(FOLDER_ID_PLACEHOLDER))
                .unwrap_or(defaults.folder_contents_url),
            save_buffer_seconds: save_buffer_seconds
                .filter(|s| s.is_finite() && *s >= 0.0)
                .unwrap_or(defaults.save_buffer_seconds),
            mount_id: mount_id
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(defaults.mount_id),
        }
    }

    pub fn save_window_ms(&self) -> i64 {
        (self.save_buffer_seconds * 1000.0).round() as i64
    }
}

/// Django's CSRF token from `document.cookie`, if present.
pub(crate) fn csrf_token() -> Option<String> {
    use wasm_bindgen::JsCast;

    let cookies = web_sys::window()?
        .document()?
        .dyn_into::<web_sys::HtmlDocument>()
        .ok()?
        .cookie()
        .ok()?;
    cookie_value(&cookies, CSRF_COOKIE)
}

pub(crate) fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies
        .split(';')
        .filter_map(|c| c.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| urlencoding::decode(v).map(|s| s.into_owned()).unwrap_or_else(|_| v.to_string()))
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_defaults() {
        let c = EnvConfig::from_parts(None, None, None);
        assert_eq!(c, EnvConfig::default());
        assert_eq!(c.save_window_ms(), 3000);
    }

    #[test]
    fn test_from_parts_rejects_template_without_placeholder() {
        let c = EnvConfig::from_parts(Some("/manage/folder/".to_string()), None, None);
        assert_eq!(c.folder_contents_url, DEFAULT_FOLDER_CONTENTS_URL);

        let c = EnvConfig::from_parts(Some("/f/FOLDER_ID/contents".to_string()), None, None);
        assert_eq!(c.folder_contents_url, "/f/FOLDER_ID/contents");
    }

    #[test]
    fn test_from_parts_save_window() {
        let c = EnvConfig::from_parts(None, Some(1.5), None);
        assert_eq!(c.save_window_ms(), 1500);

        let c = EnvConfig::from_parts(None, Some(-1.0), None);
        assert_eq!(c.save_window_ms(), 3000);

        let c = EnvConfig::from_parts(None, Some(f64::NAN), Some("  ".to_string()));
        assert_eq!(c.save_window_ms(), 3000);
        assert_eq!(c.mount_id, DEFAULT_MOUNT_ID);
    }

    #[test]
    fn test_cookie_value() {
        let cookies = "sessionid=abc; csrftoken=tok%3D1; theme=dark";
        assert_eq!(cookie_value(cookies, "csrftoken").as_deref(), Some("tok=1"));
        assert_eq!(cookie_value(cookies, "theme").as_deref(), Some("dark"));
        assert!(cookie_value(cookies, "missing").is_none());
        assert!(cookie_value("csrftoken=", "csrftoken").is_none());
    }
}

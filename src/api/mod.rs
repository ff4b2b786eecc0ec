mod form;

pub(crate) use form::FormPayload;

use crate::config::{csrf_token, EnvConfig, FOLDER_ID_PLACEHOLDER};
use crate::models::{DeleteFolderResponse, FieldKind};
use crate::tree::TreeOp;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub(crate) enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("Error {status}")]
    Http { status: u16, body: String },
    #[error("invalid response: {0}")]
    Parse(String),
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self::Parse(e.to_string())
    }

    /// HTTP status, `0` when the request never got a response.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Http { status, .. } => *status,
            ApiError::Network(_) | ApiError::Parse(_) => 0,
        }
    }

    /// Raw response body, if the server sent one.
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::Http { body, .. } if !body.trim().is_empty() => Some(body),
            _ => None,
        }
    }

    /// Text for the page's error banner: the response body when present,
    /// otherwise `Error <status>`.
    pub fn user_message(&self) -> String {
        match self.body() {
            Some(body) => body.to_string(),
            None => format!("Error {}", self.status()),
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

/// Form-POST client for the links list page.
///
/// Relative URLs (folder hrefs scraped from the table, the page itself) are
/// resolved against `window.location`.
#[derive(Clone, Debug)]
pub(crate) struct ApiClient {
    pub(crate) folder_contents_url: String,
}

impl ApiClient {
    pub fn new(folder_contents_url: String) -> Self {
        Self {
            folder_contents_url,
        }
    }

    pub fn from_config(config: &EnvConfig) -> Self {
        Self::new(config.folder_contents_url.clone())
    }

    pub fn folder_url(&self, folder_id: &str) -> String {
        self.folder_contents_url
            .replace(FOLDER_ID_PLACEHOLDER, folder_id)
    }

    fn with_page_headers(mut req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req = req.header("X-Requested-With", "XMLHttpRequest");
        if let Some(token) = csrf_token() {
            req = req.header("X-CSRFToken", token);
        }
        req
    }

    async fn read_error(res: reqwest::Response) -> ApiError {
        let status = res.status().as_u16();
        let body = res.text().await.unwrap_or_default();
        ApiError::Http { status, body }
    }

    /// POST a form and parse the JSON reply. An empty 2xx body reads as `null`.
    pub async fn post_form(&self, url: &str, payload: &FormPayload) -> ApiResult<serde_json::Value> {
        let client = reqwest::Client::new();
        let req = client
            .post(crate::util::resolve_url(url))
            .form(payload.pairs());

        let res = Self::with_page_headers(req)
            .send()
            .await
            .map_err(ApiError::network)?;

        if !res.status().is_success() {
            return Err(Self::read_error(res).await);
        }

        let text = res.text().await.map_err(ApiError::network)?;
        parse_json_body(&text)
    }

    async fn get_text(&self, url: &str) -> ApiResult<String> {
        let client = reqwest::Client::new();
        let req = client.get(crate::util::resolve_url(url));
        let res = Self::with_page_headers(req)
            .send()
            .await
            .map_err(ApiError::network)?;

        if res.status().is_success() {
            res.text().await.map_err(ApiError::network)
        } else {
            Err(Self::read_error(res).await)
        }
    }

    /// Link attribute saves go to the page itself.
    pub async fn save_field(
        &self,
        kind: FieldKind,
        link_id: &str,
        value: &str,
    ) -> ApiResult<serde_json::Value> {
        let payload = save_field_payload(kind, link_id, value);
        self.post_form(&crate::util::page_url(), &payload).await
    }

    pub async fn rename_folder_at(&self, folder_url: &str, name: &str) -> ApiResult<()> {
        self.post_form(folder_url, &rename_folder_payload(name))
            .await
            .map(|_| ())
    }

    pub async fn delete_folder_at(&self, folder_url: &str) -> ApiResult<DeleteFolderResponse> {
        let data = self
            .post_form(folder_url, &FormPayload::action("delete_folder"))
            .await?;
        if data.is_null() {
            return Ok(DeleteFolderResponse::default());
        }
        serde_json::from_value(data).map_err(ApiError::parse)
    }

    /// Move items into `target_folder_id` (tree drag path).
    pub async fn move_items(
        &self,
        target_folder_id: &str,
        links: Vec<String>,
        folders: Vec<String>,
    ) -> ApiResult<()> {
        self.post_form(
            &self.folder_url(target_folder_id),
            &move_items_payload(links, folders),
        )
        .await
        .map(|_| ())
    }

    /// Move checked or dropped table items (posted to the page itself).
    pub async fn move_selected_items_to(
        &self,
        target_folder_id: &str,
        links: Vec<String>,
        folders: Vec<String>,
    ) -> ApiResult<()> {
        self.post_form(
            &crate::util::page_url(),
            &move_selected_payload(target_folder_id, links, folders),
        )
        .await
        .map(|_| ())
    }

    pub async fn folder_contents(&self, folder_id: &str) -> ApiResult<String> {
        self.get_text(&self.folder_url(folder_id)).await
    }

    /// Server side of a tree mutation.
    pub async fn perform(&self, op: &TreeOp) -> ApiResult<()> {
        match op {
            TreeOp::Rename { node, name } => {
                self.rename_folder_at(&self.folder_url(node), name).await
            }
            TreeOp::Move {
                node, new_parent, ..
            } => {
                self.move_items(new_parent, vec![], vec![node.clone()])
                    .await
            }
            TreeOp::Delete { node } => {
                delete_outcome(self.delete_folder_at(&self.folder_url(node)).await?)
            }
        }
    }
}

pub(crate) fn parse_json_body(text: &str) -> ApiResult<serde_json::Value> {
    if text.trim().is_empty() {
        return Ok(serde_json::Value::Null);
    }
    serde_json::from_str(text).map_err(ApiError::parse)
}

pub(crate) const DELETE_FAILED_MESSAGE: &str = "Could not delete folder.";

/// A 2xx with `success: false` still means nothing was deleted.
pub(crate) fn delete_outcome(resp: DeleteFolderResponse) -> ApiResult<()> {
    if resp.success {
        return Ok(());
    }
    let body = resp
        .error
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| DELETE_FAILED_MESSAGE.to_string());
    Err(ApiError::Http { status: 200, body })
}

pub(crate) fn save_field_payload(kind: FieldKind, link_id: &str, value: &str) -> FormPayload {
    FormPayload::action(kind.action())
        .field("link_id", link_id)
        .field(kind.as_ref(), value)
}

pub(crate) fn rename_folder_payload(name: &str) -> FormPayload {
    FormPayload::action("rename_folder").field("name", name)
}

pub(crate) fn move_items_payload(links: Vec<String>, folders: Vec<String>) -> FormPayload {
    FormPayload::action("move_items")
        .list("links", links)
        .list("folders", folders)
}

pub(crate) fn move_selected_payload(
    target_folder_id: &str,
    links: Vec<String>,
    folders: Vec<String>,
) -> FormPayload {
    FormPayload::new()
        .field("move_selected_items_to", target_folder_id)
        .list("links", links)
        .list("folders", folders)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_url_substitutes_placeholder() {
        let c = ApiClient::new("/manage/folder/FOLDER_ID".to_string());
        assert_eq!(c.folder_url("3"), "/manage/folder/3");
    }

    fn pairs(p: &FormPayload) -> Vec<(&str, &str)> {
        p.pairs()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    #[test]
    fn test_save_notes_payload() {
        let p = save_field_payload(FieldKind::Notes, "42", "abc");
        assert_eq!(
            pairs(&p),
            vec![("action", "save_notes"), ("link_id", "42"), ("notes", "abc")]
        );
    }

    #[test]
    fn test_save_title_payload() {
        let p = save_field_payload(FieldKind::Title, "42", "New title");
        assert_eq!(
            pairs(&p),
            vec![("action", "save_title"), ("link_id", "42"), ("title", "New title")]
        );
    }

    #[test]
    fn test_move_items_payload_for_tree_move() {
        let p = move_items_payload(vec![], vec!["7".to_string()]);
        assert_eq!(p.get("action"), Some("move_items"));
        assert!(p.get_all("links").is_empty());
        assert_eq!(pairs(&p), vec![("action", "move_items"), ("folders", "7")]);
    }

    #[test]
    fn test_move_selected_payload_has_no_action() {
        let p = move_selected_payload(
            "3",
            vec!["10".to_string(), "11".to_string()],
            vec!["7".to_string()],
        );
        assert!(p.get("action").is_none());
        assert_eq!(
            pairs(&p),
            vec![
                ("move_selected_items_to", "3"),
                ("links", "10"),
                ("links", "11"),
                ("folders", "7"),
            ]
        );
    }

    #[test]
    fn test_rename_payload() {
        assert_eq!(
            pairs(&rename_folder_payload("Case files")),
            vec![("action", "rename_folder"), ("name", "Case files")]
        );
    }

    #[test]
    fn test_delete_outcome_success() {
        let resp = DeleteFolderResponse {
            success: true,
            error: None,
        };
        assert_eq!(delete_outcome(resp), Ok(()));
    }

    #[test]
    fn test_delete_outcome_failure_carries_server_error() {
        let resp = DeleteFolderResponse {
            success: false,
            error: Some("Folder is not empty.".to_string()),
        };
        let err = delete_outcome(resp).expect_err("success:false is a rejection");
        assert_eq!(err.status(), 200);
        assert_eq!(err.user_message(), "Folder is not empty.");
    }

    #[test]
    fn test_delete_outcome_failure_without_error_has_fallback_message() {
        let resp: DeleteFolderResponse =
            serde_json::from_str(r#"{"success": false}"#).expect("should parse");
        let err = delete_outcome(resp).expect_err("success:false is a rejection");
        assert_eq!(err.user_message(), DELETE_FAILED_MESSAGE);
    }

    #[test]
    fn test_user_message_prefers_body() {
        let e = ApiError::Http {
            status: 400,
            body: "Folder name is taken.".to_string(),
        };
        assert_eq!(e.user_message(), "Folder name is taken.");

        let e = ApiError::Http {
            status: 500,
            body: "  ".to_string(),
        };
        assert_eq!(e.user_message(), "Error 500");

        let e = ApiError::Network("connection refused".to_string());
        assert_eq!(e.user_message(), "Error 0");
        assert_eq!(e.status(), 0);
    }

    #[test]
    fn test_parse_json_body() {
        assert_eq!(parse_json_body("").ok(), Some(serde_json::Value::Null));
        assert_eq!(
            parse_json_body(r#"{"success": true}"#).ok(),
            Some(serde_json::json!({"success": true}))
        );
        assert!(matches!(parse_json_body("<html>"), Err(ApiError::Parse(_))));
    }
}

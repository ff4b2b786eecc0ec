use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// A folder as the tree widget knows it.
///
/// `parent_id` is `None` for top-level folders (the user's "My Links" root and
/// organization shared folders).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct FolderNode {
    pub id: String,
    pub parent_id: Option<String>,
    pub name: String,
}

/// Which saved attribute of a link an editable field maps to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub(crate) enum FieldKind {
    Notes,
    Title,
}

impl FieldKind {
    /// Value of the `action` form field that saves this attribute.
    pub fn action(&self) -> &'static str {
        match self {
            FieldKind::Notes => "save_notes",
            FieldKind::Title => "save_title",
        }
    }

    /// CSS class of the status element next to the field.
    pub fn status_class(&self) -> &'static str {
        match self {
            FieldKind::Notes => "notes-save-status",
            FieldKind::Title => "title-save-status",
        }
    }
}

/// One saved attribute of one link. The live text stays in the DOM input.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct EditableField {
    pub kind: FieldKind,
    pub link_id: String,
}

impl EditableField {
    pub fn new(kind: FieldKind, link_id: impl Into<String>) -> Self {
        Self {
            kind,
            link_id: link_id.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct DeleteFolderResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// A table row being dragged onto a folder row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum DragItem {
    Link(String),
    Folder(String),
}

impl DragItem {
    const LINK_PREFIX: &'static str = "link:";
    const FOLDER_PREFIX: &'static str = "folder:";

    /// Encoding used for `DataTransfer` text payloads.
    pub fn to_transfer_string(&self) -> String {
        match self {
            DragItem::Link(id) => format!("{}{}", Self::LINK_PREFIX, id),
            DragItem::Folder(id) => format!("{}{}", Self::FOLDER_PREFIX, id),
        }
    }

    pub fn from_transfer_string(s: &str) -> Option<Self> {
        let (item, id) = if let Some(id) = s.strip_prefix(Self::LINK_PREFIX) {
            (DragItem::Link(id.to_string()), id)
        } else if let Some(id) = s.strip_prefix(Self::FOLDER_PREFIX) {
            (DragItem::Folder(id.to_string()), id)
        } else {
            return None;
        };

        if id.trim().is_empty() {
            None
        } else {
            Some(item)
        }
    }

    /// Split into the `(links, folders)` arrays the move endpoints expect.
    pub fn into_move_lists(self) -> (Vec<String>, Vec<String>) {
        match self {
            DragItem::Link(id) => (vec![id], vec![]),
            DragItem::Folder(id) => (vec![], vec![id]),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum Severity {
    Danger,
    Warning,
    Info,
    Success,
}

/// Message shown through the page's generic "inform user" channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Notice {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_kind_actions() {
        assert_eq!(FieldKind::Notes.action(), "save_notes");
        assert_eq!(FieldKind::Title.action(), "save_title");
        assert_eq!(FieldKind::Notes.as_ref(), "notes");
        assert_eq!(FieldKind::Title.to_string(), "title");
        assert_eq!(FieldKind::Notes.status_class(), "notes-save-status");
        assert_eq!(FieldKind::Title.status_class(), "title-save-status");
    }

    #[test]
    fn test_delete_folder_response_contract_deserialize() {
        let ok: DeleteFolderResponse =
            serde_json::from_str(r#"{"success": true}"#).expect("should parse");
        assert!(ok.success);
        assert!(ok.error.is_none());

        let failed: DeleteFolderResponse =
            serde_json::from_str(r#"{"success": false, "error": "Folder is not empty."}"#)
                .expect("should parse");
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("Folder is not empty."));

        // Missing `success` reads as failure.
        let empty: DeleteFolderResponse = serde_json::from_str("{}").expect("should parse");
        assert!(!empty.success);
    }

    #[test]
    fn test_drag_item_transfer_string() {
        let item = DragItem::Folder("7".to_string());
        let s = item.to_transfer_string();
        assert_eq!(s, "folder:7");
        assert_eq!(DragItem::from_transfer_string(&s), Some(item));

        assert_eq!(
            DragItem::from_transfer_string("link:42"),
            Some(DragItem::Link("42".to_string()))
        );
        assert!(DragItem::from_transfer_string("link:").is_none());
        assert!(DragItem::from_transfer_string("42").is_none());
    }

    #[test]
    fn test_drag_item_move_lists() {
        let (links, folders) = DragItem::Folder("7".to_string()).into_move_lists();
        assert!(links.is_empty());
        assert_eq!(folders, vec!["7".to_string()]);

        let (links, folders) = DragItem::Link("42".to_string()).into_move_lists();
        assert_eq!(links, vec!["42".to_string()]);
        assert!(folders.is_empty());
    }

    #[test]
    fn test_severity_strings() {
        assert_eq!(Severity::Danger.as_ref(), "danger");
        assert_eq!(Severity::Success.to_string(), "success");
    }
}

//! Screen descriptor, close result and history entry types

use serde::{Deserialize, Serialize};

use crate::types::{Domain, Record, RecordId};

/// Marker identifying history entries pushed by a navigation stack
pub const HISTORY_MARKER: &str = "stackview.frame";

/// Kind of view a screen renders
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    #[default]
    List,
    Form,
}

/// Whether fields are read-only or editable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    View,
    Edit,
}

/// Why a screen was opened
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    #[default]
    View,
    Select,
    Add,
    Create,
    Update,
}

impl Purpose {
    /// Purposes that can only be served by an editable screen
    #[must_use]
    pub fn requires_edit(self) -> bool {
        matches!(self, Self::Create | Self::Update)
    }
}

/// Serializable description of one screen.
///
/// This is also the projection mirrored into browser history, so equality is
/// structural over every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenDescriptor {
    pub entity: String,
    #[serde(default)]
    pub view_kind: ViewKind,
    #[serde(default)]
    pub view_name: String,
    #[serde(default)]
    pub domain: Domain,
    #[serde(default)]
    pub mode: ViewMode,
    #[serde(default)]
    pub purpose: Purpose,
    /// Empty until the descriptor is normalized by the navigation stack
    #[serde(default)]
    pub lang: String,
}

impl ScreenDescriptor {
    /// List screen over every record of `entity`
    #[must_use]
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            view_kind: ViewKind::default(),
            view_name: String::new(),
            domain: Domain::default(),
            mode: ViewMode::default(),
            purpose: Purpose::default(),
            lang: String::new(),
        }
    }

    #[must_use]
    pub fn form(mut self) -> Self {
        self.view_kind = ViewKind::Form;
        self
    }

    #[must_use]
    pub fn with_view_name(mut self, view_name: impl Into<String>) -> Self {
        self.view_name = view_name.into();
        self
    }

    #[must_use]
    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: ViewMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_purpose(mut self, purpose: Purpose) -> Self {
        self.purpose = purpose;
        self
    }

    #[must_use]
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// Fill in defaults before the descriptor backs a screen.
    ///
    /// `inherited` (the active screen's language) wins over the descriptor's own
    /// language, which wins over `fallback`.
    pub fn normalize(&mut self, inherited: Option<&str>, fallback: &str) {
        if let Some(lang) = inherited.filter(|lang| !lang.is_empty()) {
            self.lang = lang.to_string();
        } else if self.lang.is_empty() {
            self.lang = fallback.to_string();
        }
        if self.purpose.requires_edit() {
            self.mode = ViewMode::Edit;
        }
    }

    /// Label shown in the breadcrumb
    #[must_use]
    pub fn label(&self) -> &str {
        if self.view_name.is_empty() {
            &self.entity
        } else {
            &self.view_name
        }
    }
}

/// Value a screen yields to its opener when it closes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenResult {
    /// Records picked on a select screen
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selection: Vec<RecordId>,
    /// Record saved by a create/update screen
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<Record>,
}

impl ScreenResult {
    #[must_use]
    pub fn selection(ids: Vec<RecordId>) -> Self {
        Self {
            selection: ids,
            record: None,
        }
    }

    /// Whether the screen was dismissed without producing anything
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selection.is_empty() && self.record.is_none()
    }
}

/// State object stored in one browser history entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryState {
    pub marker: String,
    /// URL of the page/frame that pushed the entry
    pub url: String,
    /// Projections of every screen above the root, bottom first
    pub stack: Vec<ScreenDescriptor>,
}

impl HistoryState {
    #[must_use]
    pub fn new(url: impl Into<String>, stack: Vec<ScreenDescriptor>) -> Self {
        Self {
            marker: HISTORY_MARKER.to_string(),
            url: url.into(),
            stack,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_and_update_force_edit_mode() {
        for purpose in [Purpose::Create, Purpose::Update] {
            let mut descriptor = ScreenDescriptor::new("product")
                .with_purpose(purpose)
                .with_mode(ViewMode::View);
            descriptor.normalize(None, "en");
            assert_eq!(descriptor.mode, ViewMode::Edit);
        }

        for purpose in [Purpose::View, Purpose::Select, Purpose::Add] {
            let mut descriptor = ScreenDescriptor::new("product").with_purpose(purpose);
            descriptor.normalize(None, "en");
            assert_eq!(descriptor.mode, ViewMode::View);
        }
    }

    #[test]
    fn inherited_language_wins() {
        let mut descriptor = ScreenDescriptor::new("product").with_lang("fr");
        descriptor.normalize(Some("de"), "en");
        assert_eq!(descriptor.lang, "de");

        let mut descriptor = ScreenDescriptor::new("product").with_lang("fr");
        descriptor.normalize(None, "en");
        assert_eq!(descriptor.lang, "fr");

        let mut descriptor = ScreenDescriptor::new("product");
        descriptor.normalize(Some(""), "en");
        assert_eq!(descriptor.lang, "en");
    }

    #[test]
    fn history_state_wire_format() {
        let state = HistoryState::new(
            "https://admin.local/app",
            vec![ScreenDescriptor::new("product").form().with_lang("en")],
        );
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["marker"], HISTORY_MARKER);
        assert_eq!(json["stack"][0]["viewKind"], "form");
        assert_eq!(json["stack"][0]["purpose"], "view");
        assert_eq!(json["stack"][0]["domain"], json!([]));

        let parsed: HistoryState = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, state);
    }
}

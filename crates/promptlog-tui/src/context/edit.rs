use promptlog_types::{PromptEntry, PromptPatch, EMPTY_CONTENT_PLACEHOLDER};

use crate::api::UpdatePromptRequest;

/// Row-level edit session: `viewing -> editing -> viewing`.
///
/// The draft lives here, outside the store, until it is committed.
#[derive(Debug, Clone)]
pub struct EditState<D> {
    editing: Option<(i64, D)>,
}

impl<D> Default for EditState<D> {
    fn default() -> Self {
        Self { editing: None }
    }
}

impl<D> EditState<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts editing `id`. Focusing the row already being edited keeps the
    /// current draft.
    pub fn begin(&mut self, id: i64, draft: D) {
        if self.is_editing(id) {
            return;
        }
        self.editing = Some((id, draft));
    }

    pub fn is_editing(&self, id: i64) -> bool {
        matches!(&self.editing, Some((current, _)) if *current == id)
    }

    pub fn is_active(&self) -> bool {
        self.editing.is_some()
    }

    pub fn editing_id(&self) -> Option<i64> {
        self.editing.as_ref().map(|(id, _)| *id)
    }

    pub fn draft(&self) -> Option<&D> {
        self.editing.as_ref().map(|(_, d)| d)
    }

    pub fn draft_mut(&mut self) -> Option<&mut D> {
        self.editing.as_mut().map(|(_, d)| d)
    }

    /// Leaves edit mode and hands back the draft for a save attempt.
    pub fn commit(&mut self) -> Option<(i64, D)> {
        self.editing.take()
    }

    pub fn cancel(&mut self) {
        self.editing = None;
    }
}

/// Inline rename buffer for project and task rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameDraft {
    pub name: String,
}

impl NameDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Trimmed name, or `None` when the input is blank.
    pub fn validated(&self) -> Option<String> {
        let trimmed = self.name.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptField {
    #[default]
    Title,
    Model,
    Tags,
    Content,
}

impl PromptField {
    pub fn next(self) -> Self {
        match self {
            Self::Title => Self::Model,
            Self::Model => Self::Tags,
            Self::Tags => Self::Content,
            Self::Content => Self::Title,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Model => "Model",
            Self::Tags => "Tags",
            Self::Content => "Content",
        }
    }
}

/// Editable form of a prompt entry. Tags are kept as the comma separated
/// text the user types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptDraft {
    pub title: String,
    pub content: String,
    pub tags: String,
    pub model: String,
    pub field: PromptField,
}

pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl PromptDraft {
    pub fn from_entry(entry: &PromptEntry) -> Self {
        let content = if entry.is_placeholder_content() {
            String::new()
        } else {
            entry.content.clone()
        };
        Self {
            title: entry.title.clone().unwrap_or_default(),
            content,
            tags: entry.tags.as_deref().map(|t| t.join(", ")).unwrap_or_default(),
            model: entry.model.clone().unwrap_or_default(),
            field: PromptField::default(),
        }
    }

    pub fn field_mut(&mut self, field: PromptField) -> &mut String {
        match field {
            PromptField::Title => &mut self.title,
            PromptField::Model => &mut self.model,
            PromptField::Tags => &mut self.tags,
            PromptField::Content => &mut self.content,
        }
    }

    pub fn active_mut(&mut self) -> &mut String {
        let field = self.field;
        self.field_mut(field)
    }

    /// Content as it will be stored; a cleared body becomes the placeholder.
    pub fn stored_content(&self) -> String {
        if self.content.trim().is_empty() {
            EMPTY_CONTENT_PLACEHOLDER.to_string()
        } else {
            self.content.clone()
        }
    }

    pub fn to_update(&self, id: i64) -> UpdatePromptRequest {
        let tags = parse_tags(&self.tags);
        UpdatePromptRequest {
            id,
            title: non_empty(&self.title),
            content: Some(self.stored_content()),
            tags: (!tags.is_empty()).then_some(tags),
            model: non_empty(&self.model),
        }
    }

    /// Mirror of an accepted update. Cleared optional fields are written back
    /// as empty so the cache matches what the user sees.
    pub fn to_patch(&self, now: chrono::DateTime<chrono::Utc>) -> PromptPatch {
        PromptPatch {
            title: Some(self.title.trim().to_string()),
            content: Some(self.stored_content()),
            tags: Some(parse_tags(&self.tags)),
            model: Some(self.model.trim().to_string()),
            updated_at: Some(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(content: &str) -> PromptEntry {
        PromptEntry {
            id: 3,
            task_id: 1,
            title: Some("Greeting".into()),
            content: content.into(),
            tags: Some(vec!["a".into(), "b".into()]),
            model: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_begin_is_idempotent_for_same_row() {
        let mut edit = EditState::new();
        edit.begin(1, NameDraft::new("first"));
        edit.draft_mut().unwrap().name.push_str(" typed");
        edit.begin(1, NameDraft::new("reset?"));
        assert_eq!(edit.draft().unwrap().name, "first typed");

        edit.begin(2, NameDraft::new("other"));
        assert!(edit.is_editing(2));
        assert_eq!(edit.commit(), Some((2, NameDraft::new("other"))));
        assert!(!edit.is_active());
    }

    #[test]
    fn test_blank_name_fails_validation() {
        assert_eq!(NameDraft::new("   ").validated(), None);
        assert_eq!(NameDraft::new("  Alpha ").validated().as_deref(), Some("Alpha"));
    }

    #[test]
    fn test_placeholder_round_trips_through_editing() {
        let draft = PromptDraft::from_entry(&entry(EMPTY_CONTENT_PLACEHOLDER));
        assert_eq!(draft.content, "");
        assert_eq!(draft.tags, "a, b");
        assert_eq!(draft.to_update(3).content.as_deref(), Some(" "));
    }

    #[test]
    fn test_tags_are_trimmed_and_empties_dropped() {
        assert_eq!(parse_tags(" rust, ,cli ,, "), vec!["rust", "cli"]);
        assert!(parse_tags("").is_empty());
    }

    #[test]
    fn test_update_request_omits_blank_optionals() {
        let draft = PromptDraft {
            title: "  ".into(),
            content: "Body".into(),
            tags: "x".into(),
            model: " gpt-4o ".into(),
            field: PromptField::Content,
        };
        let update = draft.to_update(9);
        assert_eq!(update.title, None);
        assert_eq!(update.model.as_deref(), Some("gpt-4o"));
        assert_eq!(update.tags, Some(vec!["x".to_string()]));
    }
}

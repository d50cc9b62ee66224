use serde::{Deserialize, Serialize};

use crate::PromptEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptSort {
    #[default]
    Created,
    Modified,
}

impl PromptSort {
    pub fn toggle(self) -> Self {
        match self {
            Self::Created => Self::Modified,
            Self::Modified => Self::Created,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "created" => Some(Self::Created),
            "modified" | "updated" => Some(Self::Modified),
            _ => None,
        }
    }
}

/// Most recent first. The sort is stable so entries with equal keys keep
/// their backend order.
pub fn sort_prompts<'a>(entries: &'a [PromptEntry], mode: PromptSort) -> Vec<&'a PromptEntry> {
    let mut sorted: Vec<&PromptEntry> = entries.iter().collect();
    match mode {
        PromptSort::Created => sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        PromptSort::Modified => sorted.sort_by(|a, b| b.last_modified().cmp(&a.last_modified())),
    }
    sorted
}

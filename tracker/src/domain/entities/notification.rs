//! New-entry notifications

use serde::Serialize;

/// Emitted once per newly detected entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub entry_id: String,
    /// Topic stream that detected the entry
    pub topic: String,
    pub title: String,
    /// Absolute link to the entry
    pub link: String,
    pub image: Option<String>,
    /// Creation date, already formatted for display
    pub date: String,
    pub tags: Vec<String>,
    pub subtitle: Option<String>,
}

impl Notification {
    /// Subtitle (if any), a blank line, then the tags as inline code
    pub fn description(&self) -> String {
        let tags = self
            .tags
            .iter()
            .map(|tag| format!("`{}`", tag))
            .collect::<Vec<_>>()
            .join(" ");

        match self.subtitle.as_deref().filter(|s| !s.is_empty()) {
            Some(subtitle) if tags.is_empty() => subtitle.to_string(),
            Some(subtitle) => format!("{}\n\n{}", subtitle, tags),
            None => tags,
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A merged change from the AOSP code review host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub number: u64,
    pub subject: String,
    pub project: Option<String>,
    pub branch: Option<String>,
    /// Review page, e.g. https://android-review.googlesource.com/c/101
    pub url: String,
}

/// An entry from the Android Developers blog feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogEntry {
    pub title: String,
    pub link: String,
    pub published_at: Option<DateTime<Utc>>,
    /// Plain-text summary, when the feed carries one
    pub summary: Option<String>,
}

impl ChangeRecord {
    /// Seen-state identifier for this change
    pub fn id(&self) -> String {
        change_id(self.number)
    }
}

impl BlogEntry {
    /// Seen-state identifier for this entry
    pub fn id(&self) -> String {
        blog_id(&self.link)
    }
}

pub fn change_id(number: u64) -> String {
    format!("change:{}", number)
}

pub fn blog_id(link: &str) -> String {
    format!("blog:{}", link)
}

/// Review page URL for a change number on `base_url`
pub fn review_url(base_url: &str, number: u64) -> String {
    format!("{}/c/{}", base_url.trim_end_matches('/'), number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_derived_from_fields() {
        let change = ChangeRecord {
            number: 101,
            subject: "Fix X".to_string(),
            project: None,
            branch: None,
            url: review_url("https://android-review.googlesource.com/", 101),
        };
        assert_eq!(change.id(), "change:101");
        assert_eq!(change.url, "https://android-review.googlesource.com/c/101");

        let entry = BlogEntry {
            title: "Android 16".to_string(),
            link: "https://android-developers.googleblog.com/2025/06/android-16.html".to_string(),
            published_at: None,
            summary: None,
        };
        assert_eq!(
            entry.id(),
            "blog:https://android-developers.googleblog.com/2025/06/android-16.html"
        );
    }
}

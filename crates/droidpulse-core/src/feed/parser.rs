use feed_rs::parser;
use serde::Deserialize;

use super::models::{review_url, BlogEntry, ChangeRecord};
use crate::{Error, Result};

/// Anti-XSSI prefix Gerrit puts in front of every JSON response
pub const XSSI_PREFIX: &str = ")]}'";

/// Max characters of blog summary text kept per entry
const SUMMARY_MAX_CHARS: usize = 280;

/// Change as returned by the Gerrit REST API (only the fields we use)
#[derive(Debug, Deserialize)]
struct GerritChange {
    #[serde(rename = "_number")]
    number: u64,
    #[serde(default)]
    subject: String,
    project: Option<String>,
    branch: Option<String>,
}

/// Remove the Gerrit anti-hijack prefix and the newline that follows it.
/// Bodies without the prefix are returned unchanged.
pub fn strip_xssi_prefix(body: &str) -> &str {
    match body.strip_prefix(XSSI_PREFIX) {
        Some(rest) => rest.trim_start_matches(['\r', '\n']),
        None => body,
    }
}

/// Parse a Gerrit `/changes/` response body into change records
pub fn parse_changes(body: &str, base_url: &str) -> Result<Vec<ChangeRecord>> {
    let json = strip_xssi_prefix(body);
    let changes: Vec<GerritChange> = serde_json::from_str(json)
        .map_err(|e| Error::FeedParse(format!("Invalid Gerrit response: {}", e)))?;

    Ok(changes
        .into_iter()
        .map(|c| ChangeRecord {
            url: review_url(base_url, c.number),
            number: c.number,
            subject: c.subject,
            project: c.project,
            branch: c.branch,
        })
        .collect())
}

/// Parse Atom/RSS content into blog entries, in feed order.
/// Entries without any link cannot be identified and are skipped.
pub fn parse_blog_feed(content: &[u8]) -> Result<Vec<BlogEntry>> {
    let feed = parser::parse(content)
        .map_err(|e| Error::FeedParse(e.to_string()))?;

    let entries = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            // Blogger feeds list replies/edit/self links before the article itself
            let link = entry
                .links
                .iter()
                .find(|l| l.rel.as_deref() == Some("alternate"))
                .or_else(|| entry.links.first())
                .map(|l| l.href.clone())?;

            let title = entry
                .title
                .map(|t| t.content.trim().to_string())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Untitled".to_string());

            let summary = entry
                .summary
                .map(|s| s.content)
                .or_else(|| entry.content.and_then(|c| c.body))
                .map(|html| html_to_text(&html))
                .map(|text| truncate_chars(text.trim(), SUMMARY_MAX_CHARS).to_string())
                .filter(|text| !text.is_empty());

            Some(BlogEntry {
                title,
                link,
                published_at: entry.published.or(entry.updated),
                summary,
            })
        })
        .collect();

    Ok(entries)
}

/// Convert HTML content to plain text
fn html_to_text(html: &str) -> String {
    html2text::from_read(html.as_bytes(), 120)
        .unwrap_or_else(|_| html.to_string())
}

fn truncate_chars(input: &str, max_chars: usize) -> &str {
    match input.char_indices().nth(max_chars) {
        Some((idx, _)) => &input[..idx],
        None => input,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://android-review.googlesource.com";

    #[test]
    fn test_strip_xssi_prefix() {
        assert_eq!(strip_xssi_prefix(")]}'\n[]"), "[]");
        assert_eq!(strip_xssi_prefix(")]}'\r\n[{}]"), "[{}]");
        assert_eq!(strip_xssi_prefix(")]}'[]"), "[]");
        // Missing prefix passes through untouched
        assert_eq!(strip_xssi_prefix("[]"), "[]");
        // Shorter than the prefix
        assert_eq!(strip_xssi_prefix(")]"), ")]");
        assert_eq!(strip_xssi_prefix(""), "");
    }

    #[test]
    fn test_parse_changes() {
        let body = r#")]}'
[
  {"id": "platform%2Fbuild~main~I1", "project": "platform/build", "branch": "main",
   "subject": "Fix X", "status": "MERGED", "_number": 101},
  {"project": "platform/art", "subject": "Fix Y", "_number": 102, "insertions": 3}
]"#;

        let changes = parse_changes(body, BASE).unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].number, 101);
        assert_eq!(changes[0].subject, "Fix X");
        assert_eq!(changes[0].project.as_deref(), Some("platform/build"));
        assert_eq!(changes[0].url, "https://android-review.googlesource.com/c/101");
        assert_eq!(changes[1].branch, None);
        assert_eq!(changes[1].url, "https://android-review.googlesource.com/c/102");
    }

    #[test]
    fn test_parse_changes_rejects_truncated_body() {
        let body = ")]}'\n[{\"_number\": 101, \"subject\": \"Fix";
        assert!(matches!(parse_changes(body, BASE), Err(Error::FeedParse(_))));

        assert!(parse_changes(")]}", BASE).is_err());
    }

    #[test]
    fn test_parse_blog_feed_prefers_alternate_link() {
        let atom = br#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <id>tag:blogger.com,1999:blog-1</id>
  <title>Android Developers Blog</title>
  <updated>2025-06-10T17:00:00Z</updated>
  <entry>
    <id>tag:blogger.com,1999:post-1</id>
    <title>Android 16 is here</title>
    <updated>2025-06-10T17:00:00Z</updated>
    <published>2025-06-10T17:00:00Z</published>
    <summary type="html">&lt;p&gt;Stable release &lt;b&gt;today&lt;/b&gt;.&lt;/p&gt;</summary>
    <link rel="replies" type="text/html" href="https://android-developers.googleblog.com/2025/06/android-16.html#comments"/>
    <link rel="alternate" type="text/html" href="https://android-developers.googleblog.com/2025/06/android-16.html"/>
  </entry>
  <entry>
    <id>tag:blogger.com,1999:post-2</id>
    <title></title>
    <updated>2025-06-09T17:00:00Z</updated>
    <link rel="alternate" type="text/html" href="https://android-developers.googleblog.com/2025/06/untitled.html"/>
  </entry>
</feed>"#;

        let entries = parse_blog_feed(atom).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Android 16 is here");
        assert_eq!(
            entries[0].link,
            "https://android-developers.googleblog.com/2025/06/android-16.html"
        );
        assert!(entries[0].published_at.is_some());
        let summary = entries[0].summary.as_deref().unwrap();
        assert!(summary.contains("Stable release"));
        assert!(!summary.contains("<p>"));

        assert_eq!(entries[1].title, "Untitled");
        assert!(entries[1].summary.is_none());
    }

    #[test]
    fn test_parse_blog_feed_rejects_garbage() {
        assert!(matches!(parse_blog_feed(b"not a feed"), Err(Error::FeedParse(_))));
    }
}

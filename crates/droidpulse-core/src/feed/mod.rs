mod fetcher;
mod models;
mod parser;

pub use fetcher::{BlogFeedSource, BlogSource, ChangeSource, FeedFetcher, GerritSource};
pub use models::{blog_id, change_id, review_url, BlogEntry, ChangeRecord};
pub use parser::{parse_blog_feed, parse_changes, strip_xssi_prefix, XSSI_PREFIX};

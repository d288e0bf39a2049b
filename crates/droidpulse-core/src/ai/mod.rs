pub mod providers;
mod drafts;

pub use drafts::{
    build_prompt, extract_json_object, fallback_drafts, parse_bullet_lines, parse_drafts,
    DraftGenerator,
};
pub use providers::AiProvider;

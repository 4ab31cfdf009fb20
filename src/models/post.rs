use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub image_urls: Vec<String>,
    pub author: Option<PostAuthor>,
    pub category: Option<String>,
    pub featured: bool,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostAuthor {
    pub name: String,
    pub role: Option<String>,
    pub avatar: Option<String>,
}

/// Fields supplied by the create form. The repository fills in everything
/// derived (id, slug, created_at).
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub title: String,
    pub summary: String,
    pub content: String,
    pub image_urls: Vec<String>,
    pub author: Option<PostAuthor>,
    pub category: Option<String>,
    pub featured: bool,
}

/// Fields the edit form may rewrite. Slug and created_at are not here on
/// purpose; they are fixed at creation.
#[derive(Debug, Clone)]
pub struct PostChanges {
    pub title: String,
    pub summary: String,
    pub content: String,
    pub image_urls: Vec<String>,
    pub author: Option<PostAuthor>,
    pub category: Option<String>,
    pub featured: bool,
}

/// Derive a URL-safe slug from a post title: lowercase, collapse every run
/// of non-alphanumeric characters into one hyphen, trim hyphens at the
/// ends. Deterministic and idempotent; collisions between identical titles
/// are not detected here.
#[must_use]
pub fn slugify(title: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"[^a-z0-9]+").expect("Invalid regex pattern defined in code")
    });

    re.replace_all(&title.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// Rough reading time at 200 words per minute, rounded up.
#[must_use]
pub fn estimate_read_time(content: &str) -> String {
    const WORDS_PER_MINUTE: usize = 200;

    let words = content.split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    format!("{minutes} min read")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_punctuation_runs() {
        assert_eq!(slugify("Hello, World! 2024"), "hello-world-2024");
    }

    #[test]
    fn slugify_trims_edge_hyphens() {
        assert_eq!(slugify("  --Edge--  "), "edge");
    }

    #[test]
    fn slugify_is_idempotent() {
        let once = slugify("A Day in the Life: Part II");
        assert_eq!(slugify(&once), once);
    }

    #[test]
    fn slugify_handles_only_punctuation() {
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn read_time_rounds_up() {
        let short = "word ".repeat(10);
        assert_eq!(estimate_read_time(&short), "1 min read");

        let long = "word ".repeat(401);
        assert_eq!(estimate_read_time(&long), "3 min read");
    }
}

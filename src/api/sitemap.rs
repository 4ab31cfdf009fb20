use axum::{
    extract::State,
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

use super::{ApiError, AppState};

#[derive(Serialize)]
#[serde(rename = "urlset")]
struct Urlset {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    url: Vec<UrlEntry>,
}

#[derive(Serialize)]
struct UrlEntry {
    loc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    lastmod: Option<String>,
    changefreq: &'static str,
    priority: &'static str,
}

/// GET /sitemap.xml
/// The site root plus one entry per post, for crawlers.
pub async fn sitemap(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let posts = state.store().list_posts().await?;
    let base = state.public_url().trim_end_matches('/');

    let mut urls = vec![UrlEntry {
        loc: base.to_string(),
        lastmod: Some(chrono::Utc::now().to_rfc3339()),
        changefreq: "daily",
        priority: "1.0",
    }];

    urls.extend(posts.into_iter().map(|post| UrlEntry {
        loc: format!("{base}/blogs/{}", post.slug),
        lastmod: Some(post.updated_at.unwrap_or(post.created_at)),
        changefreq: "weekly",
        priority: "0.8",
    }));

    let urlset = Urlset {
        xmlns: "http://www.sitemaps.org/schemas/sitemap/0.9",
        url: urls,
    };

    let body = quick_xml::se::to_string(&urlset)
        .map_err(|e| ApiError::internal(format!("Failed to serialize sitemap: {e}")))?;

    let xml = format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>{body}");

    Ok(([(CONTENT_TYPE, "application/xml")], xml).into_response())
}

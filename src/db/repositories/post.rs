use crate::entities::{posts, prelude::*};
use crate::models::post::{Post, PostChanges, PostDraft, slugify};
use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::{info, warn};

pub struct PostRepository {
    conn: DatabaseConnection,
}

impl PostRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(model: posts::Model) -> Post {
        Post {
            id: model.id,
            slug: model.slug,
            title: model.title,
            summary: model.summary,
            content: model.content,
            image_urls: parse_image_urls(model.image_urls),
            author: model.author.and_then(|s| serde_json::from_str(&s).ok()),
            category: model.category,
            featured: model.featured,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }

    pub async fn create(&self, draft: &PostDraft) -> Result<Post> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = posts::ActiveModel {
            slug: Set(slugify(&draft.title)),
            title: Set(draft.title.clone()),
            summary: Set(draft.summary.clone()),
            content: Set(draft.content.clone()),
            image_urls: Set(Some(
                serde_json::to_string(&draft.image_urls).context("Failed to encode image URLs")?,
            )),
            author: Set(draft
                .author
                .as_ref()
                .and_then(|a| serde_json::to_string(a).ok())),
            category: Set(draft.category.clone()),
            featured: Set(draft.featured),
            created_at: Set(now),
            updated_at: Set(None),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert post")?;

        info!(id = model.id, slug = %model.slug, "Created post");
        Ok(Self::map_model(model))
    }

    pub async fn get(&self, id: i32) -> Result<Option<Post>> {
        let model = Posts::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query post by id")?;

        Ok(model.map(Self::map_model))
    }

    /// Exact-match slug lookup. Duplicate slugs are possible (creation never
    /// checks for collisions); the first row wins.
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        let model = Posts::find()
            .filter(posts::Column::Slug.eq(slug))
            .one(&self.conn)
            .await
            .context("Failed to query post by slug")?;

        Ok(model.map(Self::map_model))
    }

    pub async fn list_recent(&self) -> Result<Vec<Post>> {
        let rows = Posts::find()
            .order_by_desc(posts::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list posts")?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    /// Featured posts, newest first. If the filtered query fails, serve the
    /// first `limit` of the plain newest-first list rather than erroring.
    pub async fn list_featured(&self, limit: u64) -> Result<Vec<Post>> {
        let filtered = Posts::find()
            .filter(posts::Column::Featured.eq(true))
            .order_by_desc(posts::Column::CreatedAt)
            .limit(limit)
            .all(&self.conn)
            .await;

        match filtered {
            Ok(rows) => Ok(rows.into_iter().map(Self::map_model).collect()),
            Err(err) => {
                warn!("Featured query failed, serving newest posts instead: {err}");
                let mut recent = self.list_recent().await?;
                recent.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
                Ok(recent)
            }
        }
    }

    /// Rewrites the editable fields and stamps `updated_at`. Slug and
    /// `created_at` keep their creation-time values.
    pub async fn update(&self, id: i32, changes: &PostChanges) -> Result<Option<Post>> {
        let Some(model) = Posts::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query post for update")?
        else {
            return Ok(None);
        };

        let now = chrono::Utc::now().to_rfc3339();

        let mut active: posts::ActiveModel = model.into();
        active.title = Set(changes.title.clone());
        active.summary = Set(changes.summary.clone());
        active.content = Set(changes.content.clone());
        active.image_urls = Set(Some(
            serde_json::to_string(&changes.image_urls).context("Failed to encode image URLs")?,
        ));
        active.author = Set(changes
            .author
            .as_ref()
            .and_then(|a| serde_json::to_string(a).ok()));
        active.category = Set(changes.category.clone());
        active.featured = Set(changes.featured);
        active.updated_at = Set(Some(now));

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update post")?;

        info!(id = model.id, "Updated post");
        Ok(Some(Self::map_model(model)))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Posts::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete post")?;

        let removed = result.rows_affected > 0;
        if removed {
            info!(id, "Deleted post");
        }
        Ok(removed)
    }

    pub async fn count(&self) -> Result<u64> {
        Posts::find()
            .count(&self.conn)
            .await
            .context("Failed to count posts")
    }
}

/// The column holds a JSON array, but rows written before the carousel
/// existed hold one bare URL string. Absent means no images.
fn parse_image_urls(raw: Option<String>) -> Vec<String> {
    match raw {
        None => Vec::new(),
        Some(s) => serde_json::from_str::<Vec<String>>(&s).unwrap_or_else(|_| {
            if s.is_empty() { Vec::new() } else { vec![s] }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase};

    fn row(id: i32, slug: &str, created_at: &str, featured: bool) -> posts::Model {
        posts::Model {
            id,
            slug: slug.to_string(),
            title: slug.to_string(),
            summary: String::new(),
            content: String::new(),
            image_urls: Some("[]".to_string()),
            author: None,
            category: None,
            featured,
            created_at: created_at.to_string(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn featured_query_failure_falls_back_to_recent() {
        let conn = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_errors(vec![DbErr::Custom("no such index".to_string())])
            .append_query_results(vec![vec![
                row(4, "newest", "2024-06-04T00:00:00Z", false),
                row(3, "newer", "2024-06-03T00:00:00Z", false),
                row(2, "older", "2024-06-02T00:00:00Z", false),
                row(1, "oldest", "2024-06-01T00:00:00Z", false),
            ]])
            .into_connection();

        let repo = PostRepository::new(conn);
        let posts = repo.list_featured(3).await.unwrap();

        let slugs: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["newest", "newer", "older"]);
    }

    #[tokio::test]
    async fn featured_query_success_skips_fallback() {
        let conn = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results(vec![vec![row(7, "pick", "2024-06-04T00:00:00Z", true)]])
            .into_connection();

        let repo = PostRepository::new(conn);
        let posts = repo.list_featured(3).await.unwrap();

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "pick");
        assert!(posts[0].featured);
    }

    #[test]
    fn image_urls_accepts_json_array() {
        let urls = parse_image_urls(Some(r#"["https://a/1.jpg","https://a/2.jpg"]"#.to_string()));
        assert_eq!(urls, ["https://a/1.jpg", "https://a/2.jpg"]);
    }

    #[test]
    fn image_urls_coerces_legacy_single_url() {
        let urls = parse_image_urls(Some("https://a/cover.jpg".to_string()));
        assert_eq!(urls, ["https://a/cover.jpg"]);
    }

    #[test]
    fn image_urls_defaults_to_empty() {
        assert!(parse_image_urls(None).is_empty());
        assert!(parse_image_urls(Some(String::new())).is_empty());
    }
}

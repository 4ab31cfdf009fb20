use serde::{Deserialize, Serialize};

use crate::models::post::{Post, PostAuthor, estimate_read_time};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Wire shape for a post. Field names are camelCase because the reading
/// frontend predates this server and already speaks that contract.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDto {
    pub id: i32,
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub image_urls: Vec<String>,
    /// First image, kept for single-image consumers.
    pub image_url: Option<String>,
    pub author: Option<PostAuthor>,
    pub category: Option<String>,
    pub featured: bool,
    pub read_time: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        let read_time = estimate_read_time(&post.content);
        let image_url = post.image_urls.first().cloned();

        Self {
            id: post.id,
            slug: post.slug,
            title: post.title,
            summary: post.summary,
            content: post.content,
            image_urls: post.image_urls,
            image_url,
            author: post.author,
            category: post.category,
            featured: post.featured,
            read_time,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: LoginUser,
}

#[derive(Debug, Serialize)]
pub struct LoginUser {
    pub email: String,
    pub name: String,
}

/// Body accepted by both the create and edit endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub author: Option<PostAuthor>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

#[derive(Debug, Serialize)]
pub struct UploadDto {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime: u64,
    pub posts: u64,
    pub database: bool,
}

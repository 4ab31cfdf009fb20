use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Derived from the title at creation time; never rewritten afterwards.
    pub slug: String,

    pub title: String,

    pub summary: String,

    pub content: String,

    /// JSON array of image URLs. Older rows may hold a bare string
    /// (single-image posts from before the carousel); readers coerce.
    pub image_urls: Option<String>,

    /// JSON object {"name", "role", "avatar"}.
    pub author: Option<String>,

    pub category: Option<String>,

    pub featured: bool,

    pub created_at: String,

    pub updated_at: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

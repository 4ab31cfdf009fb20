use async_trait::async_trait;

/// A durable URL handed back by the image-hosting service.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub url: String,
}

/// One-way delegation to an external image store: bytes in, durable URL
/// out. One call per image; callers sequence multi-image uploads and
/// collect the URLs themselves. No retries, and nothing deletes an image
/// that was uploaded before a later step failed.
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Service name used in operator-facing error messages.
    fn name(&self) -> &'static str;

    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> anyhow::Result<UploadedImage>;
}

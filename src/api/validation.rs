use super::ApiError;
use super::types::PostForm;

const MAX_TITLE_CHARS: usize = 100;
const MAX_SUMMARY_CHARS: usize = 200;

/// Same rules the dashboard form enforces client-side; the server is the
/// authority.
pub fn validate_post_form(form: &PostForm) -> Result<(), ApiError> {
    if form.title.trim().is_empty() {
        return Err(ApiError::validation("Title is required"));
    }
    if form.title.chars().count() > MAX_TITLE_CHARS {
        return Err(ApiError::validation(format!(
            "Title must be less than {} characters",
            MAX_TITLE_CHARS
        )));
    }
    if form.summary.trim().is_empty() {
        return Err(ApiError::validation("Summary is required"));
    }
    if form.summary.chars().count() > MAX_SUMMARY_CHARS {
        return Err(ApiError::validation(format!(
            "Summary must be less than {} characters",
            MAX_SUMMARY_CHARS
        )));
    }
    if form.content.trim().is_empty() {
        return Err(ApiError::validation("Content is required"));
    }
    if form.image_urls.is_empty() {
        return Err(ApiError::validation("Please select an image"));
    }

    Ok(())
}

pub fn validate_post_id(id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid post ID: {}. ID must be a positive integer",
            id
        )));
    }
    Ok(id)
}

pub fn validate_limit(limit: u64) -> Result<u64, ApiError> {
    const MAX_LIMIT: u64 = 50;
    const MIN_LIMIT: u64 = 1;

    if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
        return Err(ApiError::validation(format!(
            "Invalid limit: {}. Limit must be between {} and {}",
            limit, MIN_LIMIT, MAX_LIMIT
        )));
    }
    Ok(limit)
}

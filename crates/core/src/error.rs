/// Longest screen name Twitter allows.
pub const MAX_SCREEN_NAME_LEN: usize = 15;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid screen name: {0:?}")]
    InvalidScreenName(String),
}

/// Normalize a user-supplied Twitter handle.
///
/// Accepts `name` or `@name` with surrounding whitespace. The result is
/// 1..=15 characters of `[A-Za-z0-9_]`; case is preserved because the API
/// returns the canonical casing anyway.
pub fn normalize_screen_name(raw: &str) -> Result<String, CoreError> {
    let trimmed = raw.trim();
    let name = trimmed.strip_prefix('@').unwrap_or(trimmed);

    let valid = !name.is_empty()
        && name.len() <= MAX_SCREEN_NAME_LEN
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid {
        return Err(CoreError::InvalidScreenName(raw.to_string()));
    }
    Ok(name.to_string())
}

use thiserror::Error;

/// Keys name sprite sheets and tilesets under `assets/base/sprites/`.
/// They are relative paths without extension, so path escapes are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpriteKeyError {
    #[error("sprite key must not be empty")]
    Empty,
    #[error("sprite key has an empty path segment")]
    EmptySegment,
    #[error("sprite key must use '/' separators, not '\\\\'")]
    Backslash,
    #[error("sprite key must not contain '..'")]
    ParentTraversal,
    #[error("sprite key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

pub(crate) fn validate_sprite_key(key: &str) -> Result<(), SpriteKeyError> {
    if key.is_empty() {
        return Err(SpriteKeyError::Empty);
    }
    if key.contains('\\') {
        return Err(SpriteKeyError::Backslash);
    }
    for segment in key.split('/') {
        if segment.is_empty() {
            return Err(SpriteKeyError::EmptySegment);
        }
        if segment.contains("..") {
            return Err(SpriteKeyError::ParentTraversal);
        }
        if let Some(character) = segment.chars().find(|ch| !is_key_char(*ch)) {
            return Err(SpriteKeyError::InvalidCharacter { character });
        }
    }
    Ok(())
}

fn is_key_char(ch: char) -> bool {
    ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_' || ch == '-'
}

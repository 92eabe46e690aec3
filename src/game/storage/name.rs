use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("names must be at least {0} letters")]
    TooShort(usize),

    #[error("names must be at most {0} letters")]
    TooLong(usize),

    #[error("names may only contain letters")]
    InvalidCharacters,
}

/// Trims, validates, and canonicalizes a character name: ASCII letters only,
/// first letter upper-case, the rest lower-case. Canonicalization is
/// idempotent, so two spellings of the same name collide on disk.
pub fn canonicalize(input: &str, min_len: usize, max_len: usize) -> Result<String, NameError> {
    let trimmed = input.trim();

    if !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(NameError::InvalidCharacters);
    }
    if trimmed.len() < min_len {
        return Err(NameError::TooShort(min_len));
    }
    if trimmed.len() > max_len {
        return Err(NameError::TooLong(max_len));
    }

    let mut chars = trimmed.chars();
    let first = chars.next().expect("length checked above");
    let mut canonical = String::with_capacity(trimmed.len());
    canonical.push(first.to_ascii_uppercase());
    canonical.extend(chars.map(|c| c.to_ascii_lowercase()));
    Ok(canonical)
}

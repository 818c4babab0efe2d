//! Input validation for names that end up on disk or in response headers.

/// Longest file name accepted for downloads and exports
pub const MAX_FILENAME_LENGTH: usize = 255;

/// Longest identifier accepted from a locator or request path
pub const MAX_IDENTIFIER_LENGTH: usize = 512;

/// Validation error types
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Filename too long: exceeds {MAX_FILENAME_LENGTH} characters")]
    FilenameTooLong,
    #[error("Invalid filename: contains path traversal or invalid characters")]
    InvalidFilename,
    #[error("Empty filename provided")]
    EmptyFilename,
    #[error("Identifier too long: exceeds {MAX_IDENTIFIER_LENGTH} characters")]
    IdentifierTooLong,
}

/// Validate and sanitize a file name before it is written or offered as a
/// download.
///
/// - Checks length limits
/// - Rejects directory traversal (`../`, `..\`) and control characters
/// - Keeps only ASCII alphanumerics, `.`, `-`, `_` and spaces
/// - Rejects hidden files unless they carry a known extension
///
/// # Errors
///
/// Returns `ValidationError::EmptyFilename` if the filename is empty,
/// `ValidationError::FilenameTooLong` if it exceeds the limit, or
/// `ValidationError::InvalidFilename` if it contains invalid characters.
///
/// # Examples
///
/// ```
/// use geo_catalog::utils::validation::validate_filename;
///
/// assert_eq!(
///     validate_filename("blm_roads_schema_arcpy.py").unwrap(),
///     "blm_roads_schema_arcpy.py"
/// );
/// assert!(validate_filename("../etc/passwd").is_err());
/// ```
pub fn validate_filename(filename: &str) -> Result<String, ValidationError> {
    if filename.trim().is_empty() {
        return Err(ValidationError::EmptyFilename);
    }

    if filename.len() > MAX_FILENAME_LENGTH {
        return Err(ValidationError::FilenameTooLong);
    }

    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        return Err(ValidationError::InvalidFilename);
    }

    if filename.chars().any(char::is_control) {
        return Err(ValidationError::InvalidFilename);
    }

    let sanitized = filename
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ' '))
        .collect::<String>();

    if sanitized.trim().is_empty() {
        return Err(ValidationError::InvalidFilename);
    }

    if sanitized.starts_with('.') && !has_known_extension(&sanitized) {
        return Err(ValidationError::InvalidFilename);
    }

    Ok(sanitized)
}

/// Check an identifier taken from a URL before looking it up.
///
/// Identifiers are opaque, so only the length is bounded.
///
/// # Errors
///
/// Returns `ValidationError::IdentifierTooLong` above [`MAX_IDENTIFIER_LENGTH`].
pub fn validate_identifier(id: &str) -> Result<&str, ValidationError> {
    if id.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ValidationError::IdentifierTooLong);
    }
    Ok(id)
}

fn has_known_extension(filename: &str) -> bool {
    let safe_extensions = [".py", ".json", ".txt", ".tsv", ".csv"];
    let lower = filename.to_lowercase();
    safe_extensions.iter().any(|ext| lower.ends_with(ext))
}

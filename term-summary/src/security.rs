//! Input hardening for uploaded file names and generated SQL.

use crate::error::{Result, SummaryError};
use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum length of a stored upload name, in bytes.
pub const MAX_UPLOAD_NAME_LENGTH: usize = 255;

/// SQL identifier escaping for generated queries.
pub struct SqlSecurity;

impl SqlSecurity {
    /// Quotes an identifier for use in a DataFusion query.
    ///
    /// Column names come straight from CSV headers, so any text is accepted:
    /// the name is wrapped in double quotes and inner quotes are doubled.
    ///
    /// # Examples
    /// ```rust
    /// use term_summary::security::SqlSecurity;
    ///
    /// assert_eq!(SqlSecurity::quote_identifier("score"), "\"score\"");
    /// assert_eq!(SqlSecurity::quote_identifier("a\"b"), "\"a\"\"b\"");
    /// ```
    pub fn quote_identifier(identifier: &str) -> String {
        let escaped = identifier.replace('"', "\"\"");
        format!("\"{escaped}\"")
    }
}

/// Reduces an uploaded file name to a safe, flat name.
///
/// Non-ASCII characters are dropped, path separators become spaces, runs of
/// whitespace collapse to `_`, every character outside `[A-Za-z0-9_.-]` is
/// removed, and leading or trailing `.` and `_` are trimmed. The result may be
/// empty.
///
/// # Examples
/// ```rust
/// use term_summary::security::sanitize_file_name;
///
/// assert_eq!(sanitize_file_name("My cool movie.mov"), "My_cool_movie.mov");
/// assert_eq!(sanitize_file_name("../../../etc/passwd"), "etc_passwd");
/// ```
pub fn sanitize_file_name(name: &str) -> String {
    static DISALLOWED: Lazy<Regex> = Lazy::new(|| {
        // This regex is compile-time constant and known to be valid
        #[allow(clippy::expect_used)]
        Regex::new(r"[^A-Za-z0-9_.-]").expect("Hard-coded regex pattern should be valid")
    });

    let ascii: String = name
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let stripped = DISALLOWED.replace_all(&joined, "");

    stripped.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Sanitizes an upload name and rejects names that cannot be stored.
pub fn validate_upload_name(name: &str) -> Result<String> {
    if name.contains('\0') {
        return Err(SummaryError::Security(
            "Upload name cannot contain null bytes".to_string(),
        ));
    }

    let sanitized = sanitize_file_name(name);
    if sanitized.is_empty() {
        return Err(SummaryError::Security(format!(
            "Upload name '{name}' has no usable characters"
        )));
    }
    if sanitized.len() > MAX_UPLOAD_NAME_LENGTH {
        return Err(SummaryError::Security(format!(
            "Upload name too long (max {MAX_UPLOAD_NAME_LENGTH} characters)"
        )));
    }

    Ok(sanitized)
}

//! Shape rules for text identifiers.

use crate::error::CoreError;

/// Maximum encoded length of a principal, in bytes.
pub const MAX_PRINCIPAL_LEN: usize = 128;

/// Maximum encoded length of a document id, in bytes.
pub const MAX_DOCUMENT_ID_LEN: usize = 128;

/// Validate a principal.
///
/// A principal must be:
/// - non-empty
/// - at most [`MAX_PRINCIPAL_LEN`] bytes
/// - free of whitespace and control characters
pub fn validate_principal(s: &str) -> Result<(), CoreError> {
    if s.is_empty() {
        return Err(CoreError::InvalidPrincipal("empty".into()));
    }
    if s.len() > MAX_PRINCIPAL_LEN {
        return Err(CoreError::InvalidPrincipal(format!(
            "{} bytes exceeds maximum of {}",
            s.len(),
            MAX_PRINCIPAL_LEN
        )));
    }
    if let Some(c) = s.chars().find(|c| c.is_whitespace() || c.is_control()) {
        return Err(CoreError::InvalidPrincipal(format!(
            "contains forbidden character {:?}",
            c
        )));
    }
    Ok(())
}

/// Validate a document id.
///
/// Document ids may contain spaces but no control characters.
pub fn validate_document_id(s: &str) -> Result<(), CoreError> {
    if s.is_empty() {
        return Err(CoreError::InvalidDocumentId("empty".into()));
    }
    if s.len() > MAX_DOCUMENT_ID_LEN {
        return Err(CoreError::InvalidDocumentId(format!(
            "{} bytes exceeds maximum of {}",
            s.len(),
            MAX_DOCUMENT_ID_LEN
        )));
    }
    if let Some(c) = s.chars().find(|c| c.is_control()) {
        return Err(CoreError::InvalidDocumentId(format!(
            "contains forbidden character {:?}",
            c
        )));
    }
    Ok(())
}

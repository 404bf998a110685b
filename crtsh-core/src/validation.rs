//! Query input checks

use crate::error::{CrtShError, Result};

/// Prepare a domain for use as a crt.sh query
///
/// This function:
/// - Trims surrounding whitespace
/// - Rejects empty input
/// - Rejects interior whitespace and control characters
///
/// Nothing else is checked. Wildcards, IDNs, bare TLDs and mixed case are
/// passed through so that crt.sh sees exactly what the caller asked for.
pub fn validate_query_domain(domain: &str) -> Result<String> {
    let domain = domain.trim();

    if domain.is_empty() {
        return Err(CrtShError::InvalidDomain(domain.to_string()));
    }

    if domain.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(CrtShError::InvalidDomain(domain.to_string()));
    }

    Ok(domain.to_string())
}

//! Shared input checks for route handlers and the store.

const MAX_ID_LEN: usize = 128;

/// Identifiers are used as sled key segments: 1-128 chars, no ':' or whitespace.
pub fn validate_identifier(value: &str) -> Result<(), &'static str> {
    if value.is_empty() || value.chars().count() > MAX_ID_LEN {
        return Err("identifier must be 1-128 characters");
    }
    if value.chars().any(|c| c == ':' || c.is_whitespace() || c.is_control()) {
        return Err("identifier must not contain ':' or whitespace");
    }
    Ok(())
}

/// Mastery percentages must be finite and within [0, 100].
pub fn validate_percentage(value: f64) -> Result<(), &'static str> {
    if !value.is_finite() {
        return Err("percentage must be a finite number");
    }
    if !(0.0..=100.0).contains(&value) {
        return Err("percentage must be between 0 and 100");
    }
    Ok(())
}

pub fn validate_tier_name(tier: &str) -> Result<(), &'static str> {
    let trimmed = tier.trim();
    if trimmed.is_empty() || trimmed.len() > 64 {
        return Err("tier must be 1-64 characters");
    }
    if trimmed.contains(':') {
        return Err("tier must not contain ':'");
    }
    Ok(())
}

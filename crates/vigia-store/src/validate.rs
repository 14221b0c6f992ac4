//! Field-format validation.
//!
//! Every check returns [`StoreError::Validation`] naming the offending field,
//! so the HTTP layer can surface field-level detail. Uniqueness and
//! foreign-key checks live in the store layer, not here — this module only
//! knows about shapes and ranges.

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::{Result, StoreError};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid")
});

/// Require a non-empty (after trim) value.
pub fn require(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StoreError::Validation {
            field,
            message: "é obrigatório".into(),
        });
    }
    Ok(())
}

/// Enforce a maximum character length.
pub fn max_len(field: &'static str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(StoreError::Validation {
            field,
            message: format!("deve ter no máximo {max} caracteres"),
        });
    }
    Ok(())
}

/// Enforce an inclusive character-length range.
pub fn len_range(field: &'static str, value: &str, min: usize, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(StoreError::Validation {
            field,
            message: format!("deve ter entre {min} e {max} caracteres"),
        });
    }
    Ok(())
}

/// Enforce an exact character length (license plates).
pub fn exact_len(field: &'static str, value: &str, len: usize) -> Result<()> {
    if value.chars().count() != len {
        return Err(StoreError::Validation {
            field,
            message: format!("deve ter exatamente {len} caracteres"),
        });
    }
    Ok(())
}

/// Enforce an inclusive integer range (permission levels).
pub fn int_range(field: &'static str, value: i64, min: i64, max: i64) -> Result<()> {
    if value < min || value > max {
        return Err(StoreError::Validation {
            field,
            message: format!("deve estar entre {min} e {max}"),
        });
    }
    Ok(())
}

/// Enforce a value in the closed unit interval [0, 1].
pub fn unit_interval(field: &'static str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) || value.is_nan() {
        return Err(StoreError::Validation {
            field,
            message: "deve estar entre 0 e 1".into(),
        });
    }
    Ok(())
}

/// Validate email shape.
pub fn email(field: &'static str, value: &str) -> Result<()> {
    if !EMAIL_RE.is_match(value) {
        return Err(StoreError::Validation {
            field,
            message: "deve ter formato válido".into(),
        });
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

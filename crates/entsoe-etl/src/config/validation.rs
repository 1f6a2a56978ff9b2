// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use std::fmt;

/// Validation result with field-level errors and warnings
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Issues that prevent the ETL from starting
    pub errors: Vec<ValidationIssue>,
    /// Issues that degrade the run (e.g. alerts only go to the log)
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn success() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationIssue {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationIssue {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// A field-level validation issue
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Field path (e.g., "email.smtp_port")
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_do_not_count_as_errors() {
        let mut result = ValidationResult::success();
        result.add_warning("email", "SMTP not configured");
        assert!(!result.has_errors());

        result.add_error("api.security_token", "required");
        assert!(result.has_errors());
        assert_eq!(result.errors[0].to_string(), "api.security_token: required");
    }
}

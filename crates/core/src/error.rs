use validator::ValidationErrors;

/// Domain-level error type shared across the workspace.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Operation input failed validation before submission.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A poll policy with out-of-range parameters.
    #[error("Invalid poll policy: {0}")]
    InvalidPolicy(String),
}

impl From<ValidationErrors> for CoreError {
    fn from(errors: ValidationErrors) -> Self {
        // Flatten field errors into a single display string; callers
        // surface this verbatim.
        let mut parts: Vec<String> = errors
            .field_errors()
            .iter()
            .map(|(field, errs)| {
                let msgs: Vec<String> = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                format!("{field}: {}", msgs.join(", "))
            })
            .collect();
        parts.sort();
        CoreError::Validation(parts.join("; "))
    }
}

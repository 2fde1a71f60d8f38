/// Errors raised when a generation request carries unusable parameters.
///
/// Malformed *content* (unknown symbols, unbalanced brackets, degenerate
/// segments) never produces an error; only the numeric configuration does.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    #[error("Invalid float value: {0}")]
    FloatNotFinite(String),

    #[error("Invalid input data: {0}")]
    InvalidParameter(String),
}

/// Rejects NaN and infinities, naming the offending field.
pub(crate) fn ensure_finite(name: &str, value: f32) -> Result<f32, TreeError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(TreeError::FloatNotFinite(format!("{name} = {value}")))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} must be in (0, 1], got {value}")]
    SmoothingOutOfRange { field: &'static str, value: f32 },
    #[error("font path must not be empty")]
    EmptyFontPath,
    #[error("baseline offset must be finite, got {0}")]
    InvalidOffset(f32),
}

/// Result alias that carries the custom [`RingVizError`] type.
pub type Result<T> = std::result::Result<T, RingVizError>;

/// Common error type for the core crate.
///
/// None of the signal-processing paths can fail; these variants cover the
/// lock discipline and the ambient concerns around it (configuration files,
/// snapshots).
#[derive(Debug, thiserror::Error)]
pub enum RingVizError {
    /// The shared visual state lock was poisoned by a panicking holder.
    #[error("{0} has been poisoned")]
    Poisoned(&'static str),
    /// A configuration value was rejected.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// Configuration could not be parsed.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// A canvas snapshot could not be encoded.
    #[error("failed to write snapshot: {0}")]
    Image(String),
    /// Free-form message surfaced by the application layer.
    #[error("{0}")]
    Message(String),
}

impl RingVizError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<image::ImageError> for RingVizError {
    fn from(value: image::ImageError) -> Self {
        Self::Image(value.to_string())
    }
}

use crate::render::ShaderStage;

/// Result alias that carries the custom [`TrigramVizError`] type.
pub type Result<T> = std::result::Result<T, TrigramVizError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum TrigramVizError {
    /// Free-form message for failures that do not warrant their own variant.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Configuration or report (de)serialisation failure.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A program stage failed to compile. The surface cannot render without it.
    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },
    #[error("shader program failed to link: {0}")]
    ShaderLink(String),
    /// The surface was closed after an unrecoverable GPU failure.
    #[error("visualisation surface is closed")]
    SurfaceClosed,
}

impl TrigramVizError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    /// Whether the error means the GPU pipeline could not be built.
    pub fn is_pipeline_failure(&self) -> bool {
        matches!(self, Self::ShaderCompile { .. } | Self::ShaderLink(_))
    }
}

impl From<&str> for TrigramVizError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for TrigramVizError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shader_errors_count_as_pipeline_failures() {
        let compile = TrigramVizError::ShaderCompile {
            stage: ShaderStage::Fragment,
            log: "0:1: syntax error".to_string(),
        };
        assert!(compile.is_pipeline_failure());
        assert!(format!("{compile}").contains("fragment"));
        assert!(TrigramVizError::ShaderLink("missing main".into()).is_pipeline_failure());
        assert!(!TrigramVizError::from("boom").is_pipeline_failure());
    }
}

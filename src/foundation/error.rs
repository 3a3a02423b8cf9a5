pub type LaminaResult<T> = Result<T, LaminaError>;

#[derive(thiserror::Error, Debug)]
pub enum LaminaError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("capacity exceeded: at most {max} layers")]
    CapacityExceeded { max: usize },

    #[error("empty composition: {0}")]
    EmptyComposition(String),

    #[error("segmentation failed: {0}")]
    Segmentation(String),

    #[error("invalid color sample: {0}")]
    InvalidColorSample(String),

    #[error("encode aborted: {0}")]
    EncodeAborted(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LaminaError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn empty_composition(msg: impl Into<String>) -> Self {
        Self::EmptyComposition(msg.into())
    }

    pub fn segmentation(msg: impl Into<String>) -> Self {
        Self::Segmentation(msg.into())
    }

    pub fn invalid_color_sample(msg: impl Into<String>) -> Self {
        Self::InvalidColorSample(msg.into())
    }

    pub fn encode_aborted(msg: impl Into<String>) -> Self {
        Self::EncodeAborted(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

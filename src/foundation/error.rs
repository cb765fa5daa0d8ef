/// Convenience result type used across stillreel.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Invalid user-provided request or configuration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Image or audio source unreachable or undecodable.
    #[error("asset load error: {0}")]
    AssetLoad(String),

    /// Audio graph construction failed (unsupported sample rate, channel layout, ...).
    #[error("mix setup error: {0}")]
    MixSetup(String),

    /// The host cannot produce the requested container.
    #[error("encoder unavailable: {0}")]
    EncoderUnavailable(String),

    /// The encoder failed after the session started streaming.
    #[error("encode error: {0}")]
    Encode(String),

    /// The session was aborted through its cancellation token.
    #[error("render cancelled")]
    Cancelled,

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse classification of a [`ReelError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReelErrorKind {
    /// See [`ReelError::Validation`].
    Validation,
    /// See [`ReelError::AssetLoad`].
    AssetLoad,
    /// See [`ReelError::MixSetup`].
    MixSetup,
    /// See [`ReelError::EncoderUnavailable`].
    EncoderUnavailable,
    /// See [`ReelError::Encode`].
    Encode,
    /// See [`ReelError::Cancelled`].
    Cancelled,
    /// See [`ReelError::Serde`].
    Serde,
    /// See [`ReelError::Other`].
    Other,
}

impl ReelError {
    /// Build a [`ReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::AssetLoad`] value.
    pub fn asset_load(msg: impl Into<String>) -> Self {
        Self::AssetLoad(msg.into())
    }

    /// Build a [`ReelError::MixSetup`] value.
    pub fn mix_setup(msg: impl Into<String>) -> Self {
        Self::MixSetup(msg.into())
    }

    /// Build a [`ReelError::EncoderUnavailable`] value.
    pub fn encoder_unavailable(msg: impl Into<String>) -> Self {
        Self::EncoderUnavailable(msg.into())
    }

    /// Build a [`ReelError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`ReelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ReelErrorKind {
        match self {
            Self::Validation(_) => ReelErrorKind::Validation,
            Self::AssetLoad(_) => ReelErrorKind::AssetLoad,
            Self::MixSetup(_) => ReelErrorKind::MixSetup,
            Self::EncoderUnavailable(_) => ReelErrorKind::EncoderUnavailable,
            Self::Encode(_) => ReelErrorKind::Encode,
            Self::Cancelled => ReelErrorKind::Cancelled,
            Self::Serde(_) => ReelErrorKind::Serde,
            Self::Other(_) => ReelErrorKind::Other,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

/// Convenience result type used across photostrip.
pub type PhotoStripResult<T> = Result<T, PhotoStripError>;

/// Top-level error taxonomy used by catalog, engine and session APIs.
///
/// Photo and overlay decode failures are deliberately absent: the composite engine absorbs them
/// and leaves the corresponding slot or layer blank.
#[derive(thiserror::Error, Debug)]
pub enum PhotoStripError {
    /// A layout id that is not present in the layout catalog.
    #[error("unknown layout: {0}")]
    UnknownLayout(String),

    /// A frame id that is not present in the frame catalog.
    #[error("unknown frame: {0}")]
    UnknownFrame(String),

    /// A session transition guard rejected the operation.
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// The output canvas could not be allocated or encoded.
    #[error("render error: {0}")]
    Render(String),

    /// Invalid configuration or asset reference.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PhotoStripError {
    /// Build a [`PhotoStripError::UnknownLayout`] value.
    pub fn unknown_layout(id: impl Into<String>) -> Self {
        Self::UnknownLayout(id.into())
    }

    /// Build a [`PhotoStripError::UnknownFrame`] value.
    pub fn unknown_frame(id: impl Into<String>) -> Self {
        Self::UnknownFrame(id.into())
    }

    /// Build a [`PhotoStripError::Precondition`] value.
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Build a [`PhotoStripError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`PhotoStripError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

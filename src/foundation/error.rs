/// Convenience result type used across gazemap.
pub type GazemapResult<T> = Result<T, GazemapError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Every variant is recoverable by the caller; nothing in the engine aborts
/// the process on bad input.
#[derive(thiserror::Error, Debug)]
pub enum GazemapError {
    /// Non-positive or non-finite bandwidth / grid spacing, or a bad config value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The surface is too small to hold a single grid cell at the requested spacing.
    #[error("empty grid: {width}x{height} surface has no cells at spacing {spacing}")]
    EmptyGrid {
        /// Surface width in pixels.
        width: u32,
        /// Surface height in pixels.
        height: u32,
        /// Requested grid spacing in pixels.
        spacing: f64,
    },

    /// No points have been recorded for the surface.
    #[error("no data for surface '{0}'")]
    NoData(String),

    /// No background raster is registered for the surface.
    #[error("missing background for surface '{0}'")]
    MissingBackground(String),

    /// Malformed point payload at the ingestion boundary.
    #[error("parse error: {0}")]
    Parse(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GazemapError {
    /// Build a [`GazemapError::InvalidParameter`] value.
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Build a [`GazemapError::NoData`] value.
    pub fn no_data(surface_id: impl Into<String>) -> Self {
        Self::NoData(surface_id.into())
    }

    /// Build a [`GazemapError::MissingBackground`] value.
    pub fn missing_background(surface_id: impl Into<String>) -> Self {
        Self::MissingBackground(surface_id.into())
    }

    /// Build a [`GazemapError::Parse`] value.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Stable response status for an HTTP-style collaborator.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidParameter(_) | Self::EmptyGrid { .. } | Self::Parse(_) => 400,
            Self::NoData(_) | Self::MissingBackground(_) => 404,
            Self::Other(_) => 500,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

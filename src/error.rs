//! Error types for top construction and configuration.

use thiserror::Error;

use crate::types::Float;

/// Errors raised while building or reconfiguring a top.
///
/// Every variant describes a misconfigured body. Once a top has been built,
/// `tick` runs without failing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TopError {
    /// Mass must be strictly positive.
    #[error("mass must be > 0, got {0}")]
    NonPositiveMass(Float),

    /// A geometric dimension (radius, scale, offset) is not usable.
    #[error("invalid dimension {name}: {value}")]
    InvalidDimension { name: &'static str, value: Float },

    /// The inertia tensor is not symmetric.
    #[error("inertia tensor is not symmetric")]
    NotSymmetric,

    /// The inertia tensor is not positive-definite.
    #[error("inertia tensor is not positive-definite")]
    NotPositiveDefinite,

    /// The inertia tensor cannot be inverted reliably.
    #[error("inertia tensor is singular (determinant {determinant:e})")]
    SingularInertia { determinant: Float },

    /// At least one integration sub-step per frame is required.
    #[error("sub-steps per frame must be >= 1")]
    ZeroSubSteps,

    /// Friction coefficients are non-negative.
    #[error("friction must be >= 0, got {0}")]
    NegativeFriction(Float),

    /// A fixed time step must be finite and positive.
    #[error("time step must be finite and > 0, got {0}")]
    InvalidTimeStep(Float),

    /// Shape parameters supplied as JSON could not be decoded.
    #[error("could not decode parameters: {0}")]
    Decode(String),
}

/// Result type for top construction.
pub type TopResult<T> = std::result::Result<T, TopError>;

impl From<serde_json::Error> for TopError {
    fn from(err: serde_json::Error) -> Self {
        TopError::Decode(err.to_string())
    }
}

/// Check that `value` is a finite, strictly positive length.
pub fn check_dimension(name: &'static str, value: Float) -> TopResult<Float> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(TopError::InvalidDimension { name, value })
    }
}

/// Check the parameters shared by every top.
pub fn check_common(mass: Float, friction: Float, sub_steps: usize) -> TopResult<()> {
    if !(mass.is_finite() && mass > 0.0) {
        return Err(TopError::NonPositiveMass(mass));
    }
    if !(friction.is_finite() && friction >= 0.0) {
        return Err(TopError::NegativeFriction(friction));
    }
    if sub_steps == 0 {
        return Err(TopError::ZeroSubSteps);
    }
    Ok(())
}

use na::{Matrix3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use crate::{
    error::{TopError, TopResult},
    types::Float,
    util::steiner,
};

/// Determinant below which an inertia tensor is treated as singular.
pub const INERTIA_DETERMINANT_EPSILON: Float = 1e-12;

/// Relative tolerance of the symmetry check on an assembled tensor.
const SYMMETRY_TOLERANCE: Float = 1e-9;

/// A point mass embedded in a body, located in body frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointMass {
    pub mass: Float,
    pub location: Vector3<Float>,
}

impl PointMass {
    pub fn new(mass: Float, location: Vector3<Float>) -> Self {
        PointMass { mass, location }
    }
}

/// Mass distribution of a top, expressed in its body frame.
///
/// The moment is taken about the body origin, which is also the point
/// gravity acts on. The tensor and its inverse are fixed at construction;
/// rotating a tensor preserves its determinant, so once validated here the
/// world-frame tensor is invertible at every orientation.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyInertia {
    mass: Float,
    moment: Matrix3<Float>,
    moment_inv: Matrix3<Float>,
}

impl BodyInertia {
    pub fn new(mass: Float, moment: Matrix3<Float>) -> TopResult<Self> {
        if !(mass.is_finite() && mass > 0.0) {
            return Err(TopError::NonPositiveMass(mass));
        }

        let scale = moment.abs().max().max(Float::MIN_POSITIVE);
        if (moment - moment.transpose()).abs().max() > SYMMETRY_TOLERANCE * scale {
            return Err(TopError::NotSymmetric);
        }
        if moment.cholesky().is_none() {
            return Err(TopError::NotPositiveDefinite);
        }

        let determinant = moment.determinant();
        if determinant.abs() < INERTIA_DETERMINANT_EPSILON {
            return Err(TopError::SingularInertia { determinant });
        }
        let moment_inv = moment
            .try_inverse()
            .ok_or(TopError::SingularInertia { determinant })?;

        Ok(BodyInertia {
            mass,
            moment,
            moment_inv,
        })
    }

    /// Combine a base mass element with a set of point masses.
    /// The total mass is the sum of all elements, the moment is the base
    /// moment plus a Steiner term for each point mass.
    pub fn with_point_masses(
        mass: Float,
        moment: Matrix3<Float>,
        points: &[PointMass],
    ) -> TopResult<Self> {
        let mut total_mass = mass;
        let mut total_moment = moment;
        for point in points {
            if !(point.mass.is_finite() && point.mass > 0.0) {
                return Err(TopError::NonPositiveMass(point.mass));
            }
            total_mass += point.mass;
            total_moment += steiner(point.mass, &point.location);
        }
        BodyInertia::new(total_mass, total_moment)
    }

    pub fn mass(&self) -> Float {
        self.mass
    }

    /// Moment of inertia about the body origin, in body frame
    pub fn moment(&self) -> &Matrix3<Float> {
        &self.moment
    }

    /// Transport the moment to world frame:
    ///     I_world = R * I_body * R^T
    pub fn world_moment(&self, rotation: &Rotation3<Float>) -> Matrix3<Float> {
        let R = rotation.matrix();
        R * self.moment * R.transpose()
    }

    /// Inverse of the world-frame moment:
    ///     I_world^-1 = R * I_body^-1 * R^T
    pub fn world_moment_inv(&self, rotation: &Rotation3<Float>) -> Matrix3<Float> {
        let R = rotation.matrix();
        R * self.moment_inv * R.transpose()
    }
}

/// Rotational kinetic energy 1/2 * ω^T * I * ω, with ω and I in the same frame
pub fn rotational_energy(moment: &Matrix3<Float>, angular_velocity: &Vector3<Float>) -> Float {
    0.5 * angular_velocity.dot(&(moment * angular_velocity))
}

use na::{Matrix3, Vector3};
use web_sys::{self};

use crate::types::Float;

/// Outer product a ⊗ b, i.e. the matrix with entries a_i * b_j
pub fn dyad(a: &Vector3<Float>, b: &Vector3<Float>) -> Matrix3<Float> {
    a * b.transpose()
}

/// Parallel-axis (Steiner) contribution of a point mass m located at r,
/// measured about the origin:
///     m * (|r|² Id - r ⊗ r)
pub fn steiner(mass: Float, r: &Vector3<Float>) -> Matrix3<Float> {
    (Matrix3::identity() * r.dot(r) - dyad(r, r)) * mass
}

/// Solid ellipsoid of uniform density with semi-axes (a, b, c) along the
/// body x, y, z axes, about its own center.
pub fn ellipsoid_moment(mass: Float, radii: &Vector3<Float>) -> Matrix3<Float> {
    let (a2, b2, c2) = (radii.x * radii.x, radii.y * radii.y, radii.z * radii.z);
    Matrix3::from_diagonal(&Vector3::new(b2 + c2, a2 + c2, a2 + b2)) * (mass / 5.0)
}

/// Solid sphere of uniform density about its own center.
pub fn sphere_moment(mass: Float, radius: Float) -> Matrix3<Float> {
    Matrix3::identity() * (2.0 / 5.0 * mass * radius * radius)
}

// Helper function to log to the browser console
pub fn console_log(message: &str) {
    web_sys::console::log_1(&message.into());
}

#[macro_export]
macro_rules! assert_close {
    ($left:expr, $right:expr, $tolerance:expr) => {
        let left = $left;
        let right = $right;
        let tol = $tolerance;
        let diff = (left - right).abs();
        if diff > tol {
            panic!(
                "assertion failed: {} ~= {} \
                (tolerance: {}, difference: {})",
                left, right, tol, diff
            );
        }
    };
}

#[macro_export]
macro_rules! assert_vec_close {
    ($left:expr, $right:expr, $tolerance:expr) => {
        let left = $left;
        let right = $right;
        let tol = $tolerance;
        for (a, b) in left.iter().zip(right.iter()) {
            $crate::assert_close!(a, b, tol);
        }
    };
}

#[cfg(test)]
pub mod test_utils {
    use na::{vector, UnitQuaternion, Vector3};
    use rand::Rng;

    use crate::{types::Float, PI};

    /// Build a Vector3 where each element is random between (-range, range)
    pub fn random_vector<R: Rng>(rng: &mut R, range: Float) -> Vector3<Float> {
        vector![
            rng.random_range(-range..range),
            rng.random_range(-range..range),
            rng.random_range(-range..range)
        ]
    }

    /// Build a rotation from a random axis and a random angle in (-π, π)
    pub fn random_rotation<R: Rng>(rng: &mut R) -> UnitQuaternion<Float> {
        loop {
            let axis = random_vector(rng, 1.0);
            if axis.norm() > 1e-3 {
                let angle = rng.random_range(-PI..PI);
                return UnitQuaternion::from_scaled_axis(axis.normalize() * angle);
            }
        }
    }
}

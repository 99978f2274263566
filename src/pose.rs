use na::{Isometry3, Matrix4, Rotation3, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::types::Float;

/// Angular speeds below this are treated as no rotation at all.
pub const MIN_ROTATION_SPEED: Float = 1e-12;

/// World transform of a top: origin position and orientation.
#[derive(Clone, Debug, PartialEq, Copy, Serialize, Deserialize)]
pub struct Pose {
    pub rotation: UnitQuaternion<Float>,
    pub translation: Vector3<Float>,
}

impl Pose {
    pub fn new(rotation: UnitQuaternion<Float>, translation: Vector3<Float>) -> Self {
        Pose {
            rotation,
            translation,
        }
    }

    pub fn identity() -> Self {
        Pose {
            rotation: UnitQuaternion::identity(),
            translation: Vector3::zeros(),
        }
    }

    pub fn to_matrix(&self) -> Matrix4<Float> {
        self.to_isometry().to_homogeneous()
    }

    pub fn to_isometry(&self) -> Isometry3<Float> {
        let translation = Translation3::from(self.translation);
        Isometry3::from_parts(translation, self.rotation)
    }

    /// Linear part of the transform, translation stripped
    pub fn rotation_matrix(&self) -> Rotation3<Float> {
        self.rotation.to_rotation_matrix()
    }

    /// Rotate about the world-frame axis of `angular_velocity` by
    /// |angular_velocity| * dt, i.e. q <- exp(ω dt) * q.
    /// The orientation is renormalized afterwards so that round-off does not
    /// accumulate in the contact resolution.
    pub fn rotate_world(&mut self, angular_velocity: &Vector3<Float>, dt: Float) {
        if angular_velocity.norm() < MIN_ROTATION_SPEED {
            return;
        }
        let delta = UnitQuaternion::from_scaled_axis(angular_velocity * dt);
        let mut rotation = delta * self.rotation;
        rotation.renormalize();
        self.rotation = rotation;
    }
}

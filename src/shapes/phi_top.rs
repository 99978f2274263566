use na::{vector, Rotation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::{
    contact::phi_top_contact,
    error::{check_dimension, TopResult},
    inertia::BodyInertia,
    shapes::{spin_damping, BodySettings, InitialState, TopModel, TorqueContext},
    types::Float,
    util::ellipsoid_moment,
    PHI, PI,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhiTopParams {
    /// Short radius; the long radius is scale * φ
    pub scale: Float,
    pub mass: Float,
    pub friction: Float,
    pub friction_scale: Float,
    pub sub_steps: usize,
    pub custom_torque: bool,
    /// Spin about the world vertical after a reset, rad/s
    pub initial_spin: Float,
}

impl Default for PhiTopParams {
    fn default() -> Self {
        PhiTopParams {
            scale: 0.16848,
            mass: 0.25,
            friction: 0.6,
            friction_scale: 1.0,
            sub_steps: 100,
            custom_torque: true,
            initial_spin: 8.0 * PI,
        }
    }
}

/// Tri-axial ellipsoid of uniform density with radii (r, r*φ, r).
#[derive(Debug, Clone, PartialEq)]
pub struct PhiTop {
    pub params: PhiTopParams,
    pub(crate) body: BodySettings,
    radii: Vector3<Float>,
}

impl PhiTop {
    pub fn new(params: PhiTopParams) -> TopResult<Self> {
        let body = BodySettings {
            friction: params.friction,
            friction_scale: params.friction_scale,
            sub_steps: params.sub_steps,
            custom_torque: params.custom_torque,
        };
        body.validate(params.mass)?;
        let r = check_dimension("scale", params.scale)?;

        Ok(PhiTop {
            params,
            body,
            radii: vector![r, r * PHI, r],
        })
    }

    pub fn radii(&self) -> &Vector3<Float> {
        &self.radii
    }
}

impl TopModel for PhiTop {
    fn body_inertia(&self) -> TopResult<BodyInertia> {
        BodyInertia::new(
            self.params.mass,
            ellipsoid_moment(self.params.mass, &self.radii),
        )
    }

    fn contact_point(&self, rotation: &Rotation3<Float>) -> Vector3<Float> {
        phi_top_contact(&self.radii, rotation)
    }

    fn custom_torque(&self, ctx: &TorqueContext) -> Vector3<Float> {
        spin_damping(ctx)
    }

    /// Lying on its side (long axis horizontal), slightly perturbed
    fn initial_state(&self) -> InitialState {
        InitialState {
            orientation: UnitQuaternion::from_euler_angles(0.1, 0.1, PI / 2.0),
            angular_velocity: vector![0.0, self.params.initial_spin, 0.0],
        }
    }

    fn settings(&self) -> &BodySettings {
        &self.body
    }
}

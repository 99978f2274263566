use na::{vector, Matrix3, Rotation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::{
    contact::rattleback_contact,
    error::{check_dimension, TopError, TopResult},
    inertia::{BodyInertia, PointMass},
    shapes::{spin_damping, BodySettings, InitialState, TopModel, TorqueContext},
    types::Float,
    util::steiner,
    GRAVITY,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RattlebackParams {
    /// The ellipsoid radii are (4, 0.5, 1) * scale
    pub scale: Float,
    /// Mass of the ellipsoid shell
    pub mass: Float,
    /// Point masses embedded in the body, positions in body frame
    pub point_masses: Vec<PointMass>,
    pub friction: Float,
    pub friction_scale: Float,
    pub sub_steps: usize,
    pub custom_torque: bool,
    pub initial_spin: Float,
}

impl Default for RattlebackParams {
    fn default() -> Self {
        let scale = 0.16848;
        let (rx, rz) = (4.0 * scale, scale);
        RattlebackParams {
            scale,
            mass: 0.25,
            // on one diagonal only, which skews the principal axes
            point_masses: vec![
                PointMass::new(0.15, vector![rx / 2.0, 0.0, rz / 2.0]),
                PointMass::new(0.15, vector![-rx / 2.0, 0.0, -rz / 2.0]),
            ],
            friction: 10.0,
            friction_scale: 1.0,
            sub_steps: 1000,
            custom_torque: true,
            initial_spin: 1.0,
        }
    }
}

/// Lower half of an elongated ellipsoid with a flat top, weighted by point
/// masses placed off its symmetry planes.
#[derive(Debug, Clone, PartialEq)]
pub struct Rattleback {
    pub params: RattlebackParams,
    pub(crate) body: BodySettings,
    radii: Vector3<Float>,
    center: Vector3<Float>,
}

impl Rattleback {
    pub fn new(params: RattlebackParams) -> TopResult<Self> {
        let body = BodySettings {
            friction: params.friction,
            friction_scale: params.friction_scale,
            sub_steps: params.sub_steps,
            custom_torque: params.custom_torque,
        };
        body.validate(params.mass)?;
        let s = check_dimension("scale", params.scale)?;
        for point in &params.point_masses {
            if !(point.mass.is_finite() && point.mass > 0.0) {
                return Err(TopError::NonPositiveMass(point.mass));
            }
        }

        let radii = vector![4.0 * s, 0.5 * s, s];
        Ok(Rattleback {
            params,
            body,
            radii,
            center: vector![0.0, -radii.y / 3.0, 0.0],
        })
    }

    pub fn radii(&self) -> &Vector3<Float> {
        &self.radii
    }

    /// Ellipsoid center in body frame
    pub fn center(&self) -> &Vector3<Float> {
        &self.center
    }

    /// Moment of the point-mass weights about the contact point
    pub fn point_mass_torque(
        &self,
        rotation: &Rotation3<Float>,
        contact: &Vector3<Float>,
    ) -> Vector3<Float> {
        self.params
            .point_masses
            .iter()
            .map(|point| {
                let weight = Vector3::y() * (-GRAVITY * point.mass);
                weight.cross(&(contact - rotation * point.location))
            })
            .sum()
    }
}

impl TopModel for Rattleback {
    /// Shell term shifted to the origin plus a Steiner term per point mass.
    /// The shell term is 3m/2 * diag(b² + c², a² + c², a² + b²).
    fn body_inertia(&self) -> TopResult<BodyInertia> {
        let m = self.params.mass;
        let r2 = self.radii.component_mul(&self.radii);
        let shell = Matrix3::from_diagonal(&vector![r2.y + r2.z, r2.x + r2.z, r2.x + r2.y]);
        let moment = shell * (1.5 * m) + steiner(m, &self.center);
        BodyInertia::with_point_masses(m, moment, &self.params.point_masses)
    }

    fn contact_point(&self, rotation: &Rotation3<Float>) -> Vector3<Float> {
        rattleback_contact(&self.radii, &self.center, rotation)
    }

    fn custom_torque(&self, ctx: &TorqueContext) -> Vector3<Float> {
        self.point_mass_torque(&ctx.rotation, &ctx.contact) + spin_damping(ctx)
    }

    /// Flat side up, rolled slightly about z, turning slowly
    fn initial_state(&self) -> InitialState {
        InitialState {
            orientation: UnitQuaternion::from_euler_angles(0.0, 0.0, 0.1),
            angular_velocity: vector![0.0, self.params.initial_spin, 0.0],
        }
    }

    fn settings(&self) -> &BodySettings {
        &self.body
    }
}

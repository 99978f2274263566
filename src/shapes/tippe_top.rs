use na::{vector, Rotation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::{
    contact::TippeGeometry,
    error::{check_dimension, TopError, TopResult},
    inertia::BodyInertia,
    shapes::{BodySettings, InitialState, TopModel, TorqueContext},
    types::Float,
    util::{sphere_moment, steiner},
    PI,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TippeTopParams {
    /// Radius of the main sphere
    pub r1: Float,
    /// Radius of the peg sphere
    pub r2: Float,
    /// Distance from the center of mass to the main sphere center, along
    /// the symmetry axis towards the peg
    pub com_offset: Float,
    /// Mass of the main sphere
    pub mass: Float,
    /// Mass of the peg sphere
    pub peg_mass: Float,
    pub friction: Float,
    pub friction_scale: Float,
    pub sub_steps: usize,
    pub custom_torque: bool,
    pub initial_spin: Float,
}

impl Default for TippeTopParams {
    fn default() -> Self {
        TippeTopParams {
            r1: 0.25,
            r2: 0.1,
            com_offset: 0.05,
            mass: 0.25,
            peg_mass: 0.002,
            friction: 0.6,
            friction_scale: 1.0,
            sub_steps: 100,
            custom_torque: false,
            initial_spin: 20.0 * PI,
        }
    }
}

/// Sphere fused with a small peg sphere on its symmetry axis.
#[derive(Debug, Clone, PartialEq)]
pub struct TippeTop {
    pub params: TippeTopParams,
    pub(crate) body: BodySettings,
    geometry: TippeGeometry,
}

impl TippeTop {
    pub fn new(params: TippeTopParams) -> TopResult<Self> {
        let body = BodySettings {
            friction: params.friction,
            friction_scale: params.friction_scale,
            sub_steps: params.sub_steps,
            custom_torque: params.custom_torque,
        };
        body.validate(params.mass)?;
        if !(params.peg_mass.is_finite() && params.peg_mass > 0.0) {
            return Err(TopError::NonPositiveMass(params.peg_mass));
        }
        let r1 = check_dimension("r1", params.r1)?;
        let r2 = check_dimension("r2", params.r2)?;
        if r2 >= r1 {
            return Err(TopError::InvalidDimension {
                name: "r2",
                value: r2,
            });
        }
        let c = params.com_offset;
        if !(c.is_finite() && c >= 0.0 && c < r1) {
            return Err(TopError::InvalidDimension {
                name: "com_offset",
                value: c,
            });
        }

        Ok(TippeTop {
            params,
            body,
            geometry: TippeGeometry { r1, r2, c },
        })
    }

    pub fn geometry(&self) -> &TippeGeometry {
        &self.geometry
    }
}

impl TopModel for TippeTop {
    /// Main sphere and peg sphere, each shifted to the origin with a
    /// Steiner term
    fn body_inertia(&self) -> TopResult<BodyInertia> {
        let TippeGeometry { r1, r2, c } = self.geometry;
        let m = self.params.mass;
        let m_peg = self.params.peg_mass;

        let main = sphere_moment(m, r1) + steiner(m, &vector![0.0, c, 0.0]);
        let peg = sphere_moment(m_peg, r2) + steiner(m_peg, &vector![0.0, r1 + c, 0.0]);
        BodyInertia::new(m + m_peg, main + peg)
    }

    fn contact_point(&self, rotation: &Rotation3<Float>) -> Vector3<Float> {
        self.geometry.contact(rotation)
    }

    fn custom_torque(&self, _ctx: &TorqueContext) -> Vector3<Float> {
        Vector3::zeros()
    }

    /// On the ball with the peg up, tipped 0.1 rad off vertical
    fn initial_state(&self) -> InitialState {
        InitialState {
            orientation: UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 0.1),
            angular_velocity: vector![0.0, self.params.initial_spin, 0.0],
        }
    }

    fn settings(&self) -> &BodySettings {
        &self.body
    }
}

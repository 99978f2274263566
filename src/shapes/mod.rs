use na::{Matrix3, Rotation3, UnitQuaternion, Vector3};
use phi_top::PhiTop;
use rattleback::Rattleback;
use tippe_top::TippeTop;

use crate::{
    error::{check_common, TopResult},
    inertia::BodyInertia,
    types::Float,
};

pub mod phi_top;
pub mod rattleback;
pub mod tippe_top;

/// Friction forces weaker than this engage the spin damping torque.
pub const LOW_FRICTION_FORCE: Float = 0.05;

/// Tuning shared by every top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySettings {
    /// Kinetic friction coefficient, force per unit slip velocity
    pub friction: Float,
    /// Per-body multiplier applied on top of `friction`
    pub friction_scale: Float,
    /// Integration sub-steps per rendered frame
    pub sub_steps: usize,
    /// Whether the shape's custom torque is added to the contact torque
    pub custom_torque: bool,
}

impl BodySettings {
    pub fn friction_coefficient(&self) -> Float {
        self.friction * self.friction_scale
    }

    pub fn validate(&self, mass: Float) -> TopResult<()> {
        check_common(mass, self.friction_coefficient(), self.sub_steps)
    }
}

impl Default for BodySettings {
    fn default() -> Self {
        BodySettings {
            friction: 0.6,
            friction_scale: 1.0,
            sub_steps: 100,
            custom_torque: true,
        }
    }
}

/// Deterministic state a top returns to on reset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitialState {
    pub orientation: UnitQuaternion<Float>,
    pub angular_velocity: Vector3<Float>,
}

/// Everything a custom torque may depend on during one sub-step.
/// All vectors are world-frame.
#[derive(Debug, Clone, Copy)]
pub struct TorqueContext {
    pub dt: Float,
    pub friction: Vector3<Float>,
    pub gravity: Vector3<Float>,
    pub normal: Vector3<Float>,
    pub contact: Vector3<Float>,
    pub world_inertia: Matrix3<Float>,
    pub rotation: Rotation3<Float>,
    pub angular_velocity: Vector3<Float>,
}

/// Damp the spin while the contact barely slips, standing in for the axial
/// spin losses the point-contact friction model does not see.
pub fn spin_damping(ctx: &TorqueContext) -> Vector3<Float> {
    if ctx.friction.norm() < LOW_FRICTION_FORCE {
        -ctx.angular_velocity * ctx.dt
    } else {
        Vector3::zeros()
    }
}

/// Per-shape capabilities the integrator relies on.
pub trait TopModel {
    /// Mass distribution about the body origin, validated
    fn body_inertia(&self) -> TopResult<BodyInertia>;

    /// World-frame offset from the body origin of the point touching the
    /// ground, for the given world rotation
    fn contact_point(&self, rotation: &Rotation3<Float>) -> Vector3<Float>;

    /// Corrective torque added to the contact torque
    fn custom_torque(&self, ctx: &TorqueContext) -> Vector3<Float>;

    /// Orientation and spin the top starts from after a reset
    fn initial_state(&self) -> InitialState;

    fn settings(&self) -> &BodySettings;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopKind {
    PhiTop,
    TippeTop,
    Rattleback,
}

impl TopKind {
    pub fn name(&self) -> &'static str {
        match self {
            TopKind::PhiTop => "phi_top",
            TopKind::TippeTop => "tippe_top",
            TopKind::Rattleback => "rattleback",
        }
    }

    pub fn from_name(name: &str) -> Option<TopKind> {
        match name {
            "phi_top" => Some(TopKind::PhiTop),
            "tippe_top" => Some(TopKind::TippeTop),
            "rattleback" => Some(TopKind::Rattleback),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TopShape {
    PhiTop(PhiTop),
    TippeTop(TippeTop),
    Rattleback(Rattleback),
}

impl TopShape {
    pub fn kind(&self) -> TopKind {
        match self {
            TopShape::PhiTop(_) => TopKind::PhiTop,
            TopShape::TippeTop(_) => TopKind::TippeTop,
            TopShape::Rattleback(_) => TopKind::Rattleback,
        }
    }

    /// Build a shape from JSON-encoded parameters. Missing fields take the
    /// shape's defaults.
    pub fn from_json(kind: TopKind, json: &str) -> TopResult<TopShape> {
        let shape = match kind {
            TopKind::PhiTop => TopShape::PhiTop(PhiTop::new(serde_json::from_str(json)?)?),
            TopKind::TippeTop => TopShape::TippeTop(TippeTop::new(serde_json::from_str(json)?)?),
            TopKind::Rattleback => {
                TopShape::Rattleback(Rattleback::new(serde_json::from_str(json)?)?)
            }
        };
        Ok(shape)
    }

    fn model(&self) -> &dyn TopModel {
        match self {
            TopShape::PhiTop(top) => top,
            TopShape::TippeTop(top) => top,
            TopShape::Rattleback(top) => top,
        }
    }

    pub(crate) fn settings_mut(&mut self) -> &mut BodySettings {
        match self {
            TopShape::PhiTop(top) => &mut top.body,
            TopShape::TippeTop(top) => &mut top.body,
            TopShape::Rattleback(top) => &mut top.body,
        }
    }
}

impl TopModel for TopShape {
    fn body_inertia(&self) -> TopResult<BodyInertia> {
        self.model().body_inertia()
    }

    fn contact_point(&self, rotation: &Rotation3<Float>) -> Vector3<Float> {
        self.model().contact_point(rotation)
    }

    fn custom_torque(&self, ctx: &TorqueContext) -> Vector3<Float> {
        self.model().custom_torque(ctx)
    }

    fn initial_state(&self) -> InitialState {
        self.model().initial_state()
    }

    fn settings(&self) -> &BodySettings {
        self.model().settings()
    }
}

impl From<PhiTop> for TopShape {
    fn from(top: PhiTop) -> Self {
        TopShape::PhiTop(top)
    }
}

impl From<TippeTop> for TopShape {
    fn from(top: TippeTop) -> Self {
        TopShape::TippeTop(top)
    }
}

impl From<Rattleback> for TopShape {
    fn from(top: Rattleback) -> Self {
        TopShape::Rattleback(top)
    }
}

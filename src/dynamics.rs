use na::{Matrix3, Vector3};

use crate::{
    contact::up,
    inertia::BodyInertia,
    pose::Pose,
    shapes::{TopModel, TorqueContext},
    types::Float,
    GRAVITY,
};

/// Kinematic state of a top, all vectors in world frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub pose: Pose,
    pub velocity: Vector3<Float>,
    pub angular_velocity: Vector3<Float>,
}

impl BodyState {
    pub fn at_rest(pose: Pose) -> Self {
        BodyState {
            pose,
            velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
        }
    }

    /// Velocity of the material point currently at the contact offset p:
    ///     v + ω × p
    pub fn point_velocity(&self, contact: &Vector3<Float>) -> Vector3<Float> {
        self.velocity + self.angular_velocity.cross(contact)
    }

    pub fn is_finite(&self) -> bool {
        self.pose
            .translation
            .iter()
            .chain(self.pose.rotation.coords.iter())
            .chain(self.velocity.iter())
            .chain(self.angular_velocity.iter())
            .all(|x| x.is_finite())
    }
}

/// Forces acting on a top during one sub-step, and where the contact is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactForces {
    /// World-frame offset of the contact point from the body origin
    pub contact: Vector3<Float>,
    pub gravity: Vector3<Float>,
    pub friction: Vector3<Float>,
    pub normal: Vector3<Float>,
}

impl ContactForces {
    pub fn total(&self) -> Vector3<Float> {
        self.gravity + self.friction + self.normal
    }

    /// Moment of the ground reaction about the body origin:
    ///     τ = p × (Fn + Fr)
    pub fn contact_torque(&self) -> Vector3<Float> {
        self.contact.cross(&(self.normal + self.friction))
    }
}

/// Mass the ground feels when it pushes straight up at the contact offset p,
/// counting the rotation the push causes:
///     m_eff = 1 / (1/m + (p × y) · I_world^-1 (p × y))
/// Equals m when the contact is directly below the origin.
pub fn effective_mass(
    mass: Float,
    world_inertia_inv: &Matrix3<Float>,
    contact: &Vector3<Float>,
) -> Float {
    let arm = contact.cross(&up());
    1.0 / (1.0 / mass + arm.dot(&(world_inertia_inv * arm)))
}

/// Compute gravity, kinetic friction and the normal force for one sub-step.
///
/// Friction opposes the slip velocity of the contact point:
///     Fr = -μ (v + ω × p)
/// The normal force is vertical and back-solved so that, after one explicit
/// step of length dt, the contact point lands on the ground plane:
///     Fn.y = ((-p.y - y) / dt - v.y) * m_eff / dt - Fg.y - Fr.y
/// The height correction uses the effective mass at the contact. With the
/// plain mass, a contact far off the symmetry axis overshoots the ground
/// whenever m |p × y|² exceeds the moment of inertia, and the correction
/// diverges.
pub fn contact_forces(
    mass: Float,
    world_inertia_inv: &Matrix3<Float>,
    friction_coefficient: Float,
    state: &BodyState,
    contact: &Vector3<Float>,
    dt: Float,
) -> ContactForces {
    let gravity = -up() * (mass * GRAVITY);
    let friction = -state.point_velocity(contact) * friction_coefficient;

    let height = state.pose.translation.y;
    let target_velocity = (-contact.y - height) / dt;
    let m_eff = effective_mass(mass, world_inertia_inv, contact);
    let normal_y = (target_velocity - state.velocity.y) * m_eff / dt - gravity.y - friction.y;

    ContactForces {
        contact: *contact,
        gravity,
        friction,
        normal: up() * normal_y,
    }
}

/// Everything one explicit step needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Accelerations {
    pub linear: Vector3<Float>,
    pub angular: Vector3<Float>,
    /// Total torque about the body origin, custom torque included
    pub torque: Vector3<Float>,
    pub world_inertia: Matrix3<Float>,
    pub forces: ContactForces,
}

/// Euler's rigid-body equation in world frame:
///     α = I_world^-1 * (τ - ω × (I_world * ω))
pub fn angular_acceleration(
    world_inertia: &Matrix3<Float>,
    world_inertia_inv: &Matrix3<Float>,
    torque: &Vector3<Float>,
    angular_velocity: &Vector3<Float>,
) -> Vector3<Float> {
    let gyroscopic = angular_velocity.cross(&(world_inertia * angular_velocity));
    world_inertia_inv * (torque - gyroscopic)
}

/// Resolve the contact, accumulate forces and torques, and turn them into
/// linear and angular accelerations of the body.
pub fn accelerations<M: TopModel + ?Sized>(
    model: &M,
    inertia: &BodyInertia,
    state: &BodyState,
    dt: Float,
) -> Accelerations {
    let rotation = state.pose.rotation_matrix();
    let contact = model.contact_point(&rotation);
    let settings = model.settings();
    let world_inertia = inertia.world_moment(&rotation);
    let world_inertia_inv = inertia.world_moment_inv(&rotation);
    let forces = contact_forces(
        inertia.mass(),
        &world_inertia_inv,
        settings.friction_coefficient(),
        state,
        &contact,
        dt,
    );

    let mut torque = forces.contact_torque();
    if settings.custom_torque {
        torque += model.custom_torque(&TorqueContext {
            dt,
            friction: forces.friction,
            gravity: forces.gravity,
            normal: forces.normal,
            contact,
            world_inertia,
            rotation,
            angular_velocity: state.angular_velocity,
        });
    }

    Accelerations {
        linear: forces.total() / inertia.mass(),
        angular: angular_acceleration(
            &world_inertia,
            &world_inertia_inv,
            &torque,
            &state.angular_velocity,
        ),
        torque,
        world_inertia,
        forces,
    }
}

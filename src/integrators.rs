use crate::{dynamics::Accelerations, dynamics::BodyState, types::Float};

/// Semi-Implicit Euler integration step:
///     ω(k+1) = ω(k) + dt * α
///     v(k+1) = v(k) + dt * a
///     x(k+1) = x(k) + dt * v(k+1)
///     q(k+1) = exp(ω(k+1) dt) * q(k)
///
/// The orientation is rotated about the world-frame axis of the updated
/// angular velocity and renormalized. Near-zero angular velocity leaves the
/// orientation untouched.
pub fn semi_implicit_euler_step(state: &mut BodyState, accelerations: &Accelerations, dt: Float) {
    state.angular_velocity += accelerations.angular * dt;
    state.velocity += accelerations.linear * dt;

    state.pose.translation += state.velocity * dt;
    state.pose.rotate_world(&state.angular_velocity, dt);
}

/// Scalar type of the simulation.
///
/// Contact resolution and inertia transport run thousands of times per
/// rendered frame, so the state is kept in double precision; values crossing
/// into the browser are narrowed to `f32` at the interface.
pub type Float = f64;

use std::rc::Rc;

use na::{Rotation3, Vector3};
use tracing::{debug, info, warn};

use crate::{
    dynamics::{accelerations, Accelerations, BodyState},
    energy::Energies,
    error::{TopError, TopResult},
    inertia::BodyInertia,
    integrators::semi_implicit_euler_step,
    material::TopMaterial,
    pose::Pose,
    shapes::{TopKind, TopModel, TopShape},
    telemetry::{SimulationLog, SimulationSample},
    types::Float,
};

/// Frames a `FixedStepper` runs at most per host frame. Time beyond that is
/// dropped so a stalled host does not trigger a long catch-up burst.
pub const MAX_CATCH_UP_FRAMES: usize = 10;

/// A spinning top resting on the ground plane y = 0.
///
/// The host drives it once per rendered frame through `tick`. While
/// simulating, each frame is split into `sub_steps` explicit steps and one
/// telemetry sample is recorded at the end of the frame. While idle the top
/// only follows the ground: its height is set so the contact point touches
/// the plane.
#[derive(Debug, Clone)]
pub struct Top {
    shape: TopShape,
    inertia: BodyInertia,
    state: BodyState,
    time: Float,
    log: SimulationLog,
    simulating: bool,
    material: Rc<TopMaterial>,
}

impl Top {
    pub fn new(shape: impl Into<TopShape>) -> TopResult<Self> {
        Top::with_material(shape, Rc::new(TopMaterial::default()))
    }

    /// Build a top that renders with a material shared through a
    /// `MaterialLibrary`
    pub fn with_material(shape: impl Into<TopShape>, material: Rc<TopMaterial>) -> TopResult<Self> {
        let shape = shape.into();
        let inertia = shape.body_inertia()?;
        info!(
            shape = shape.kind().name(),
            mass = inertia.mass(),
            sub_steps = shape.settings().sub_steps,
            "created top"
        );

        let mut top = Top {
            shape,
            inertia,
            state: BodyState::at_rest(Pose::identity()),
            time: 0.0,
            log: SimulationLog::new(),
            simulating: false,
            material,
        };
        top.reset();
        Ok(top)
    }

    pub fn kind(&self) -> TopKind {
        self.shape.kind()
    }

    pub fn shape(&self) -> &TopShape {
        &self.shape
    }

    pub fn inertia(&self) -> &BodyInertia {
        &self.inertia
    }

    pub fn state(&self) -> &BodyState {
        &self.state
    }

    pub fn pose(&self) -> &Pose {
        &self.state.pose
    }

    /// Place the top, e.g. when the host scene graph moved it
    pub fn set_pose(&mut self, pose: Pose) {
        self.state.pose = pose;
    }

    /// Simulated time since the last reset
    pub fn time(&self) -> Float {
        self.time
    }

    pub fn is_simulating(&self) -> bool {
        self.simulating
    }

    pub fn material(&self) -> &Rc<TopMaterial> {
        &self.material
    }

    pub fn samples(&self) -> &SimulationLog {
        &self.log
    }

    /// Contact offset for an arbitrary world rotation
    pub fn contact_point(&self, rotation: &Rotation3<Float>) -> Vector3<Float> {
        self.shape.contact_point(rotation)
    }

    /// Contact offset at the current orientation
    pub fn current_contact(&self) -> Vector3<Float> {
        self.contact_point(&self.state.pose.rotation_matrix())
    }

    pub fn energies(&self) -> Energies {
        let rotation = self.state.pose.rotation_matrix();
        Energies::new(
            self.inertia.mass(),
            &self.state.velocity,
            &self.state.angular_velocity,
            &self.inertia.world_moment(&rotation),
            &self.shape.contact_point(&rotation),
        )
    }

    pub fn set_custom_torque(&mut self, enabled: bool) {
        self.shape.settings_mut().custom_torque = enabled;
    }

    pub fn set_friction(&mut self, friction: Float) -> TopResult<()> {
        let scale = self.shape.settings().friction_scale;
        if !(friction.is_finite() && friction * scale >= 0.0) {
            return Err(TopError::NegativeFriction(friction));
        }
        self.shape.settings_mut().friction = friction;
        Ok(())
    }

    /// Return to the shape's initial orientation and spin, at rest on the
    /// ground at the origin, with an empty log. The top is left idle.
    pub fn reset(&mut self) {
        let initial = self.shape.initial_state();
        let pose = Pose::new(initial.orientation, Vector3::zeros());
        let mut state = BodyState::at_rest(pose);
        state.angular_velocity = initial.angular_velocity;
        self.state = state;
        self.rest();

        self.time = 0.0;
        self.log.clear();
        self.simulating = false;
        debug!(shape = self.kind().name(), "reset top");
    }

    /// Advance by one host frame of `frame_dt` seconds.
    ///
    /// A frame whose state stops being finite is rolled back to its start
    /// without a sample, and the top is left idle.
    pub fn tick(&mut self, simulate: bool, frame_dt: Float) {
        if !(frame_dt.is_finite() && frame_dt >= 0.0) {
            warn!(frame_dt, "ignoring invalid frame time");
            return;
        }
        if simulate != self.simulating {
            debug!(
                shape = self.kind().name(),
                simulate,
                time = self.time,
                "simulation state changed"
            );
            self.simulating = simulate;
        }

        if !simulate {
            self.rest();
            return;
        }
        if frame_dt == 0.0 {
            return;
        }

        let sub_steps = self.shape.settings().sub_steps;
        let dt = frame_dt / sub_steps as Float;
        let (start_state, start_time) = (self.state, self.time);
        for i in 0..sub_steps {
            let accelerations = self.step(dt);
            if !self.state.is_finite() {
                warn!(
                    shape = self.kind().name(),
                    time = self.time,
                    sub_step = i,
                    "state diverged, frame rolled back and simulation stopped"
                );
                self.state = start_state;
                self.time = start_time;
                self.simulating = false;
                return;
            }
            if i == sub_steps - 1 {
                self.record(&accelerations);
            }
        }
    }

    /// One explicit sub-step of length dt. Returns the accelerations that
    /// were applied.
    pub fn step(&mut self, dt: Float) -> Accelerations {
        let accelerations = accelerations(&self.shape, &self.inertia, &self.state, dt);
        semi_implicit_euler_step(&mut self.state, &accelerations, dt);
        self.time += dt;
        accelerations
    }

    /// Set the height so the contact point touches the ground
    fn rest(&mut self) {
        let contact = self.current_contact();
        self.state.pose.translation.y = -contact.y;
    }

    fn record(&mut self, accelerations: &Accelerations) {
        let energies = Energies::new(
            self.inertia.mass(),
            &self.state.velocity,
            &self.state.angular_velocity,
            &accelerations.world_inertia,
            &accelerations.forces.contact,
        );
        self.log.push(SimulationSample::new(
            self.time,
            self.state.velocity,
            self.state.angular_velocity,
            accelerations.torque,
            &energies,
        ));
    }
}

/// Decouples the physics frame time from the host's render cadence.
///
/// Host frame times are accumulated and the top is ticked in whole frames
/// of a fixed length, so a run only depends on the total elapsed time and
/// not on how it was split into host frames.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedStepper {
    frame_dt: Float,
    accumulator: Float,
}

impl FixedStepper {
    pub fn new(frame_dt: Float) -> TopResult<Self> {
        if !(frame_dt.is_finite() && frame_dt > 0.0) {
            return Err(TopError::InvalidTimeStep(frame_dt));
        }
        Ok(FixedStepper {
            frame_dt,
            accumulator: 0.0,
        })
    }

    pub fn frame_dt(&self) -> Float {
        self.frame_dt
    }

    /// Time carried over to the next host frame
    pub fn pending(&self) -> Float {
        self.accumulator
    }

    /// Feed `elapsed` seconds of host time. Returns the number of fixed
    /// frames the top was ticked.
    pub fn advance(&mut self, top: &mut Top, simulate: bool, elapsed: Float) -> usize {
        if !(elapsed.is_finite() && elapsed >= 0.0) {
            warn!(elapsed, "ignoring invalid frame time");
            return 0;
        }
        if !simulate {
            self.accumulator = 0.0;
            top.tick(false, self.frame_dt);
            return 0;
        }

        self.accumulator += elapsed;
        let mut frames = 0;
        while self.accumulator >= self.frame_dt {
            if frames == MAX_CATCH_UP_FRAMES {
                debug!(dropped = self.accumulator, "dropping frame time");
                self.accumulator = 0.0;
                break;
            }
            top.tick(true, self.frame_dt);
            self.accumulator -= self.frame_dt;
            frames += 1;
        }
        frames
    }
}

/// Simulate the top for final_time seconds in frames of frame_dt.
/// Returns the pose at the start and after each frame; the frame samples are
/// appended to the top's log.
pub fn simulate(top: &mut Top, final_time: Float, frame_dt: Float) -> TopResult<Vec<Pose>> {
    if !(frame_dt.is_finite() && frame_dt > 0.0) {
        return Err(TopError::InvalidTimeStep(frame_dt));
    }
    if !(final_time.is_finite() && final_time >= 0.0) {
        return Err(TopError::InvalidTimeStep(final_time));
    }

    let num_frames = (final_time / frame_dt).round() as usize;
    let mut poses = Vec::with_capacity(num_frames + 1);
    poses.push(*top.pose());
    for _ in 0..num_frames {
        top.tick(true, frame_dt);
        poses.push(*top.pose());
    }
    Ok(poses)
}

#[cfg(test)]
mod simulate_tests {
    use na::{vector, UnitQuaternion};

    use super::*;
    use crate::{
        assert_close,
        contact::up,
        shapes::{
            phi_top::{PhiTop, PhiTopParams},
            rattleback::{Rattleback, RattlebackParams},
            tippe_top::{TippeTop, TippeTopParams},
        },
        PI,
    };

    fn phi_top(params: PhiTopParams) -> Top {
        Top::new(PhiTop::new(params).unwrap()).unwrap()
    }

    fn all_tops() -> Vec<Top> {
        vec![
            phi_top(PhiTopParams::default()),
            Top::new(TippeTop::new(TippeTopParams::default()).unwrap()).unwrap(),
            Top::new(Rattleback::new(RattlebackParams::default()).unwrap()).unwrap(),
        ]
    }

    /// Largest increase of the total energy from one sample to the next
    fn max_energy_increase(log: &SimulationLog) -> Float {
        log.samples()
            .windows(2)
            .map(|pair| pair[1].total_energy - pair[0].total_energy)
            .fold(Float::NEG_INFINITY, Float::max)
    }

    #[test]
    fn reset_is_idempotent() {
        for mut top in all_tops() {
            // Arrange
            for _ in 0..5 {
                top.tick(true, 1.0 / 60.0);
            }

            // Act
            top.reset();
            let first = (*top.state(), top.time(), top.samples().clone());
            top.reset();
            let second = (*top.state(), top.time(), top.samples().clone());

            // Assert
            assert_eq!(first, second);
            assert!(second.2.is_empty());
            assert_eq!(second.1, 0.0);
            assert!(!top.is_simulating());
        }
    }

    #[test]
    fn reset_rests_on_the_ground() {
        for top in all_tops() {
            let initial = top.shape().initial_state();

            assert_eq!(top.pose().rotation, initial.orientation);
            assert_eq!(top.state().angular_velocity, initial.angular_velocity);
            assert_eq!(top.state().velocity, Vector3::zeros());
            assert_close!(top.pose().translation.y + top.current_contact().y, 0.0, 1e-15);
        }
    }

    #[test]
    fn idle_tick_only_adjusts_height() {
        for mut top in all_tops() {
            // Arrange
            let rotation = UnitQuaternion::from_euler_angles(0.4, -0.2, 0.7);
            top.set_pose(Pose::new(rotation, vector![0.3, 2.0, -0.1]));
            let before = *top.state();

            // Act
            for _ in 0..10 {
                top.tick(false, 1.0 / 60.0);
            }

            // Assert
            let after = top.state();
            assert_eq!(after.pose.rotation, before.pose.rotation);
            assert_eq!(after.angular_velocity, before.angular_velocity);
            assert_eq!(after.velocity, before.velocity);
            assert_eq!(after.pose.translation.x, 0.3);
            assert_eq!(after.pose.translation.z, -0.1);
            assert_close!(after.pose.translation.y, -top.current_contact().y, 1e-15);
            assert!(top.samples().is_empty());
        }
    }

    #[test]
    fn one_sample_per_simulated_frame() {
        let mut top = phi_top(PhiTopParams {
            sub_steps: 10,
            ..Default::default()
        });

        for _ in 0..4 {
            top.tick(true, 0.02);
        }
        top.tick(false, 0.02);

        assert_eq!(top.samples().len(), 4);
        assert_close!(top.time(), 0.08, 1e-12);
        assert_close!(top.samples().last().unwrap().time, 0.08, 1e-12);
    }

    #[test]
    fn invalid_frame_time_is_ignored() {
        let mut top = phi_top(PhiTopParams::default());
        let before = *top.state();

        top.tick(true, Float::NAN);
        top.tick(true, -1.0);
        top.tick(true, Float::INFINITY);

        assert_eq!(*top.state(), before);
        assert!(top.samples().is_empty());
    }

    #[test]
    fn samples_match_state_after_frame() {
        let mut top = phi_top(PhiTopParams::default());

        top.tick(true, 1.0 / 60.0);

        let sample = top.samples().last().unwrap();
        assert_eq!(sample.velocity, top.state().velocity);
        assert_eq!(sample.angular_velocity, top.state().angular_velocity);
        assert_close!(
            sample.total_energy,
            sample.kinetic_energy + sample.rotational_energy + sample.potential_energy,
            1e-12
        );
    }

    #[test]
    fn friction_must_be_non_negative() {
        let mut top = phi_top(PhiTopParams::default());

        assert_eq!(top.set_friction(-0.1), Err(TopError::NegativeFriction(-0.1)));
        assert!(top.set_friction(0.0).is_ok());
        assert_eq!(top.shape().settings().friction, 0.0);
    }

    /// With friction and no custom torque the top can only lose energy, up
    /// to the drift of the explicit integration
    #[test]
    fn energy_decreases_under_friction() {
        // Arrange
        let mut top = phi_top(PhiTopParams {
            sub_steps: 50,
            custom_torque: false,
            ..Default::default()
        });
        let initial = top.energies().total();

        // Act
        simulate(&mut top, 500.0 / 60.0, 1.0 / 60.0).unwrap();

        // Assert
        let log = top.samples();
        assert_eq!(log.len(), 500);
        // the explicit steps gain at most a few 1e-4 J per frame
        let gain = max_energy_increase(log);
        assert!(gain <= 5e-4 * initial, "gain {} of {}", gain, initial);
        assert!(log.last().unwrap().total_energy < initial);
    }

    #[test]
    fn zero_friction_energy_drift_is_bounded() {
        // Arrange
        let mut top = phi_top(PhiTopParams {
            friction: 0.0,
            custom_torque: false,
            ..Default::default()
        });
        let initial = top.energies().total();

        // Act
        simulate(&mut top, 100.0 / 60.0, 1.0 / 60.0).unwrap();

        // Assert
        let last = top.samples().last().unwrap().total_energy;
        assert!(((last - initial) / initial).abs() < 0.05, "{} vs {}", last, initial);
    }

    /// A fast φ-top on its side tilts its spin axis away from the vertical
    /// within a second, by about 0.02 rad, losing energy every frame
    #[test]
    fn phi_top_spin_axis_tilts() {
        // Arrange
        let mut top = phi_top(PhiTopParams {
            scale: 0.16848,
            friction: 0.6,
            sub_steps: 100,
            initial_spin: 10.0 * PI,
            ..Default::default()
        });
        let initial = top.energies().total();

        // Act
        let poses = simulate(&mut top, 1.0, 1.0 / 60.0).unwrap();

        // Assert
        assert_eq!(poses.len(), 61);
        let w = top.state().angular_velocity;
        let tilt = w.normalize().dot(&up()).clamp(-1.0, 1.0).acos();
        assert!(tilt > 0.01 && tilt < 0.1, "tilt {}", tilt);

        let log = top.samples();
        assert!(max_energy_increase(log) < 0.0);
        assert!(log.last().unwrap().total_energy < initial);
    }

    /// Spun fast enough, a φ-top lying on its side rises onto its long axis
    #[test]
    fn phi_top_rises_onto_long_axis() {
        // Arrange
        let mut top = phi_top(PhiTopParams {
            initial_spin: 10.0 * PI,
            custom_torque: false,
            ..Default::default()
        });
        let lying = top.pose().rotation * Vector3::y();
        assert!(lying.y.abs() < 0.1);

        // Act
        simulate(&mut top, 6.0, 1.0 / 60.0).unwrap();

        // Assert
        let axis = top.pose().rotation * Vector3::y();
        assert!(axis.y.abs() > 0.9, "axis {:?}", axis);
        // the origin sits about r * φ above the ground
        let PhiTopParams { scale, .. } = PhiTopParams::default();
        assert!(top.pose().translation.y > 0.9 * scale * crate::PHI);
    }

    #[test]
    fn tippe_top_short_run_stays_on_ground() {
        let mut top = Top::new(TippeTop::new(TippeTopParams::default()).unwrap()).unwrap();

        let poses = simulate(&mut top, 1.0, 1.0 / 60.0).unwrap();

        for pose in poses {
            assert!(pose.translation.iter().all(|x| x.is_finite()));
            assert_close!(pose.rotation.norm(), 1.0, 1e-9);
            // between resting on the ball and resting on the peg
            assert!(pose.translation.y > 0.0 && pose.translation.y < 0.5);
        }
    }

    #[test]
    fn rattleback_short_run_is_finite() {
        let mut top =
            Top::new(Rattleback::new(RattlebackParams::default()).unwrap()).unwrap();

        simulate(&mut top, 0.25, 1.0 / 60.0).unwrap();

        let state = top.state();
        assert!(state.angular_velocity.iter().all(|x| x.is_finite()));
        assert!(state.velocity.iter().all(|x| x.is_finite()));
        assert_eq!(top.samples().len(), 15);
    }

    /// Spun fast on its ball, a tippe-top turns over onto its peg within a
    /// few seconds and keeps spinning the same way
    #[test]
    fn tippe_top_inverts() {
        // Arrange
        let mut top = Top::new(TippeTop::new(TippeTopParams::default()).unwrap()).unwrap();
        let axis = top.pose().rotation * Vector3::y();
        assert!(axis.y > 0.99);
        let initial = top.energies().total();

        // Act
        simulate(&mut top, 5.0, 1.0 / 60.0).unwrap();

        // Assert
        let axis = top.pose().rotation * Vector3::y();
        assert!(axis.y < -0.95, "axis {:?}", axis);
        assert!(top.state().angular_velocity.y > 0.0);
        assert!(top.energies().total() < initial);
        // standing on the peg puts the origin r2 + r1 + c above the ground
        assert_close!(top.pose().translation.y, 0.4, 0.01);
    }

    fn rattleback(initial_spin: Float) -> Top {
        let params = RattlebackParams {
            initial_spin,
            ..Default::default()
        };
        Top::new(Rattleback::new(params).unwrap()).unwrap()
    }

    /// Spun one way the rattleback rocks, stops and turns the other way
    #[test]
    fn rattleback_reverses_its_spin() {
        // Arrange
        let mut top = rattleback(1.0);

        // Act
        simulate(&mut top, 4.0, 1.0 / 60.0).unwrap();

        // Assert
        let spin = top.state().angular_velocity.y;
        assert!(spin < -0.3, "spin {}", spin);
        assert_eq!(top.samples().len(), 240);
        assert!(top.samples().samples().iter().all(|s| s.total_energy.is_finite()));
    }

    /// Spun the other way it keeps its sense of rotation
    #[test]
    fn rattleback_keeps_its_preferred_spin() {
        let mut top = rattleback(-1.0);

        simulate(&mut top, 4.0, 1.0 / 60.0).unwrap();

        let spin = top.state().angular_velocity.y;
        assert!(spin < -0.8, "spin {}", spin);
    }

    /// A frame that blows up is rolled back instead of logging NaN
    #[test]
    fn diverging_frame_is_rolled_back() {
        // Arrange
        let mut top = phi_top(PhiTopParams {
            friction: 1e9,
            sub_steps: 1000,
            ..Default::default()
        });
        let before = *top.state();

        // Act
        top.tick(true, 1.0 / 60.0);

        // Assert
        assert_eq!(*top.state(), before);
        assert_eq!(top.time(), 0.0);
        assert!(top.samples().is_empty());
        assert!(!top.is_simulating());
    }

    #[test]
    fn fixed_stepper_issues_whole_frames() {
        // Arrange
        let mut top = phi_top(PhiTopParams {
            sub_steps: 5,
            ..Default::default()
        });
        let mut stepper = FixedStepper::new(0.01).unwrap();

        // Act
        let first = stepper.advance(&mut top, true, 0.025);
        let second = stepper.advance(&mut top, true, 0.006);

        // Assert
        assert_eq!(first, 2);
        assert_eq!(second, 1);
        assert_eq!(top.samples().len(), 3);
        assert_close!(stepper.pending(), 0.001, 1e-12);
    }

    /// The same total host time gives the same state however it is split
    #[test]
    fn fixed_stepper_is_independent_of_host_cadence() {
        let params = PhiTopParams {
            sub_steps: 5,
            ..Default::default()
        };
        let mut a = phi_top(params);
        let mut b = phi_top(params);
        let mut stepper_a = FixedStepper::new(0.01).unwrap();
        let mut stepper_b = FixedStepper::new(0.01).unwrap();

        stepper_a.advance(&mut a, true, 0.035);
        for elapsed in [0.012, 0.012, 0.011] {
            stepper_b.advance(&mut b, true, elapsed);
        }

        assert_eq!(a.state(), b.state());
        assert_eq!(a.samples(), b.samples());
    }

    #[test]
    fn fixed_stepper_caps_catch_up() {
        let mut top = phi_top(PhiTopParams {
            sub_steps: 1,
            ..Default::default()
        });
        let mut stepper = FixedStepper::new(0.01).unwrap();

        let frames = stepper.advance(&mut top, true, 1.0);

        assert_eq!(frames, MAX_CATCH_UP_FRAMES);
        assert_eq!(stepper.pending(), 0.0);
    }

    #[test]
    fn rejects_invalid_time_steps() {
        assert_eq!(FixedStepper::new(0.0), Err(TopError::InvalidTimeStep(0.0)));
        let mut top = phi_top(PhiTopParams::default());
        assert!(simulate(&mut top, 1.0, -0.1).is_err());
    }
}

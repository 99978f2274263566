//! Append-only history of simulation samples, for external charting.

use na::Vector3;
use serde::Serialize;

use crate::{energy::Energies, error::TopResult, types::Float};

/// Snapshot of a top at the end of one simulated frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationSample {
    pub time: Float,
    pub velocity: Vector3<Float>,
    pub angular_velocity: Vector3<Float>,
    pub torque: Vector3<Float>,
    pub kinetic_energy: Float,
    pub rotational_energy: Float,
    pub potential_energy: Float,
    pub total_energy: Float,
}

impl SimulationSample {
    pub fn new(
        time: Float,
        velocity: Vector3<Float>,
        angular_velocity: Vector3<Float>,
        torque: Vector3<Float>,
        energies: &Energies,
    ) -> Self {
        SimulationSample {
            time,
            velocity,
            angular_velocity,
            torque,
            kinetic_energy: energies.kinetic,
            rotational_energy: energies.rotational,
            potential_energy: energies.potential,
            total_energy: energies.total(),
        }
    }

    pub fn value(&self, channel: Channel) -> Float {
        match channel {
            Channel::VelocityX => self.velocity.x,
            Channel::VelocityY => self.velocity.y,
            Channel::VelocityZ => self.velocity.z,
            Channel::AngularVelocityX => self.angular_velocity.x,
            Channel::AngularVelocityY => self.angular_velocity.y,
            Channel::AngularVelocityZ => self.angular_velocity.z,
            Channel::TorqueX => self.torque.x,
            Channel::TorqueY => self.torque.y,
            Channel::TorqueZ => self.torque.z,
            Channel::KineticEnergy => self.kinetic_energy,
            Channel::RotationalEnergy => self.rotational_energy,
            Channel::PotentialEnergy => self.potential_energy,
            Channel::TotalEnergy => self.total_energy,
        }
    }
}

/// A scalar quantity recorded in every sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    VelocityX,
    VelocityY,
    VelocityZ,
    AngularVelocityX,
    AngularVelocityY,
    AngularVelocityZ,
    TorqueX,
    TorqueY,
    TorqueZ,
    KineticEnergy,
    RotationalEnergy,
    PotentialEnergy,
    TotalEnergy,
}

impl Channel {
    pub const VELOCITY: [Channel; 3] = [Channel::VelocityX, Channel::VelocityY, Channel::VelocityZ];
    pub const ANGULAR_VELOCITY: [Channel; 3] = [
        Channel::AngularVelocityX,
        Channel::AngularVelocityY,
        Channel::AngularVelocityZ,
    ];
    pub const TORQUE: [Channel; 3] = [Channel::TorqueX, Channel::TorqueY, Channel::TorqueZ];
    pub const ENERGY: [Channel; 4] = [
        Channel::KineticEnergy,
        Channel::RotationalEnergy,
        Channel::PotentialEnergy,
        Channel::TotalEnergy,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Channel::VelocityX => "vx",
            Channel::VelocityY => "vy",
            Channel::VelocityZ => "vz",
            Channel::AngularVelocityX => "wx",
            Channel::AngularVelocityY => "wy",
            Channel::AngularVelocityZ => "wz",
            Channel::TorqueX => "tx",
            Channel::TorqueY => "ty",
            Channel::TorqueZ => "tz",
            Channel::KineticEnergy => "Ekin",
            Channel::RotationalEnergy => "Erot",
            Channel::PotentialEnergy => "Epot",
            Channel::TotalEnergy => "E",
        }
    }
}

/// Samples in the order they were taken. Entries are never mutated once
/// pushed and the log never drops any; capping for display is up to the
/// reader, see `window`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SimulationLog {
    samples: Vec<SimulationSample>,
}

impl SimulationLog {
    pub fn new() -> Self {
        SimulationLog { samples: vec![] }
    }

    pub fn push(&mut self, sample: SimulationSample) {
        self.samples.push(sample);
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn samples(&self) -> &[SimulationSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last(&self) -> Option<&SimulationSample> {
        self.samples.last()
    }

    /// The most recent `n` samples, or all of them if fewer were taken
    pub fn window(&self, n: usize) -> &[SimulationSample] {
        let start = self.samples.len().saturating_sub(n);
        &self.samples[start..]
    }

    /// (time, value) pairs of one channel
    pub fn series(&self, channel: Channel) -> Vec<(Float, Float)> {
        self.samples
            .iter()
            .map(|sample| (sample.time, sample.value(channel)))
            .collect()
    }

    pub fn to_json(&self) -> TopResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod telemetry_tests {
    use na::vector;

    use super::*;

    fn sample(time: Float) -> SimulationSample {
        let energies = Energies {
            kinetic: 1.0,
            rotational: 2.0,
            potential: 3.0,
        };
        SimulationSample::new(
            time,
            vector![time, 0.0, 0.0],
            vector![0.0, 10.0, 0.0],
            Vector3::zeros(),
            &energies,
        )
    }

    #[test]
    fn window_returns_most_recent_samples() {
        // Arrange
        let mut log = SimulationLog::new();
        for i in 0..10 {
            log.push(sample(i as Float));
        }

        // Act
        let window = log.window(3);

        // Assert
        assert_eq!(window.len(), 3);
        assert_eq!(window[0].time, 7.0);
        assert_eq!(window[2].time, 9.0);
        assert_eq!(log.window(100).len(), 10);
        assert_eq!(log.len(), 10);
    }

    #[test]
    fn series_reads_one_channel() {
        let mut log = SimulationLog::new();
        log.push(sample(0.5));
        log.push(sample(1.0));

        assert_eq!(log.series(Channel::VelocityX), vec![(0.5, 0.5), (1.0, 1.0)]);
        assert_eq!(log.series(Channel::AngularVelocityY)[1], (1.0, 10.0));
        assert_eq!(log.series(Channel::TotalEnergy)[0], (0.5, 6.0));
    }

    #[test]
    fn clear_empties_the_log() {
        let mut log = SimulationLog::new();
        log.push(sample(0.0));

        log.clear();

        assert!(log.is_empty());
        assert_eq!(log.last(), None);
    }

    #[test]
    fn serializes_as_sample_array() {
        let mut log = SimulationLog::new();
        log.push(sample(0.25));

        let json = log.to_json().unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["time"], 0.25);
        assert_eq!(value[0]["total_energy"], 6.0);
        assert_eq!(value[0]["angular_velocity"][1], 10.0);
    }
}

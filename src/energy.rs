use na::{Matrix3, Vector3};

use crate::{inertia::rotational_energy, types::Float, GRAVITY};

/// Energy bookkeeping of a top at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Energies {
    pub kinetic: Float,
    pub rotational: Float,
    pub potential: Float,
}

impl Energies {
    /// Compute the three energy terms.
    /// The body origin sits -p.y above the contact point, which is taken as
    /// its height above the ground plane.
    pub fn new(
        mass: Float,
        velocity: &Vector3<Float>,
        angular_velocity: &Vector3<Float>,
        world_inertia: &Matrix3<Float>,
        contact: &Vector3<Float>,
    ) -> Self {
        Energies {
            kinetic: kinetic_energy(mass, velocity),
            rotational: rotational_energy(world_inertia, angular_velocity),
            potential: potential_energy(mass, -contact.y),
        }
    }

    pub fn total(&self) -> Float {
        self.kinetic + self.rotational + self.potential
    }
}

/// Translational kinetic energy 1/2 * m * |v|²
pub fn kinetic_energy(mass: Float, velocity: &Vector3<Float>) -> Float {
    0.5 * mass * velocity.norm_squared()
}

/// Gravitational potential energy m * g * h
pub fn potential_energy(mass: Float, height: Float) -> Float {
    mass * GRAVITY * height
}

#[cfg(test)]
mod energy_tests {
    use na::vector;

    use super::*;
    use crate::assert_close;

    #[test]
    fn energy_terms() {
        // Arrange
        let m = 2.0;
        let v = vector![1.0, 2.0, 2.0];
        let w = vector![0.0, 0.0, 3.0];
        let inertia = Matrix3::from_diagonal(&vector![1.0, 1.0, 0.5]);
        let contact = vector![0.0, -0.5, 0.0];

        // Act
        let energies = Energies::new(m, &v, &w, &inertia, &contact);

        // Assert
        assert_close!(energies.kinetic, 9.0, 1e-12);
        assert_close!(energies.rotational, 2.25, 1e-12);
        assert_close!(energies.potential, m * GRAVITY * 0.5, 1e-12);
        assert_close!(energies.total(), 11.25 + m * GRAVITY * 0.5, 1e-12);
    }
}

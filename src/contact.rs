//! Contact-point resolution against the ground plane y = 0.
//!
//! Each resolver maps the linear part of a body's world transform to the
//! world-frame offset, from the body origin, of the surface point touching
//! the ground. They are pure functions of the rotation and the body's
//! constant geometry.

use na::{Rotation3, Vector3};

use crate::types::Float;

/// Weighted norms below this are treated as a degenerate support direction.
pub const DEGENERATE_EPSILON: Float = 1e-12;

/// Half-width, in radians, of the band around the tippe-top threshold in
/// which the peg and cap contacts are blended.
pub const TIPPE_BLEND_HALF_WIDTH: Float = 0.02;

pub fn up() -> Vector3<Float> {
    Vector3::y()
}

pub fn down() -> Vector3<Float> {
    -Vector3::y()
}

/// World up axis expressed in body coordinates, u = R^T * up
pub fn body_up(rotation: &Rotation3<Float>) -> Vector3<Float> {
    rotation.inverse() * up()
}

/// Support point of an origin-centered ellipsoid with the given radii in
/// direction -u, i.e. the surface point with the lowest projection on u.
///
/// Closed form from the Lagrange condition: p = -D²u / sqrt(u^T D² u),
/// with D = diag(radii). Returns None when the weighted norm vanishes.
pub fn ellipsoid_support(radii: &Vector3<Float>, u: &Vector3<Float>) -> Option<Vector3<Float>> {
    let d2 = radii.component_mul(radii);
    let weighted = -d2.component_mul(u);
    let norm2 = u.dot(&d2.component_mul(u));
    if norm2 < DEGENERATE_EPSILON {
        return None;
    }
    Some(weighted / norm2.sqrt())
}

/// φ-top: tri-axial ellipsoid with radii (r, r*φ, r) centered at the origin.
pub fn phi_top_contact(radii: &Vector3<Float>, rotation: &Rotation3<Float>) -> Vector3<Float> {
    let u = body_up(rotation);
    // u is a unit vector and every radius is positive, so the weighted norm
    // is at least min(radii)²
    let p = ellipsoid_support(radii, &u).unwrap_or_else(|| Vector3::new(0.0, -radii.y, 0.0));
    rotation * p
}

/// Geometry of a tippe-top: a main sphere of radius `r1` whose center sits
/// `c` above the origin along the body y-axis, fused with a peg sphere of
/// radius `r2` centered on the main sphere's surface at the top of that axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TippeGeometry {
    pub r1: Float,
    pub r2: Float,
    pub c: Float,
}

/// Which part of a tippe-top touches the ground.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TippeContact {
    Peg,
    Cap,
    /// Inside the blend band, weight of the cap contact in [0, 1]
    Blend(Float),
}

impl TippeGeometry {
    /// Tilt at which the ground leaves the spherical cap and meets the peg
    pub fn threshold(&self) -> Float {
        ((self.r1 - self.r2) / self.r1).acos()
    }

    /// Tilt of the symmetry axis a = R * y away from straight down
    pub fn tilt(&self, rotation: &Rotation3<Float>) -> Float {
        let axis = rotation * Vector3::y();
        axis.dot(&down()).clamp(-1.0, 1.0).acos()
    }

    pub fn classify(&self, rotation: &Rotation3<Float>) -> TippeContact {
        let theta = self.tilt(rotation);
        let threshold = self.threshold();
        if theta <= threshold - TIPPE_BLEND_HALF_WIDTH {
            TippeContact::Peg
        } else if theta >= threshold + TIPPE_BLEND_HALF_WIDTH {
            TippeContact::Cap
        } else {
            let t = (theta - (threshold - TIPPE_BLEND_HALF_WIDTH)) / (2.0 * TIPPE_BLEND_HALF_WIDTH);
            TippeContact::Blend(t)
        }
    }

    /// Lowest point of the peg sphere
    pub fn peg_contact(&self, rotation: &Rotation3<Float>) -> Vector3<Float> {
        let axis = rotation * Vector3::y();
        up() * -self.r2 + axis * (self.r1 + self.c)
    }

    /// Lowest point of the main sphere
    pub fn cap_contact(&self, rotation: &Rotation3<Float>) -> Vector3<Float> {
        let axis = rotation * Vector3::y();
        up() * -self.r1 + axis * self.c
    }

    pub fn contact(&self, rotation: &Rotation3<Float>) -> Vector3<Float> {
        match self.classify(rotation) {
            TippeContact::Peg => self.peg_contact(rotation),
            TippeContact::Cap => self.cap_contact(rotation),
            TippeContact::Blend(t) => {
                self.peg_contact(rotation) * (1.0 - t) + self.cap_contact(rotation) * t
            }
        }
    }
}

/// Rattleback: lower half of an ellipsoid with radii `radii`, whose center
/// sits at `center` in body frame. The flat top replaces the upper half, so
/// support directions pointing up are clamped onto the rim.
pub fn rattleback_contact(
    radii: &Vector3<Float>,
    center: &Vector3<Float>,
    rotation: &Rotation3<Float>,
) -> Vector3<Float> {
    let u = body_up(rotation);
    let clamped = Vector3::new(u.x, u.y.max(0.0), u.z);
    match ellipsoid_support(radii, &clamped) {
        Some(p) => rotation * (p + center),
        // Upside down: the flat face rests on the ground and its center is
        // the contact point. With R^T y = -y we have R * center = -center.
        None => -center,
    }
}

#![allow(non_snake_case)]

use types::Float;
pub extern crate nalgebra as na;

pub mod contact;
pub mod dynamics;
pub mod energy;
pub mod error;
pub mod inertia;
pub mod integrators;
pub mod material;
pub mod plot;
pub mod pose;
pub mod shapes;
pub mod simulate;
pub mod telemetry;
pub mod types;
pub mod util;

// Wasm bindings
pub mod interface;

pub const GRAVITY: Float = 9.81;

pub const PI: Float = std::f64::consts::PI;
pub const TWO_PI: Float = 2.0 * PI;

/// The golden ratio, the aspect ratio of the φ-top ellipsoid
pub const PHI: Float = 1.6180339887;

use na::{Quaternion, UnitQuaternion, Vector3};
use wasm_bindgen::prelude::*;
use web_sys::js_sys::Float32Array;

use crate::{
    pose::Pose,
    shapes::{
        phi_top::{PhiTop, PhiTopParams},
        rattleback::{Rattleback, RattlebackParams},
        tippe_top::{TippeTop, TippeTopParams},
        TopKind, TopShape,
    },
    simulate::Top,
    toJsFloat32Array,
    types::Float,
    util::console_log,
};

pub mod util;

/// WebAssembly interface to a single top.
///
/// Poses cross the boundary as 7 floats: position (x, y, z) followed by the
/// orientation quaternion (x, y, z, w).
#[wasm_bindgen]
pub struct InterfaceTop {
    pub(crate) inner: Top,
}

#[wasm_bindgen]
impl InterfaceTop {
    /// Advance by one rendered frame, dt in seconds. Returns the new pose.
    #[wasm_bindgen]
    pub fn tick(&mut self, simulate: bool, dt: Float) -> Float32Array {
        self.inner.tick(simulate, dt);
        self.pose()
    }

    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.inner.reset();
    }

    #[wasm_bindgen]
    pub fn pose(&self) -> Float32Array {
        let pose = self.inner.pose();
        let t = pose.translation;
        let q = pose.rotation.coords;
        toJsFloat32Array!([t.x, t.y, t.z, q.x, q.y, q.z, q.w])
    }

    /// Homogeneous world transform as 16 floats in column-major order, ready
    /// to copy into a scene-graph node
    #[wasm_bindgen]
    pub fn worldMatrix(&self) -> Float32Array {
        toJsFloat32Array!(self.inner.pose().to_matrix())
    }

    /// Follow the host scene graph when it moves the top
    #[wasm_bindgen]
    pub fn setPose(&mut self, x: Float, y: Float, z: Float, qx: Float, qy: Float, qz: Float, qw: Float) {
        let rotation = UnitQuaternion::from_quaternion(Quaternion::new(qw, qx, qy, qz));
        self.inner.set_pose(Pose::new(rotation, Vector3::new(x, y, z)));
    }

    /// Contact offset at the current orientation, (x, y, z)
    #[wasm_bindgen]
    pub fn contactPoint(&self) -> Float32Array {
        toJsFloat32Array!(self.inner.current_contact())
    }

    #[wasm_bindgen]
    pub fn time(&self) -> Float {
        self.inner.time()
    }

    #[wasm_bindgen]
    pub fn sampleCount(&self) -> usize {
        self.inner.samples().len()
    }

    /// The sample log as a JSON array
    #[wasm_bindgen]
    pub fn samplesJson(&self) -> Result<String, JsError> {
        Ok(self.inner.samples().to_json()?)
    }

    /// Samples of the most recent `n` frames as a JSON array
    #[wasm_bindgen]
    pub fn recentSamplesJson(&self, n: usize) -> Result<String, JsError> {
        Ok(serde_json::to_string(self.inner.samples().window(n))?)
    }

    #[wasm_bindgen]
    pub fn setCustomTorque(&mut self, enabled: bool) {
        self.inner.set_custom_torque(enabled);
    }

    #[wasm_bindgen]
    pub fn setFriction(&mut self, friction: Float) -> Result<(), JsError> {
        Ok(self.inner.set_friction(friction)?)
    }
}

fn create(shape: TopShape) -> Result<InterfaceTop, JsError> {
    match Top::new(shape) {
        Ok(inner) => Ok(InterfaceTop { inner }),
        Err(err) => {
            console_log(&format!("failed to create top: {}", err));
            Err(err.into())
        }
    }
}

#[wasm_bindgen]
pub fn createPhiTop(scale: Float) -> Result<InterfaceTop, JsError> {
    let params = PhiTopParams {
        scale,
        ..Default::default()
    };
    create(PhiTop::new(params)?.into())
}

#[wasm_bindgen]
pub fn createTippeTop() -> Result<InterfaceTop, JsError> {
    create(TippeTop::new(TippeTopParams::default())?.into())
}

#[wasm_bindgen]
pub fn createRattleback(scale: Float) -> Result<InterfaceTop, JsError> {
    let params = RattlebackParams {
        scale,
        ..Default::default()
    };
    create(Rattleback::new(params)?.into())
}

/// Create a top from its kind ("phi_top", "tippe_top" or "rattleback") and
/// JSON-encoded parameters. Missing parameters take their defaults.
#[wasm_bindgen]
pub fn createTopFromJson(kind: &str, json: &str) -> Result<InterfaceTop, JsError> {
    let kind = TopKind::from_name(kind)
        .ok_or_else(|| JsError::new(&format!("unknown top kind: {}", kind)))?;
    create(TopShape::from_json(kind, json)?)
}

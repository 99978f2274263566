//! Surface material of the tops, handed to the renderer.
//!
//! The physics never reads these values. A host creates one
//! `MaterialLibrary` and asks it for the material of each scene; the library
//! builds a material the first time a scene asks and returns the same
//! instance afterwards, so all tops in a scene share one material.

use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Physically based metallic/roughness material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopMaterial {
    pub name: String,
    pub roughness: f32,
    pub metallic_roughness_texture: String,
    pub base_texture: String,
    pub normal_texture: String,
}

impl TopMaterial {
    /// Polished metal, textures from the Metal012 set
    pub fn metal() -> Self {
        TopMaterial {
            name: "top#material".to_string(),
            roughness: 0.1,
            metallic_roughness_texture: "Metal012_1K-JPG/Metal012_1K_Metalness.jpg".to_string(),
            base_texture: "Metal012_1K-JPG/Metal012_1K_Color.jpg".to_string(),
            normal_texture: "Metal012_1K-JPG/Metal012_1K_NormalGL.jpg".to_string(),
        }
    }
}

impl Default for TopMaterial {
    fn default() -> Self {
        TopMaterial::metal()
    }
}

/// Memoizing material factory, keyed by scene.
#[derive(Debug, Default)]
pub struct MaterialLibrary {
    template: TopMaterial,
    materials: HashMap<String, Rc<TopMaterial>>,
}

impl MaterialLibrary {
    pub fn new(template: TopMaterial) -> Self {
        MaterialLibrary {
            template,
            materials: HashMap::new(),
        }
    }

    /// Material for the given scene, created on first use
    pub fn material(&mut self, scene: &str) -> Rc<TopMaterial> {
        let template = &self.template;
        self.materials
            .entry(scene.to_string())
            .or_insert_with(|| Rc::new(template.clone()))
            .clone()
    }

    /// Drop the material of a scene that went away
    pub fn release(&mut self, scene: &str) -> Option<Rc<TopMaterial>> {
        self.materials.remove(scene)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

//! Scene-level state consulted by material features each frame

use super::material::MaterialFlags;
use super::texture::TextureRef;

/// Scene capabilities a material reads while preparing and binding
#[derive(Debug, Clone)]
pub struct SceneContext {
    /// Master switch for texture sampling in the scene
    pub textures_enabled: bool,
    /// Environment texture used for reflections, and refraction fallback
    pub environment_texture: Option<TextureRef>,
    /// Per-channel texture toggles
    pub material_flags: MaterialFlags,
}

impl SceneContext {
    /// Scene with textures enabled, no environment and every channel on
    pub fn new() -> Self {
        Self {
            textures_enabled: true,
            environment_texture: None,
            material_flags: MaterialFlags::default(),
        }
    }

    /// Set the environment texture
    pub fn with_environment(mut self, texture: TextureRef) -> Self {
        self.environment_texture = Some(texture);
        self
    }

    /// Enable or disable scene texturing
    pub fn with_textures_enabled(mut self, enabled: bool) -> Self {
        self.textures_enabled = enabled;
        self
    }

    /// Replace the channel toggles
    pub fn with_material_flags(mut self, flags: MaterialFlags) -> Self {
        self.material_flags = flags;
        self
    }
}

impl Default for SceneContext {
    fn default() -> Self {
        Self::new()
    }
}

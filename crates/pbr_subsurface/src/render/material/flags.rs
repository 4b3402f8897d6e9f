//! Global texture-channel toggles
//!
//! Lets tooling switch individual texture channels off for every material at
//! once (for debugging, or to strip features on weak hardware). The toggles are
//! plain configuration and can be loaded from TOML or RON.

use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Texture channels that subsurface features may sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialFlags {
    /// Thickness (and mask) textures are sampled
    pub thickness_texture_enabled: bool,
    /// Refraction textures, including the environment fallback, are sampled
    pub refraction_texture_enabled: bool,
}

impl MaterialFlags {
    /// Every channel enabled
    pub const fn all_enabled() -> Self {
        Self {
            thickness_texture_enabled: true,
            refraction_texture_enabled: true,
        }
    }

    /// Every channel disabled
    pub const fn all_disabled() -> Self {
        Self {
            thickness_texture_enabled: false,
            refraction_texture_enabled: false,
        }
    }
}

impl Default for MaterialFlags {
    fn default() -> Self {
        Self::all_enabled()
    }
}

impl Config for MaterialFlags {}

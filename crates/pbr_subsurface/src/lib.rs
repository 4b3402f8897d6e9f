//! # PBR Subsurface
//!
//! Subsurface, refraction and translucency parameters for a physically based
//! material, and the per-frame plumbing that turns them into shader defines,
//! uniform values and sampler bindings.
//!
//! ## Features
//!
//! - **Parameter block**: change-tracked setters with a dirty callback
//! - **Shader variants**: define derivation with compile fallbacks
//! - **Uniform upload**: std140 block with frozen-material skipping
//! - **Persistence**: serde snapshot, RON text, TOML/RON channel config
//!
//! ## Quick Start
//!
//! ```rust
//! use pbr_subsurface::prelude::*;
//!
//! let scene = SceneContext::new();
//! let mut material = PbrMaterial::new("jade", true);
//! material.sub_surface_mut().set_translucency_enabled(true);
//! material.sub_surface_mut().set_tint_color(Color3::new(0.3, 0.8, 0.5));
//!
//! if material.is_ready(&scene) {
//!     let upload = material.bind(&scene);
//!     assert!(upload.is_some());
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,
    clippy::float_cmp,
    clippy::must_use_candidate
)]

pub mod config;
pub mod error;
pub mod foundation;
pub mod render;

pub use error::{MaterialError, MaterialResult};

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, ConfigFormat},
        error::{MaterialError, MaterialResult},
        foundation::math::{Color3, Mat4, Vec3},
        render::{
            material::{
                EffectFallbacks, MaterialFlags, PbrMaterial, SubSurfaceConfiguration,
                SubSurfaceData, SubSurfaceDefines, SubSurfaceFlags,
            },
            texture::{
                BaseTexture, DescriptorLoader, Texture, TextureDescriptor, TextureLoader, TextureRef,
            },
            Effect, SceneContext, UniformBuffer,
        },
    };
}

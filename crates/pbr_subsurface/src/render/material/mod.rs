//! Material features
//!
//! The subsurface block and the pieces a PBR material needs around it:
//! define sets, compile fallbacks, channel toggles and persistence data.

pub mod defines;
pub mod fallbacks;
pub mod flags;
pub mod pbr_material;
pub mod subsurface;
pub mod subsurface_data;

pub use defines::{SubSurfaceDefines, SubSurfaceFlags};
pub use fallbacks::EffectFallbacks;
pub use flags::MaterialFlags;
pub use pbr_material::PbrMaterial;
pub use subsurface::{DirtyCallback, SubSurfaceConfiguration, SUBSURFACE_SAMPLERS, SUBSURFACE_UNIFORMS};
pub use subsurface_data::SubSurfaceData;

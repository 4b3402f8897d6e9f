//! Rendering-side types consumed by material features

pub mod effect;
pub mod material;
pub mod scene;
pub mod texture;
pub mod uniform_buffer;

pub use effect::Effect;
pub use material::{PbrMaterial, SubSurfaceConfiguration};
pub use scene::SceneContext;
pub use texture::{BaseTexture, Texture, TextureDescriptor, TextureLoader, TextureRef};
pub use uniform_buffer::UniformBuffer;

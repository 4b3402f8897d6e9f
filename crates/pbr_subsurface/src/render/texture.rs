//! Texture references used by material features
//!
//! Materials never own GPU textures. They hold shared [`TextureRef`] handles
//! whose lifetime is managed by the caller, and only query the properties that
//! drive shader defines and uniform values. [`Texture`] is the engine-side
//! implementation; anything else can plug in through [`BaseTexture`].

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Mat4, Mat4Ext, Vec2};

/// Shared handle to a texture owned elsewhere
pub type TextureRef = Arc<dyn BaseTexture>;

/// Pixel dimensions of a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureSize {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// Pre-filtered LOD slots for engines without LOD-based microsurface sampling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LodLevel {
    /// Lowest roughness level
    Low,
    /// Middle roughness level
    Mid,
    /// Highest roughness level
    High,
}

fn identity_matrix() -> Mat4 {
    Mat4::identity()
}

fn default_lod_scale() -> f32 {
    1.0
}

fn default_uv_scale() -> [f32; 2] {
    [1.0, 1.0]
}

/// Serializable description of a texture
///
/// This is what materials persist for each texture slot; a
/// [`TextureLoader`] turns it back into a live texture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureDescriptor {
    /// Name or URL of the texture source
    pub name: String,
    /// UV set used to sample the texture
    #[serde(default)]
    pub coordinates_index: u32,
    /// Intensity multiplier applied when sampling
    #[serde(default = "default_lod_scale")]
    pub level: f32,
    /// Cube map instead of a 2D texture
    #[serde(default)]
    pub is_cube: bool,
    /// Stored in gamma space rather than linear
    #[serde(default)]
    pub gamma_space: bool,
    /// RGBD encoded HDR data
    #[serde(default)]
    pub is_rgbd: bool,
    /// Specular LOD computed linearly from roughness
    #[serde(default)]
    pub linear_specular_lod: bool,
    /// Cube map Z axis is inverted
    #[serde(default)]
    pub invert_z: bool,
    /// LOD level is stored in the alpha channel
    #[serde(default)]
    pub lod_level_in_alpha: bool,
    /// Texture is rendered into every frame
    #[serde(default)]
    pub is_render_target: bool,
    /// Width in pixels
    #[serde(default)]
    pub width: u32,
    /// Height in pixels
    #[serde(default)]
    pub height: u32,
    /// Depth of 3D and array textures
    #[serde(default)]
    pub depth: Option<u32>,
    /// Scale applied to the LOD computed from roughness
    #[serde(default = "default_lod_scale")]
    pub lod_generation_scale: f32,
    /// Offset applied to the LOD computed from roughness
    #[serde(default)]
    pub lod_generation_offset: f32,
    /// UV scale
    #[serde(default = "default_uv_scale")]
    pub uv_scale: [f32; 2],
    /// UV offset
    #[serde(default)]
    pub uv_offset: [f32; 2],
    /// UV rotation in radians
    #[serde(default)]
    pub uv_rotation: f32,
    /// Matrix used when sampling the texture as an environment/refraction map
    #[serde(default = "identity_matrix")]
    pub reflection_matrix: Mat4,
    /// Texture has animations attached
    #[serde(default)]
    pub has_animations: bool,
}

impl TextureDescriptor {
    /// Create a 2D texture descriptor with default sampling parameters
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            coordinates_index: 0,
            level: 1.0,
            is_cube: false,
            gamma_space: false,
            is_rgbd: false,
            linear_specular_lod: false,
            invert_z: false,
            lod_level_in_alpha: false,
            is_render_target: false,
            width: 0,
            height: 0,
            depth: None,
            lod_generation_scale: 1.0,
            lod_generation_offset: 0.0,
            uv_scale: [1.0, 1.0],
            uv_offset: [0.0, 0.0],
            uv_rotation: 0.0,
            reflection_matrix: Mat4::identity(),
            has_animations: false,
        }
    }

    /// Create a cube map descriptor
    pub fn cube(name: impl Into<String>) -> Self {
        Self {
            is_cube: true,
            ..Self::new(name)
        }
    }

    /// Set the pixel size
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the UV set index
    pub fn with_coordinates_index(mut self, index: u32) -> Self {
        self.coordinates_index = index;
        self
    }

    /// Set the sampling level
    pub fn with_level(mut self, level: f32) -> Self {
        self.level = level;
        self
    }

    /// Set UV scale, offset and rotation
    pub fn with_uv_transform(mut self, scale: [f32; 2], offset: [f32; 2], rotation: f32) -> Self {
        self.uv_scale = scale;
        self.uv_offset = offset;
        self.uv_rotation = rotation;
        self
    }

    /// Mark the texture as a render target
    pub fn as_render_target(mut self) -> Self {
        self.is_render_target = true;
        self
    }

    /// Matrix transforming mesh UVs into texture UVs
    pub fn texture_matrix(&self) -> Mat4 {
        Mat4::uv_transform(
            Vec2::new(self.uv_scale[0], self.uv_scale[1]),
            Vec2::new(self.uv_offset[0], self.uv_offset[1]),
            self.uv_rotation,
        )
    }
}

/// Texture properties a material needs to pick defines and upload uniforms
///
/// Only [`descriptor`](Self::descriptor), readiness and disposal are
/// required; everything else is derived from the descriptor.
pub trait BaseTexture: fmt::Debug + Send + Sync {
    /// Static description of the texture
    fn descriptor(&self) -> &TextureDescriptor;

    /// True once the texture can be sampled, or if sampling it early is allowed
    fn is_ready_or_not_blocking(&self) -> bool;

    /// Release the texture's resources
    fn dispose(&self);

    /// Pre-filtered LOD texture, if the texture has one for `level`
    fn lod_texture(&self, _level: LodLevel) -> Option<TextureRef> {
        None
    }

    /// Name or URL of the texture source
    fn name(&self) -> &str {
        &self.descriptor().name
    }

    /// UV set used to sample the texture
    fn coordinates_index(&self) -> u32 {
        self.descriptor().coordinates_index
    }

    /// Intensity multiplier
    fn level(&self) -> f32 {
        self.descriptor().level
    }

    /// UV transform
    fn texture_matrix(&self) -> Mat4 {
        self.descriptor().texture_matrix()
    }

    /// Environment sampling transform
    fn reflection_texture_matrix(&self) -> Mat4 {
        self.descriptor().reflection_matrix
    }

    /// Cube map
    fn is_cube(&self) -> bool {
        self.descriptor().is_cube
    }

    /// Gamma-space storage
    fn gamma_space(&self) -> bool {
        self.descriptor().gamma_space
    }

    /// RGBD encoding
    fn is_rgbd(&self) -> bool {
        self.descriptor().is_rgbd
    }

    /// Linear specular LOD
    fn linear_specular_lod(&self) -> bool {
        self.descriptor().linear_specular_lod
    }

    /// Inverted cube Z
    fn invert_z(&self) -> bool {
        self.descriptor().invert_z
    }

    /// LOD stored in alpha
    fn lod_level_in_alpha(&self) -> bool {
        self.descriptor().lod_level_in_alpha
    }

    /// Rendered every frame
    fn is_render_target(&self) -> bool {
        self.descriptor().is_render_target
    }

    /// Depth of 3D/array textures
    fn depth(&self) -> Option<u32> {
        self.descriptor().depth
    }

    /// Pixel size
    fn size(&self) -> TextureSize {
        let desc = self.descriptor();
        TextureSize {
            width: desc.width,
            height: desc.height,
        }
    }

    /// LOD generation scale
    fn lod_generation_scale(&self) -> f32 {
        self.descriptor().lod_generation_scale
    }

    /// LOD generation offset
    fn lod_generation_offset(&self) -> f32 {
        self.descriptor().lod_generation_offset
    }

    /// Has animations attached
    fn has_animations(&self) -> bool {
        self.descriptor().has_animations
    }
}

/// Identity comparison between two texture handles
pub fn same_texture(a: &TextureRef, b: &TextureRef) -> bool {
    std::ptr::eq(Arc::as_ptr(a).cast::<()>(), Arc::as_ptr(b).cast::<()>())
}

/// Engine texture with externally driven loading state
#[derive(Debug)]
pub struct Texture {
    descriptor: TextureDescriptor,
    ready: AtomicBool,
    disposed: AtomicBool,
    lods: [Option<TextureRef>; 3],
}

impl Texture {
    /// Create a texture that is ready to sample
    pub fn new(descriptor: TextureDescriptor) -> Self {
        Self {
            descriptor,
            ready: AtomicBool::new(true),
            disposed: AtomicBool::new(false),
            lods: [None, None, None],
        }
    }

    /// Create a texture whose data is still loading
    pub fn pending(descriptor: TextureDescriptor) -> Self {
        let texture = Self::new(descriptor);
        texture.ready.store(false, Ordering::Release);
        texture
    }

    /// Attach pre-filtered low/mid/high LOD textures
    pub fn with_lod_textures(
        mut self,
        low: Option<TextureRef>,
        mid: Option<TextureRef>,
        high: Option<TextureRef>,
    ) -> Self {
        self.lods = [low, mid, high];
        self
    }

    /// Wrap into a shared handle
    pub fn into_ref(self) -> TextureRef {
        Arc::new(self)
    }

    /// Signal that the texture data finished loading
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Whether [`BaseTexture::dispose`] has been called
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}

impl BaseTexture for Texture {
    fn descriptor(&self) -> &TextureDescriptor {
        &self.descriptor
    }

    fn is_ready_or_not_blocking(&self) -> bool {
        self.ready.load(Ordering::Acquire) && !self.is_disposed()
    }

    fn dispose(&self) {
        if !self.disposed.swap(true, Ordering::AcqRel) {
            log::debug!("Disposed texture '{}'", self.descriptor.name);
        }
    }

    fn lod_texture(&self, level: LodLevel) -> Option<TextureRef> {
        let slot = match level {
            LodLevel::Low => 0,
            LodLevel::Mid => 1,
            LodLevel::High => 2,
        };
        self.lods[slot].clone()
    }
}

/// Resolves serialized texture descriptors back into live textures
pub trait TextureLoader {
    /// Create or look up the texture described by `descriptor`
    ///
    /// `root_url` is the base location relative names are resolved against.
    fn load(&self, descriptor: &TextureDescriptor, root_url: &str) -> Option<TextureRef>;
}

impl<F> TextureLoader for F
where
    F: Fn(&TextureDescriptor, &str) -> Option<TextureRef>,
{
    fn load(&self, descriptor: &TextureDescriptor, root_url: &str) -> Option<TextureRef> {
        self(descriptor, root_url)
    }
}

/// Loader that materializes descriptors directly as ready [`Texture`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptorLoader;

impl TextureLoader for DescriptorLoader {
    fn load(&self, descriptor: &TextureDescriptor, root_url: &str) -> Option<TextureRef> {
        let mut descriptor = descriptor.clone();
        if !root_url.is_empty() && !descriptor.name.contains("://") {
            descriptor.name = format!("{root_url}{}", descriptor.name);
        }
        Some(Texture::new(descriptor).into_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_texture_becomes_ready() {
        let texture = Texture::pending(TextureDescriptor::new("thickness.png"));
        assert!(!texture.is_ready_or_not_blocking());
        texture.mark_ready();
        assert!(texture.is_ready_or_not_blocking());
        texture.dispose();
        assert!(texture.is_disposed());
        assert!(!texture.is_ready_or_not_blocking());
    }

    #[test]
    fn test_texture_identity() {
        let a = Texture::new(TextureDescriptor::new("a")).into_ref();
        let b = Texture::new(TextureDescriptor::new("a")).into_ref();
        assert!(same_texture(&a, &a.clone()));
        assert!(!same_texture(&a, &b));
    }

    #[test]
    fn test_lod_slots() {
        let low = Texture::new(TextureDescriptor::new("low")).into_ref();
        let env = Texture::new(TextureDescriptor::cube("env"))
            .with_lod_textures(Some(low.clone()), None, None);
        assert!(same_texture(&env.lod_texture(LodLevel::Low).unwrap(), &low));
        assert!(env.lod_texture(LodLevel::Mid).is_none());
    }

    #[test]
    fn test_descriptor_loader_prefixes_root_url() {
        let tex = DescriptorLoader
            .load(&TextureDescriptor::new("thickness.png"), "assets/")
            .unwrap();
        assert_eq!(tex.name(), "assets/thickness.png");

        let remote = DescriptorLoader
            .load(&TextureDescriptor::new("https://cdn/x.png"), "assets/")
            .unwrap();
        assert_eq!(remote.name(), "https://cdn/x.png");
    }

    #[test]
    fn test_descriptor_defaults_from_ron() {
        let desc: TextureDescriptor = ron::from_str("(name: \"env.dds\", isCube: true)").unwrap();
        assert!(desc.is_cube);
        assert_eq!(desc.level, 1.0);
        assert_eq!(desc.uv_scale, [1.0, 1.0]);
        assert!(desc.texture_matrix().is_identity_as_3x2());
    }
}

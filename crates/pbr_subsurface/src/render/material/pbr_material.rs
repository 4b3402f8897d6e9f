//! Minimal PBR material owning a subsurface block
//!
//! Wires the block's dirty callback to the material's define cache and drives
//! the per-frame sequence: readiness, define derivation, upload and unbind.

use std::cell::Cell;
use std::rc::Rc;

use crate::render::effect::Effect;
use crate::render::scene::SceneContext;
use crate::render::uniform_buffer::UniformBuffer;

use super::defines::{SubSurfaceDefines, SubSurfaceFlags};
use super::fallbacks::EffectFallbacks;
use super::subsurface::SubSurfaceConfiguration;

/// PBR material state relevant to subsurface rendering
#[derive(Debug)]
pub struct PbrMaterial {
    name: String,
    sub_surface: SubSurfaceConfiguration,
    defines: SubSurfaceDefines,
    uniform_buffer: UniformBuffer,
    textures_dirty: Rc<Cell<bool>>,
    is_frozen: bool,
    lod_based_microsurface: bool,
}

impl PbrMaterial {
    /// Create a material with default subsurface parameters
    ///
    /// `use_ubo` selects whether uniforms are uploaded as a block.
    pub fn new(name: impl Into<String>, use_ubo: bool) -> Self {
        let textures_dirty = Rc::new(Cell::new(true));
        let flag = Rc::clone(&textures_dirty);
        let sub_surface = SubSurfaceConfiguration::new(move || flag.set(true));

        let mut uniform_buffer = UniformBuffer::new(use_ubo);
        SubSurfaceConfiguration::prepare_uniform_buffer(&mut uniform_buffer);

        let name = name.into();
        log::debug!(
            "Created material '{name}' with a {} byte subsurface block",
            uniform_buffer.size_in_bytes()
        );

        Self {
            name,
            sub_surface,
            defines: SubSurfaceDefines::new(),
            uniform_buffer,
            textures_dirty,
            is_frozen: false,
            lod_based_microsurface: true,
        }
    }

    /// Material name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Subsurface parameters
    pub fn sub_surface(&self) -> &SubSurfaceConfiguration {
        &self.sub_surface
    }

    /// Subsurface parameters, for editing
    pub fn sub_surface_mut(&mut self) -> &mut SubSurfaceConfiguration {
        &mut self.sub_surface
    }

    /// Defines derived by the last successful [`is_ready`](Self::is_ready)
    pub fn defines(&self) -> &SubSurfaceDefines {
        &self.defines
    }

    /// Uniform buffer backing this material
    pub fn uniform_buffer(&self) -> &UniformBuffer {
        &self.uniform_buffer
    }

    /// True when a parameter changed since defines were last derived
    pub fn is_dirty(&self) -> bool {
        self.textures_dirty.get() || self.defines.textures_dirty
    }

    /// Whether uniform values are frozen
    pub fn is_frozen(&self) -> bool {
        self.is_frozen
    }

    /// Stop re-uploading uniform values while the buffer is in sync
    pub fn freeze(&mut self) {
        self.is_frozen = true;
    }

    /// Resume uploading uniform values every frame
    pub fn unfreeze(&mut self) {
        self.is_frozen = false;
        self.textures_dirty.set(true);
    }

    /// Sample refraction through one LOD-aware sampler instead of three
    pub fn set_lod_based_microsurface(&mut self, enabled: bool) {
        if self.lod_based_microsurface != enabled {
            self.lod_based_microsurface = enabled;
            self.textures_dirty.set(true);
        }
    }

    /// Check textures and refresh defines for `scene`
    ///
    /// Returns false while a sampled texture is still loading; defines are
    /// left dirty so the next call retries.
    pub fn is_ready(&mut self, scene: &SceneContext) -> bool {
        if self.textures_dirty.replace(false) {
            self.defines.textures_dirty = true;
        }
        if !self.sub_surface.is_ready_for_sub_mesh(&self.defines, scene) {
            return false;
        }
        if self.defines.textures_dirty {
            self.defines.flags.remove(SubSurfaceFlags::UV);
            self.sub_surface.prepare_defines(&mut self.defines, scene);
            self.defines.textures_dirty = false;
            log::debug!(
                "Material '{}' defines: {:?}",
                self.name,
                self.defines.shader_defines()
            );
        }
        true
    }

    /// Optional defines to drop, lowest rank first, if compilation fails
    pub fn fallbacks(&self) -> EffectFallbacks {
        let mut fallbacks = EffectFallbacks::new();
        SubSurfaceConfiguration::add_fallbacks(&self.defines, &mut fallbacks, 0);
        fallbacks
    }

    /// Write uniforms and samplers for the next draw
    ///
    /// Returns the block contents when they need uploading.
    pub fn bind(&mut self, scene: &SceneContext) -> Option<&[u8]> {
        self.sub_surface.bind_for_sub_mesh(
            &mut self.uniform_buffer,
            scene,
            self.is_frozen,
            self.lod_based_microsurface,
        );
        self.uniform_buffer.update()
    }

    /// Release per-draw bindings on `effect`
    pub fn unbind(&self, effect: &mut Effect) -> bool {
        self.sub_surface.unbind(effect)
    }

    /// Alpha blending is replaced by refraction-driven transparency
    pub fn disable_alpha_blending(&self) -> bool {
        self.sub_surface.disable_alpha_blending()
    }

    /// Dispose the material and its subsurface block
    pub fn dispose(&mut self, force_dispose_textures: bool) {
        self.sub_surface.dispose(force_dispose_textures);
        log::debug!("Disposed material '{}'", self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::texture::{Texture, TextureDescriptor, TextureRef};
    use std::sync::Arc;

    #[test]
    fn test_defines_wait_for_textures() {
        crate::foundation::logging::init();
        let pending = Arc::new(Texture::pending(TextureDescriptor::new("thickness.png")));
        let handle: TextureRef = pending.clone();
        let scene = SceneContext::new();

        let mut material = PbrMaterial::new("glass", true);
        material.sub_surface_mut().set_translucency_enabled(true);
        material.sub_surface_mut().set_thickness_texture(Some(handle));

        assert!(!material.is_ready(&scene));
        assert!(material.is_dirty());

        pending.mark_ready();
        assert!(material.is_ready(&scene));
        assert!(!material.is_dirty());
        assert!(material.defines().contains(SubSurfaceFlags::SS_THICKNESSANDMASK_TEXTURE));
    }

    #[test]
    fn test_setter_redirties_defines() {
        let scene = SceneContext::new();
        let mut material = PbrMaterial::new("skin", true);
        assert!(material.is_ready(&scene));
        assert!(!material.defines().contains(SubSurfaceFlags::SUBSURFACE));

        material.sub_surface_mut().set_scattering_enabled(true);
        assert!(material.is_dirty());
        assert!(material.is_ready(&scene));
        assert!(material.defines().contains(SubSurfaceFlags::SS_SCATTERING));

        // Same value again is not a change
        material.sub_surface_mut().set_scattering_enabled(true);
        assert!(!material.is_dirty());
    }

    #[test]
    fn test_frozen_material_skips_uploads() {
        let scene = SceneContext::new();
        let mut material = PbrMaterial::new("jade", true);
        material.freeze();
        assert!(material.bind(&scene).is_some());

        material.sub_surface_mut().set_translucency_intensity(0.25);
        assert!(material.bind(&scene).is_none());
        assert_eq!(
            material.uniform_buffer().uniform("vSubSurfaceIntensity").unwrap(),
            &[1.0, 1.0, 1.0]
        );

        material.unfreeze();
        assert!(material.bind(&scene).is_some());
        assert_eq!(
            material.uniform_buffer().uniform("vSubSurfaceIntensity").unwrap(),
            &[1.0, 0.25, 1.0]
        );
        assert!(material.bind(&scene).is_none());
    }

    #[test]
    fn test_fallbacks_follow_defines() {
        let scene = SceneContext::new();
        let mut material = PbrMaterial::new("wax", false);
        material.sub_surface_mut().set_translucency_enabled(true);
        material.sub_surface_mut().set_scattering_enabled(true);
        assert!(material.is_ready(&scene));

        let mut fallbacks = material.fallbacks();
        let mut lines = material.defines().shader_defines();
        assert_eq!(fallbacks.reduce(&mut lines), Some(0));
        assert!(!lines.iter().any(|l| l == "#define SS_SCATTERING"));
        assert!(lines.iter().any(|l| l == "#define SS_TRANSLUCENCY"));
    }

    #[test]
    fn test_dispose_cascades() {
        let refraction = Arc::new(Texture::new(TextureDescriptor::new("rtt").as_render_target()));
        let handle: TextureRef = refraction.clone();

        let mut material = PbrMaterial::new("water", true);
        material.sub_surface_mut().set_refraction_enabled(true);
        material.sub_surface_mut().set_link_refraction_with_transparency(true);
        material.sub_surface_mut().set_refraction_texture(Some(handle.clone()));
        assert!(material.disable_alpha_blending());

        let mut effect = Effect::new("pbr");
        effect.set_texture("refractionSampler", Some(handle));
        assert!(material.unbind(&mut effect));

        material.dispose(false);
        assert!(!refraction.is_disposed());
        material.dispose(true);
        assert!(refraction.is_disposed());
    }

    #[test]
    fn test_removed_texture_drops_uv_defines() {
        let scene = SceneContext::new();
        let mut material = PbrMaterial::new("marble", true);
        material.sub_surface_mut().set_translucency_enabled(true);
        material
            .sub_surface_mut()
            .set_thickness_texture(Some(Texture::new(TextureDescriptor::new("t")).into_ref()));
        assert!(material.is_ready(&scene));
        assert!(material.defines().contains(SubSurfaceFlags::NEED_UVS));
        assert!(material.defines().contains(SubSurfaceFlags::MAINUV1));

        material.sub_surface_mut().set_thickness_texture(None);
        material.sub_surface_mut().set_translucency_enabled(false);
        assert!(material.is_ready(&scene));
        assert!(material.defines().shader_defines().is_empty());
        assert_eq!(material.defines().thickness_direct_uv, 0);
    }
}

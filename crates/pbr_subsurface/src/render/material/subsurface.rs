//! Subsurface, refraction and translucency parameters of a PBR material
//!
//! [`SubSurfaceConfiguration`] is owned by a PBR material and does three jobs
//! for it each frame:
//!
//! - reports whether its textures are ready ([`is_ready_for_sub_mesh`]),
//! - derives the subsurface shader defines ([`prepare_defines`]),
//! - writes its uniforms and binds its samplers ([`bind_for_sub_mesh`]).
//!
//! Every setter that changes a value calls the owner's dirty callback so the
//! owner knows to re-derive its defines.
//!
//! When refraction is enabled without an explicit refraction texture, the
//! scene environment texture is refracted instead.
//!
//! [`is_ready_for_sub_mesh`]: SubSurfaceConfiguration::is_ready_for_sub_mesh
//! [`prepare_defines`]: SubSurfaceConfiguration::prepare_defines
//! [`bind_for_sub_mesh`]: SubSurfaceConfiguration::bind_for_sub_mesh

use std::fmt;

use crate::error::{MaterialError, MaterialResult};
use crate::foundation::math::Color3;
use crate::render::effect::Effect;
use crate::render::scene::SceneContext;
use crate::render::texture::{
    same_texture, BaseTexture, LodLevel, TextureDescriptor, TextureLoader, TextureRef,
};
use crate::render::uniform_buffer::UniformBuffer;

use super::defines::{SubSurfaceDefines, SubSurfaceFlags};
use super::fallbacks::EffectFallbacks;
use super::flags::MaterialFlags;
use super::subsurface_data::SubSurfaceData;

/// Called whenever a parameter changes
pub type DirtyCallback = Box<dyn Fn()>;

/// Uniform names and float sizes declared by the subsurface block
pub const SUBSURFACE_UNIFORMS: [(&str, usize); 9] = [
    ("vRefractionMicrosurfaceInfos", 3),
    ("vRefractionInfos", 4),
    ("refractionMatrix", 16),
    ("vThicknessInfos", 2),
    ("thicknessMatrix", 16),
    ("vThicknessParam", 2),
    ("vDiffusionDistance", 3),
    ("vTintColor", 4),
    ("vSubSurfaceIntensity", 3),
];

/// Samplers declared by the subsurface block
pub const SUBSURFACE_SAMPLERS: [&str; 2] = ["thicknessSampler", "refractionSampler"];

const REFRACTION_SAMPLER_LOW: &str = "refractionSamplerLow";
const REFRACTION_SAMPLER_HIGH: &str = "refractionSamplerHigh";

fn assign<T: PartialEq>(slot: &mut T, value: T, mark_dirty: &dyn Fn()) {
    if *slot != value {
        *slot = value;
        mark_dirty();
    }
}

fn assign_texture(slot: &mut Option<TextureRef>, value: Option<TextureRef>, mark_dirty: &dyn Fn()) {
    let unchanged = match (slot.as_ref(), value.as_ref()) {
        (Some(current), Some(new)) => same_texture(current, new),
        (None, None) => true,
        _ => false,
    };
    if !unchanged {
        *slot = value;
        mark_dirty();
    }
}

/// Subsurface parameter block of one material
pub struct SubSurfaceConfiguration {
    is_refraction_enabled: bool,
    is_translucency_enabled: bool,
    is_scattering_enabled: bool,

    refraction_intensity: f32,
    translucency_intensity: f32,
    scattering_intensity: f32,

    thickness_texture: Option<TextureRef>,
    refraction_texture: Option<TextureRef>,

    index_of_refraction: f32,
    invert_refraction_y: bool,
    link_refraction_with_transparency: bool,

    minimum_thickness: f32,
    maximum_thickness: f32,

    tint_color: Color3,
    tint_color_at_distance: f32,
    diffusion_distance: Color3,

    use_mask_from_thickness_texture: bool,

    mark_dirty: DirtyCallback,
}

impl fmt::Debug for SubSurfaceConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubSurfaceConfiguration")
            .field("is_refraction_enabled", &self.is_refraction_enabled)
            .field("is_translucency_enabled", &self.is_translucency_enabled)
            .field("is_scattering_enabled", &self.is_scattering_enabled)
            .field("thickness_texture", &self.thickness_texture.as_ref().map(|t| t.name().to_string()))
            .field("refraction_texture", &self.refraction_texture.as_ref().map(|t| t.name().to_string()))
            .field("index_of_refraction", &self.index_of_refraction)
            .finish_non_exhaustive()
    }
}

impl SubSurfaceConfiguration {
    /// Name reported by [`class_name`](Self::class_name)
    pub const CLASS_NAME: &'static str = "PBRSubSurfaceConfiguration";

    /// Create a block with default parameters
    ///
    /// `mark_dirty` is invoked each time a setter changes a value.
    pub fn new(mark_dirty: impl Fn() + 'static) -> Self {
        let defaults = SubSurfaceData::default();
        Self {
            is_refraction_enabled: defaults.is_refraction_enabled,
            is_translucency_enabled: defaults.is_translucency_enabled,
            is_scattering_enabled: defaults.is_scattering_enabled,
            refraction_intensity: defaults.refraction_intensity,
            translucency_intensity: defaults.translucency_intensity,
            scattering_intensity: defaults.scattering_intensity,
            thickness_texture: None,
            refraction_texture: None,
            index_of_refraction: defaults.index_of_refraction,
            invert_refraction_y: defaults.invert_refraction_y,
            link_refraction_with_transparency: defaults.link_refraction_with_transparency,
            minimum_thickness: defaults.minimum_thickness,
            maximum_thickness: defaults.maximum_thickness,
            tint_color: defaults.tint_color,
            tint_color_at_distance: defaults.tint_color_at_distance,
            diffusion_distance: defaults.diffusion_distance,
            use_mask_from_thickness_texture: defaults.use_mask_from_thickness_texture,
            mark_dirty: Box::new(mark_dirty),
        }
    }

    // --- Enable flags -------------------------------------------------------

    /// Refraction through the volume is computed
    pub fn is_refraction_enabled(&self) -> bool {
        self.is_refraction_enabled
    }

    /// Enable or disable refraction
    pub fn set_refraction_enabled(&mut self, enabled: bool) {
        assign(&mut self.is_refraction_enabled, enabled, &*self.mark_dirty);
    }

    /// Light transmitted through thin parts is computed
    pub fn is_translucency_enabled(&self) -> bool {
        self.is_translucency_enabled
    }

    /// Enable or disable translucency
    pub fn set_translucency_enabled(&mut self, enabled: bool) {
        assign(&mut self.is_translucency_enabled, enabled, &*self.mark_dirty);
    }

    /// Subsurface scattering is computed
    pub fn is_scattering_enabled(&self) -> bool {
        self.is_scattering_enabled
    }

    /// Enable or disable scattering
    pub fn set_scattering_enabled(&mut self, enabled: bool) {
        assign(&mut self.is_scattering_enabled, enabled, &*self.mark_dirty);
    }

    // --- Intensities --------------------------------------------------------

    /// Refraction intensity
    pub fn refraction_intensity(&self) -> f32 {
        self.refraction_intensity
    }

    /// Set refraction intensity
    pub fn set_refraction_intensity(&mut self, value: f32) {
        assign(&mut self.refraction_intensity, value, &*self.mark_dirty);
    }

    /// Translucency intensity
    pub fn translucency_intensity(&self) -> f32 {
        self.translucency_intensity
    }

    /// Set translucency intensity
    pub fn set_translucency_intensity(&mut self, value: f32) {
        assign(&mut self.translucency_intensity, value, &*self.mark_dirty);
    }

    /// Scattering intensity
    pub fn scattering_intensity(&self) -> f32 {
        self.scattering_intensity
    }

    /// Set scattering intensity
    pub fn set_scattering_intensity(&mut self, value: f32) {
        assign(&mut self.scattering_intensity, value, &*self.mark_dirty);
    }

    // --- Textures -----------------------------------------------------------

    /// Thickness texture; R holds thickness, A an optional mask
    pub fn thickness_texture(&self) -> Option<&TextureRef> {
        self.thickness_texture.as_ref()
    }

    /// Set or clear the thickness texture
    pub fn set_thickness_texture(&mut self, texture: Option<TextureRef>) {
        assign_texture(&mut self.thickness_texture, texture, &*self.mark_dirty);
    }

    /// Explicit refraction texture, without the environment fallback
    pub fn refraction_texture(&self) -> Option<&TextureRef> {
        self.refraction_texture.as_ref()
    }

    /// Set or clear the explicit refraction texture
    pub fn set_refraction_texture(&mut self, texture: Option<TextureRef>) {
        assign_texture(&mut self.refraction_texture, texture, &*self.mark_dirty);
    }

    /// Texture actually refracted in `scene`
    ///
    /// The explicit refraction texture wins; otherwise the scene environment
    /// is used, but only while refraction is enabled.
    pub fn refraction_texture_for(&self, scene: &SceneContext) -> Option<TextureRef> {
        if let Some(texture) = &self.refraction_texture {
            return Some(texture.clone());
        }
        if self.is_refraction_enabled {
            return scene.environment_texture.clone();
        }
        None
    }

    // --- Optical parameters -------------------------------------------------

    /// Index of refraction of the volume
    pub fn index_of_refraction(&self) -> f32 {
        self.index_of_refraction
    }

    /// Set the index of refraction
    pub fn set_index_of_refraction(&mut self, value: f32) {
        assign(&mut self.index_of_refraction, value, &*self.mark_dirty);
    }

    /// Refraction lookups are flipped vertically
    pub fn invert_refraction_y(&self) -> bool {
        self.invert_refraction_y
    }

    /// Flip refraction lookups vertically
    pub fn set_invert_refraction_y(&mut self, invert: bool) {
        assign(&mut self.invert_refraction_y, invert, &*self.mark_dirty);
    }

    /// Refraction intensity drives the material's transparency
    pub fn link_refraction_with_transparency(&self) -> bool {
        self.link_refraction_with_transparency
    }

    /// Drive transparency from refraction intensity
    pub fn set_link_refraction_with_transparency(&mut self, link: bool) {
        assign(&mut self.link_refraction_with_transparency, link, &*self.mark_dirty);
    }

    /// Thickness mapped to 0 in the thickness texture
    pub fn minimum_thickness(&self) -> f32 {
        self.minimum_thickness
    }

    /// Set the minimum thickness
    pub fn set_minimum_thickness(&mut self, value: f32) {
        assign(&mut self.minimum_thickness, value, &*self.mark_dirty);
    }

    /// Thickness mapped to 1 in the thickness texture
    pub fn maximum_thickness(&self) -> f32 {
        self.maximum_thickness
    }

    /// Set the maximum thickness
    pub fn set_maximum_thickness(&mut self, value: f32) {
        assign(&mut self.maximum_thickness, value, &*self.mark_dirty);
    }

    /// Use the thickness texture alpha as a translucency/refraction mask
    pub fn use_mask_from_thickness_texture(&self) -> bool {
        self.use_mask_from_thickness_texture
    }

    /// Toggle masking from the thickness texture
    pub fn set_use_mask_from_thickness_texture(&mut self, value: bool) {
        assign(&mut self.use_mask_from_thickness_texture, value, &*self.mark_dirty);
    }

    // --- Colors -------------------------------------------------------------

    /// Color light is tinted towards while crossing the volume
    pub fn tint_color(&self) -> Color3 {
        self.tint_color
    }

    /// Set the tint color
    pub fn set_tint_color(&mut self, color: Color3) {
        assign(&mut self.tint_color, color, &*self.mark_dirty);
    }

    /// Distance at which light is fully tinted
    pub fn tint_color_at_distance(&self) -> f32 {
        self.tint_color_at_distance
    }

    /// Set the tint distance
    pub fn set_tint_color_at_distance(&mut self, distance: f32) {
        assign(&mut self.tint_color_at_distance, distance, &*self.mark_dirty);
    }

    /// Per-channel scattering distance
    pub fn diffusion_distance(&self) -> Color3 {
        self.diffusion_distance
    }

    /// Set the scattering distance
    pub fn set_diffusion_distance(&mut self, color: Color3) {
        assign(&mut self.diffusion_distance, color, &*self.mark_dirty);
    }

    // --- Per-frame ----------------------------------------------------------

    fn any_enabled(&self) -> bool {
        self.is_refraction_enabled || self.is_translucency_enabled || self.is_scattering_enabled
    }

    fn active_thickness_texture(&self, flags: &MaterialFlags) -> Option<&TextureRef> {
        self.thickness_texture
            .as_ref()
            .filter(|_| flags.thickness_texture_enabled)
    }

    fn active_refraction_texture(&self, scene: &SceneContext) -> Option<TextureRef> {
        self.refraction_texture_for(scene)
            .filter(|_| scene.material_flags.refraction_texture_enabled)
    }

    /// False while a texture the current variant samples is still loading
    pub fn is_ready_for_sub_mesh(&self, defines: &SubSurfaceDefines, scene: &SceneContext) -> bool {
        if !defines.textures_dirty || !scene.textures_enabled {
            return true;
        }
        if let Some(thickness) = self.active_thickness_texture(&scene.material_flags) {
            if !thickness.is_ready_or_not_blocking() {
                return false;
            }
        }
        if let Some(refraction) = self.active_refraction_texture(scene) {
            if !refraction.is_ready_or_not_blocking() {
                return false;
            }
        }
        true
    }

    /// Derive the subsurface defines for `scene`
    ///
    /// Does nothing unless `defines.textures_dirty` is set. Clearing the dirty
    /// flag is left to the owning material, which prepares other features
    /// from the same state.
    pub fn prepare_defines(&self, defines: &mut SubSurfaceDefines, scene: &SceneContext) {
        if !defines.textures_dirty {
            return;
        }

        defines.flags.remove(SubSurfaceFlags::OWNED);
        defines.thickness_direct_uv = 0;
        defines.set(SubSurfaceFlags::SS_TRANSLUCENCY, self.is_translucency_enabled);
        defines.set(SubSurfaceFlags::SS_SCATTERING, self.is_scattering_enabled);

        if !self.any_enabled() {
            return;
        }
        defines.set(SubSurfaceFlags::SUBSURFACE, true);

        if !scene.textures_enabled {
            return;
        }

        if let Some(thickness) = self.active_thickness_texture(&scene.material_flags) {
            defines.prepare_for_merged_uv(thickness.as_ref(), SubSurfaceFlags::SS_THICKNESSANDMASK_TEXTURE);
        }
        defines.set(
            SubSurfaceFlags::SS_MASK_FROM_THICKNESS_TEXTURE,
            self.use_mask_from_thickness_texture,
        );

        if !self.is_refraction_enabled {
            return;
        }
        if let Some(refraction) = self.active_refraction_texture(scene) {
            defines.set(SubSurfaceFlags::SS_REFRACTION, true);
            defines.set(SubSurfaceFlags::SS_REFRACTIONMAP_3D, refraction.is_cube());
            defines.set(SubSurfaceFlags::SS_GAMMAREFRACTION, refraction.gamma_space());
            defines.set(SubSurfaceFlags::SS_RGBDREFRACTION, refraction.is_rgbd());
            defines.set(SubSurfaceFlags::SS_LINEARSPECULARREFRACTION, refraction.linear_specular_lod());
            defines.set(SubSurfaceFlags::SS_REFRACTIONMAP_OPPOSITEZ, refraction.invert_z());
            defines.set(SubSurfaceFlags::SS_LODINREFRACTIONALPHA, refraction.lod_level_in_alpha());
            defines.set(
                SubSurfaceFlags::SS_LINKREFRACTIONTOTRANSPARENCY,
                self.link_refraction_with_transparency,
            );
        }
    }

    /// Write uniforms and bind samplers for the next draw
    ///
    /// Uniform values are skipped when the buffer is a UBO that is already in
    /// sync and the material is frozen. Samplers are always rebound.
    /// `lod_based_microsurface` selects a single LOD-aware refraction sampler
    /// over the low/mid/high pre-filtered ones.
    pub fn bind_for_sub_mesh(
        &self,
        uniform_buffer: &mut UniformBuffer,
        scene: &SceneContext,
        is_frozen: bool,
        lod_based_microsurface: bool,
    ) {
        let thickness = self.active_thickness_texture(&scene.material_flags).cloned();
        let refraction = self.active_refraction_texture(scene);

        if !uniform_buffer.use_ubo() || !is_frozen || !uniform_buffer.is_sync() {
            if let Some(thickness) = &thickness {
                uniform_buffer.update_float2(
                    "vThicknessInfos",
                    thickness.coordinates_index() as f32,
                    thickness.level(),
                );
                uniform_buffer.update_matrix("thicknessMatrix", &thickness.texture_matrix());
            }

            uniform_buffer.update_float2(
                "vThicknessParam",
                self.minimum_thickness,
                self.maximum_thickness - self.minimum_thickness,
            );

            if let Some(refraction) = &refraction {
                uniform_buffer.update_matrix("refractionMatrix", &refraction.reflection_texture_matrix());

                let depth = if refraction.is_cube() {
                    1.0
                } else {
                    refraction.depth().filter(|d| *d > 0).map_or(1.0, |d| d as f32)
                };
                uniform_buffer.update_float4(
                    "vRefractionInfos",
                    refraction.level(),
                    1.0 / self.index_of_refraction,
                    depth,
                    if self.invert_refraction_y { -1.0 } else { 1.0 },
                );
                uniform_buffer.update_float3(
                    "vRefractionMicrosurfaceInfos",
                    refraction.size().width as f32,
                    refraction.lod_generation_scale(),
                    refraction.lod_generation_offset(),
                );
            }

            uniform_buffer.update_color3("vDiffusionDistance", self.diffusion_distance);
            uniform_buffer.update_float4(
                "vTintColor",
                self.tint_color.r,
                self.tint_color.g,
                self.tint_color.b,
                self.tint_color_at_distance,
            );
            uniform_buffer.update_float3(
                "vSubSurfaceIntensity",
                self.refraction_intensity,
                self.translucency_intensity,
                self.scattering_intensity,
            );
        }

        // Block samplers without a texture this frame are cleared
        let (mut thickness_sampler, mut refraction_sampler, mut low, mut high) = (None, None, None, None);
        if scene.textures_enabled {
            thickness_sampler = thickness;
            if let Some(refraction) = refraction {
                if lod_based_microsurface {
                    refraction_sampler = Some(refraction);
                } else {
                    let lod = |level| refraction.lod_texture(level).unwrap_or_else(|| refraction.clone());
                    refraction_sampler = Some(lod(LodLevel::Mid));
                    low = Some(lod(LodLevel::Low));
                    high = Some(lod(LodLevel::High));
                }
            }
        }
        uniform_buffer.set_texture("thicknessSampler", thickness_sampler);
        uniform_buffer.set_texture("refractionSampler", refraction_sampler);
        uniform_buffer.set_texture(REFRACTION_SAMPLER_LOW, low);
        uniform_buffer.set_texture(REFRACTION_SAMPLER_HIGH, high);
        log::trace!("Bound subsurface block (frozen: {is_frozen})");
    }

    /// Release per-draw bindings after rendering
    ///
    /// Render-target refraction textures are unbound so they can be rendered
    /// into next frame. Returns true when a sampler was cleared.
    pub fn unbind(&self, active_effect: &mut Effect) -> bool {
        match &self.refraction_texture {
            Some(texture) if texture.is_render_target() => {
                active_effect.set_texture("refractionSampler", None);
                true
            }
            _ => false,
        }
    }

    /// Alpha blending is replaced by refraction-driven transparency
    pub fn disable_alpha_blending(&self) -> bool {
        self.is_refraction_enabled && self.link_refraction_with_transparency
    }

    /// Collect render targets that must be rendered before this material
    pub fn fill_render_target_textures(&self, flags: &MaterialFlags, render_targets: &mut Vec<TextureRef>) {
        if let Some(texture) = self.render_target_refraction(flags) {
            render_targets.push(texture.clone());
        }
    }

    /// True when [`fill_render_target_textures`](Self::fill_render_target_textures) would add anything
    pub fn has_render_target_textures(&self, flags: &MaterialFlags) -> bool {
        self.render_target_refraction(flags).is_some()
    }

    fn render_target_refraction(&self, flags: &MaterialFlags) -> Option<&TextureRef> {
        self.refraction_texture
            .as_ref()
            .filter(|t| flags.refraction_texture_enabled && t.is_render_target())
    }

    /// True when `texture` is referenced by this block
    pub fn has_texture(&self, texture: &TextureRef) -> bool {
        [&self.thickness_texture, &self.refraction_texture]
            .into_iter()
            .flatten()
            .any(|t| same_texture(t, texture))
    }

    /// Append the textures referenced by this block
    pub fn get_active_textures(&self, active_textures: &mut Vec<TextureRef>) {
        active_textures.extend(self.thickness_texture.iter().cloned());
        active_textures.extend(self.refraction_texture.iter().cloned());
    }

    /// Append the referenced textures that carry animations
    pub fn get_animatables(&self, animatables: &mut Vec<TextureRef>) {
        animatables.extend(
            [&self.thickness_texture, &self.refraction_texture]
                .into_iter()
                .flatten()
                .filter(|t| t.has_animations())
                .cloned(),
        );
    }

    /// Dispose the block
    ///
    /// Referenced textures are shared and only disposed when
    /// `force_dispose_textures` is set.
    pub fn dispose(&mut self, force_dispose_textures: bool) {
        if force_dispose_textures {
            if let Some(texture) = &self.thickness_texture {
                texture.dispose();
            }
            if let Some(texture) = &self.refraction_texture {
                texture.dispose();
            }
        }
        log::debug!("Disposed subsurface block (textures forced: {force_dispose_textures})");
    }

    /// Type name used in serialized scenes
    pub fn class_name(&self) -> &'static str {
        Self::CLASS_NAME
    }

    // --- Static helpers -----------------------------------------------------

    /// Register the optional subsurface defines as compile fallbacks
    ///
    /// Scattering goes first, then translucency. Returns the next free rank.
    pub fn add_fallbacks(defines: &SubSurfaceDefines, fallbacks: &mut EffectFallbacks, mut current_rank: u32) -> u32 {
        if defines.contains(SubSurfaceFlags::SS_SCATTERING) {
            fallbacks.add_fallback(current_rank, "SS_SCATTERING");
            current_rank += 1;
        }
        if defines.contains(SubSurfaceFlags::SS_TRANSLUCENCY) {
            fallbacks.add_fallback(current_rank, "SS_TRANSLUCENCY");
            current_rank += 1;
        }
        current_rank
    }

    /// Append the uniform names used by the subsurface block
    pub fn add_uniforms(uniforms: &mut Vec<String>) {
        uniforms.extend(SUBSURFACE_UNIFORMS.iter().map(|(name, _)| (*name).to_string()));
    }

    /// Append the sampler names used by the subsurface block
    pub fn add_samplers(samplers: &mut Vec<String>) {
        samplers.extend(SUBSURFACE_SAMPLERS.iter().map(|name| (*name).to_string()));
    }

    /// Declare the subsurface uniforms in `uniform_buffer`
    pub fn prepare_uniform_buffer(uniform_buffer: &mut UniformBuffer) {
        for (name, size) in SUBSURFACE_UNIFORMS {
            uniform_buffer.add_uniform(name, size);
        }
    }

    // --- Persistence --------------------------------------------------------

    /// Copy every parameter into `target`, sharing texture references
    pub fn copy_to(&self, target: &mut Self) {
        target.set_refraction_enabled(self.is_refraction_enabled);
        target.set_translucency_enabled(self.is_translucency_enabled);
        target.set_scattering_enabled(self.is_scattering_enabled);
        target.set_refraction_intensity(self.refraction_intensity);
        target.set_translucency_intensity(self.translucency_intensity);
        target.set_scattering_intensity(self.scattering_intensity);
        target.set_thickness_texture(self.thickness_texture.clone());
        target.set_refraction_texture(self.refraction_texture.clone());
        target.set_index_of_refraction(self.index_of_refraction);
        target.set_invert_refraction_y(self.invert_refraction_y);
        target.set_link_refraction_with_transparency(self.link_refraction_with_transparency);
        target.set_minimum_thickness(self.minimum_thickness);
        target.set_maximum_thickness(self.maximum_thickness);
        target.set_tint_color(self.tint_color);
        target.set_tint_color_at_distance(self.tint_color_at_distance);
        target.set_diffusion_distance(self.diffusion_distance);
        target.set_use_mask_from_thickness_texture(self.use_mask_from_thickness_texture);
    }

    /// Snapshot the parameters as plain data
    pub fn serialize(&self) -> SubSurfaceData {
        SubSurfaceData {
            is_refraction_enabled: self.is_refraction_enabled,
            is_translucency_enabled: self.is_translucency_enabled,
            is_scattering_enabled: self.is_scattering_enabled,
            refraction_intensity: self.refraction_intensity,
            translucency_intensity: self.translucency_intensity,
            scattering_intensity: self.scattering_intensity,
            thickness_texture: self.thickness_texture.as_ref().map(|t| t.descriptor().clone()),
            refraction_texture: self.refraction_texture.as_ref().map(|t| t.descriptor().clone()),
            index_of_refraction: self.index_of_refraction,
            invert_refraction_y: self.invert_refraction_y,
            link_refraction_with_transparency: self.link_refraction_with_transparency,
            minimum_thickness: self.minimum_thickness,
            maximum_thickness: self.maximum_thickness,
            tint_color: self.tint_color,
            tint_color_at_distance: self.tint_color_at_distance,
            diffusion_distance: self.diffusion_distance,
            use_mask_from_thickness_texture: self.use_mask_from_thickness_texture,
        }
    }

    /// Restore parameters from plain data
    ///
    /// Textures the loader cannot resolve are logged and left empty.
    pub fn parse(&mut self, source: &SubSurfaceData, loader: &dyn TextureLoader, root_url: &str) {
        let _ = self.parse_with(source, loader, root_url, false);
    }

    /// Restore parameters from plain data, failing on unresolved textures
    ///
    /// Scalar parameters are applied even when a texture fails to resolve.
    /// Every unresolved texture is logged; the error names the first one.
    pub fn try_parse(&mut self, source: &SubSurfaceData, loader: &dyn TextureLoader, root_url: &str) -> MaterialResult<()> {
        self.parse_with(source, loader, root_url, true)
    }

    fn parse_with(
        &mut self,
        source: &SubSurfaceData,
        loader: &dyn TextureLoader,
        root_url: &str,
        strict: bool,
    ) -> MaterialResult<()> {
        let mut first_error = None;
        let mut resolve = |slot: &'static str, descriptor: &Option<TextureDescriptor>| -> Option<TextureRef> {
            let descriptor = descriptor.as_ref()?;
            let texture = loader.load(descriptor, root_url);
            if texture.is_none() {
                let err = MaterialError::UnresolvedTexture {
                    slot,
                    name: descriptor.name.clone(),
                };
                log::warn!("{err}");
                if strict && first_error.is_none() {
                    first_error = Some(err);
                }
            }
            texture
        };
        let thickness = resolve("thicknessTexture", &source.thickness_texture);
        let refraction = resolve("refractionTexture", &source.refraction_texture);

        self.set_refraction_enabled(source.is_refraction_enabled);
        self.set_translucency_enabled(source.is_translucency_enabled);
        self.set_scattering_enabled(source.is_scattering_enabled);
        self.set_refraction_intensity(source.refraction_intensity);
        self.set_translucency_intensity(source.translucency_intensity);
        self.set_scattering_intensity(source.scattering_intensity);
        self.set_thickness_texture(thickness);
        self.set_refraction_texture(refraction);
        self.set_index_of_refraction(source.index_of_refraction);
        self.set_invert_refraction_y(source.invert_refraction_y);
        self.set_link_refraction_with_transparency(source.link_refraction_with_transparency);
        self.set_minimum_thickness(source.minimum_thickness);
        self.set_maximum_thickness(source.maximum_thickness);
        self.set_tint_color(source.tint_color);
        self.set_tint_color_at_distance(source.tint_color_at_distance);
        self.set_diffusion_distance(source.diffusion_distance);
        self.set_use_mask_from_thickness_texture(source.use_mask_from_thickness_texture);

        log::debug!("Parsed subsurface block (refraction: {})", self.is_refraction_enabled);
        first_error.map_or(Ok(()), Err)
    }
}

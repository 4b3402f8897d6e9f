//! Shader variant flags owned by the subsurface feature
//!
//! Each flag maps to a `#define` in the PBR shader. The set, together with the
//! direct-UV index, selects which compiled variant a material uses.

use bitflags::bitflags;

use crate::foundation::math::Mat4Ext;
use crate::render::texture::BaseTexture;

bitflags! {
    /// Boolean shader defines touched by subsurface preparation
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SubSurfaceFlags: u32 {
        /// Any subsurface effect is active
        const SUBSURFACE = 1 << 0;
        /// Translucency is active
        const SS_TRANSLUCENCY = 1 << 1;
        /// Scattering is active
        const SS_SCATTERING = 1 << 2;
        /// A thickness (and mask) texture is sampled
        const SS_THICKNESSANDMASK_TEXTURE = 1 << 3;
        /// The thickness texture alpha is used as a mask
        const SS_MASK_FROM_THICKNESS_TEXTURE = 1 << 4;
        /// A refraction texture is sampled
        const SS_REFRACTION = 1 << 5;
        /// The refraction texture is a cube map
        const SS_REFRACTIONMAP_3D = 1 << 6;
        /// The refraction texture is in gamma space
        const SS_GAMMAREFRACTION = 1 << 7;
        /// The refraction texture is RGBD encoded
        const SS_RGBDREFRACTION = 1 << 8;
        /// The refraction texture uses linear specular LOD
        const SS_LINEARSPECULARREFRACTION = 1 << 9;
        /// The refraction cube map Z axis is inverted
        const SS_REFRACTIONMAP_OPPOSITEZ = 1 << 10;
        /// The refraction LOD is stored in alpha
        const SS_LODINREFRACTIONALPHA = 1 << 11;
        /// Refraction intensity drives material transparency
        const SS_LINKREFRACTIONTOTRANSPARENCY = 1 << 12;
        /// Mesh UVs are needed by some sampled texture
        const NEED_UVS = 1 << 13;
        /// UV set 1 is sampled directly
        const MAINUV1 = 1 << 14;
        /// UV set 2 is sampled directly
        const MAINUV2 = 1 << 15;
    }
}

impl SubSurfaceFlags {
    /// UV flags shared with other material features
    ///
    /// Reset by the owning material before any feature prepares its defines.
    pub const UV: Self = Self::NEED_UVS.union(Self::MAINUV1).union(Self::MAINUV2);

    /// Flags reset at the start of every subsurface preparation
    pub const OWNED: Self = Self::all().difference(Self::UV);
}

/// Define state for one material variant
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubSurfaceDefines {
    /// Active boolean defines
    pub flags: SubSurfaceFlags,
    /// UV set (1-based) sampled directly for thickness, 0 when a matrix is applied
    pub thickness_direct_uv: u32,
    /// Textures changed since the defines were last prepared
    pub textures_dirty: bool,
}

impl SubSurfaceDefines {
    /// Fresh defines that need a full preparation pass
    pub fn new() -> Self {
        Self {
            flags: SubSurfaceFlags::empty(),
            thickness_direct_uv: 0,
            textures_dirty: true,
        }
    }

    /// Check a flag
    pub fn contains(&self, flag: SubSurfaceFlags) -> bool {
        self.flags.contains(flag)
    }

    /// Set or clear a flag
    pub fn set(&mut self, flag: SubSurfaceFlags, value: bool) {
        self.flags.set(flag, value);
    }

    /// Mark `flag` as a sampled texture and record how its UVs are addressed
    ///
    /// When the texture's UV transform is the identity the shader samples the
    /// mesh UV set directly, skipping the matrix multiply.
    pub fn prepare_for_merged_uv(&mut self, texture: &dyn BaseTexture, flag: SubSurfaceFlags) {
        self.flags.insert(SubSurfaceFlags::NEED_UVS | flag);
        if texture.texture_matrix().is_identity_as_3x2() {
            self.thickness_direct_uv = texture.coordinates_index() + 1;
            if texture.coordinates_index() == 0 {
                self.flags.insert(SubSurfaceFlags::MAINUV1);
            } else {
                self.flags.insert(SubSurfaceFlags::MAINUV2);
            }
        } else {
            self.thickness_direct_uv = 0;
        }
    }

    /// Preprocessor lines for the active defines, in a stable order
    pub fn shader_defines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .flags
            .iter_names()
            .map(|(name, _)| format!("#define {name}"))
            .collect();
        if self.flags.contains(SubSurfaceFlags::SS_THICKNESSANDMASK_TEXTURE) {
            lines.push(format!(
                "#define SS_THICKNESSANDMASK_TEXTUREDIRECTUV {}",
                self.thickness_direct_uv
            ));
        }
        lines
    }
}

impl Default for SubSurfaceDefines {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::texture::{Texture, TextureDescriptor};

    #[test]
    fn test_owned_excludes_uv_flags() {
        assert!(!SubSurfaceFlags::OWNED.intersects(SubSurfaceFlags::UV));
        assert!(SubSurfaceFlags::UV.contains(SubSurfaceFlags::MAINUV2));
        assert!(SubSurfaceFlags::OWNED.contains(SubSurfaceFlags::SS_REFRACTION));
    }

    #[test]
    fn test_merged_uv_direct_second_set() {
        let tex = Texture::new(TextureDescriptor::new("t").with_coordinates_index(1));
        let mut defines = SubSurfaceDefines::new();
        defines.prepare_for_merged_uv(&tex, SubSurfaceFlags::SS_THICKNESSANDMASK_TEXTURE);
        assert_eq!(defines.thickness_direct_uv, 2);
        assert!(defines.contains(SubSurfaceFlags::MAINUV2));
        assert!(defines.contains(SubSurfaceFlags::NEED_UVS));
    }

    #[test]
    fn test_merged_uv_with_matrix() {
        let tex = Texture::new(TextureDescriptor::new("t").with_uv_transform([2.0, 2.0], [0.0, 0.0], 0.0));
        let mut defines = SubSurfaceDefines::new();
        defines.thickness_direct_uv = 5;
        defines.prepare_for_merged_uv(&tex, SubSurfaceFlags::SS_THICKNESSANDMASK_TEXTURE);
        assert_eq!(defines.thickness_direct_uv, 0);
        assert!(!defines.contains(SubSurfaceFlags::MAINUV1));
    }

    #[test]
    fn test_shader_defines_order() {
        let mut defines = SubSurfaceDefines::new();
        defines.set(SubSurfaceFlags::SS_REFRACTION, true);
        defines.set(SubSurfaceFlags::SUBSURFACE, true);
        assert_eq!(
            defines.shader_defines(),
            vec!["#define SUBSURFACE".to_string(), "#define SS_REFRACTION".to_string()]
        );
    }
}

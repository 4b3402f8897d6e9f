//! Plain-object form of the subsurface parameter block
//!
//! This is what gets written to scene files. Texture slots are stored as
//! [`TextureDescriptor`]s and resolved again through a
//! [`TextureLoader`](crate::render::texture::TextureLoader) when parsed.

use serde::{Deserialize, Serialize};

use crate::error::{MaterialError, MaterialResult};
use crate::foundation::math::Color3;
use crate::render::texture::TextureDescriptor;

/// Serializable snapshot of a [`SubSurfaceConfiguration`](super::SubSurfaceConfiguration)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubSurfaceData {
    /// Refraction enabled
    pub is_refraction_enabled: bool,
    /// Translucency enabled
    pub is_translucency_enabled: bool,
    /// Scattering enabled
    pub is_scattering_enabled: bool,
    /// Refraction intensity
    pub refraction_intensity: f32,
    /// Translucency intensity
    pub translucency_intensity: f32,
    /// Scattering intensity
    pub scattering_intensity: f32,
    /// Thickness (and mask) texture
    pub thickness_texture: Option<TextureDescriptor>,
    /// Explicit refraction texture
    pub refraction_texture: Option<TextureDescriptor>,
    /// Index of refraction
    pub index_of_refraction: f32,
    /// Flip refraction lookups vertically
    pub invert_refraction_y: bool,
    /// Refraction intensity drives transparency
    pub link_refraction_with_transparency: bool,
    /// Thickness mapped to 0 in the thickness texture
    pub minimum_thickness: f32,
    /// Thickness mapped to 1 in the thickness texture
    pub maximum_thickness: f32,
    /// Volume tint color
    pub tint_color: Color3,
    /// Distance at which the tint color is reached
    pub tint_color_at_distance: f32,
    /// Per-channel scattering distance
    pub diffusion_distance: Color3,
    /// Use thickness texture alpha as a mask
    pub use_mask_from_thickness_texture: bool,
}

impl Default for SubSurfaceData {
    fn default() -> Self {
        Self {
            is_refraction_enabled: false,
            is_translucency_enabled: false,
            is_scattering_enabled: false,
            refraction_intensity: 1.0,
            translucency_intensity: 1.0,
            scattering_intensity: 1.0,
            thickness_texture: None,
            refraction_texture: None,
            index_of_refraction: 1.5,
            invert_refraction_y: false,
            link_refraction_with_transparency: false,
            minimum_thickness: 0.0,
            maximum_thickness: 1.0,
            tint_color: Color3::white(),
            tint_color_at_distance: 1.0,
            diffusion_distance: Color3::white(),
            use_mask_from_thickness_texture: false,
        }
    }
}

impl SubSurfaceData {
    /// Render as pretty RON
    pub fn to_ron_string(&self) -> MaterialResult<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| MaterialError::Serialize(e.to_string()))
    }

    /// Parse from RON text
    pub fn from_ron_str(text: &str) -> MaterialResult<Self> {
        ron::from_str(text).map_err(|e| MaterialError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let data = SubSurfaceData::from_ron_str("(isRefractionEnabled: true, indexOfRefraction: 1.33)").unwrap();
        assert!(data.is_refraction_enabled);
        assert_eq!(data.index_of_refraction, 1.33);
        assert_eq!(data.maximum_thickness, 1.0);
        assert_eq!(data.tint_color, Color3::white());
    }

    #[test]
    fn test_malformed_text_is_parse_error() {
        assert!(matches!(
            SubSurfaceData::from_ron_str("(isRefractionEnabled: 3"),
            Err(MaterialError::Parse(_))
        ));
    }
}

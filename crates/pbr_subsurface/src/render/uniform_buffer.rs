//! CPU-side uniform buffer with std140 packing
//!
//! Material features declare their uniforms once, then write values by name
//! every frame. The buffer tracks whether its contents changed since the last
//! upload so frozen materials can skip redundant writes, and records which
//! texture is bound to each sampler.
//!
//! # Layout
//!
//! Offsets are counted in 32-bit floats. Scalars and `vec2` align to their own
//! size, everything larger aligns to 4 floats (16 bytes). A scalar may pack into
//! the padding after a `vec3`. The total size is rounded up to 16 bytes.

use std::collections::{BTreeMap, HashMap};

use crate::foundation::math::{Color3, Mat4, Mat4Ext};
use crate::render::texture::TextureRef;

/// Location of a named uniform inside the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformSlot {
    /// Offset in floats
    pub offset: usize,
    /// Size in floats
    pub size: usize,
}

/// Named uniform storage plus sampler bindings for one material
#[derive(Debug, Clone)]
pub struct UniformBuffer {
    use_ubo: bool,
    slots: HashMap<String, UniformSlot>,
    order: Vec<String>,
    cursor: usize,
    data: Vec<f32>,
    is_sync: bool,
    samplers: BTreeMap<String, TextureRef>,
}

impl UniformBuffer {
    /// Create an empty buffer
    ///
    /// `use_ubo` is false on backends that set uniforms individually instead of
    /// uploading a block; such buffers never skip updates for frozen materials.
    pub fn new(use_ubo: bool) -> Self {
        Self {
            use_ubo,
            slots: HashMap::new(),
            order: Vec::new(),
            cursor: 0,
            data: Vec::new(),
            is_sync: false,
            samplers: BTreeMap::new(),
        }
    }

    /// Whether values are uploaded as a single uniform block
    pub fn use_ubo(&self) -> bool {
        self.use_ubo
    }

    /// True when the GPU copy matches the CPU contents
    pub fn is_sync(&self) -> bool {
        self.is_sync
    }

    /// Declare a uniform of `size` floats
    ///
    /// Declaring the same name twice keeps the first slot.
    pub fn add_uniform(&mut self, name: &str, size: usize) {
        if self.slots.contains_key(name) {
            return;
        }
        let alignment = if size <= 2 { size.max(1) } else { 4 };
        let misalignment = self.cursor % alignment;
        if misalignment != 0 {
            self.cursor += alignment - misalignment;
        }
        let slot = UniformSlot {
            offset: self.cursor,
            size,
        };
        self.cursor += size;
        self.slots.insert(name.to_string(), slot);
        self.order.push(name.to_string());

        let padded = self.cursor.div_ceil(4) * 4;
        self.data.resize(padded, 0.0);
        self.is_sync = false;
    }

    /// Slot of a declared uniform
    pub fn slot(&self, name: &str) -> Option<UniformSlot> {
        self.slots.get(name).copied()
    }

    /// Current value of a declared uniform
    pub fn uniform(&self, name: &str) -> Option<&[f32]> {
        self.slots
            .get(name)
            .map(|slot| &self.data[slot.offset..slot.offset + slot.size])
    }

    /// Declared uniform names in declaration order
    pub fn uniform_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Size of the block in bytes
    pub fn size_in_bytes(&self) -> usize {
        self.data.len() * std::mem::size_of::<f32>()
    }

    fn write(&mut self, name: &str, values: &[f32]) {
        let Some(slot) = self.slots.get(name).copied() else {
            log::warn!("Uniform '{name}' written but never declared");
            return;
        };
        let len = values.len().min(slot.size);
        let target = &mut self.data[slot.offset..slot.offset + len];
        if target != &values[..len] {
            target.copy_from_slice(&values[..len]);
            self.is_sync = false;
        }
    }

    /// Write a scalar
    pub fn update_float(&mut self, name: &str, x: f32) {
        self.write(name, &[x]);
    }

    /// Write a `vec2`
    pub fn update_float2(&mut self, name: &str, x: f32, y: f32) {
        self.write(name, &[x, y]);
    }

    /// Write a `vec3`
    pub fn update_float3(&mut self, name: &str, x: f32, y: f32, z: f32) {
        self.write(name, &[x, y, z]);
    }

    /// Write a `vec4`
    pub fn update_float4(&mut self, name: &str, x: f32, y: f32, z: f32, w: f32) {
        self.write(name, &[x, y, z, w]);
    }

    /// Write a color as a `vec3`
    pub fn update_color3(&mut self, name: &str, color: Color3) {
        self.write(name, &color.to_array());
    }

    /// Write a `mat4` in column-major order
    pub fn update_matrix(&mut self, name: &str, matrix: &Mat4) {
        self.write(name, &matrix.to_column_major());
    }

    /// Bind a texture to a sampler, or clear the binding with `None`
    pub fn set_texture(&mut self, sampler: &str, texture: Option<TextureRef>) {
        match texture {
            Some(texture) => {
                self.samplers.insert(sampler.to_string(), texture);
            }
            None => {
                self.samplers.remove(sampler);
            }
        }
    }

    /// Texture currently bound to a sampler
    pub fn texture(&self, sampler: &str) -> Option<&TextureRef> {
        self.samplers.get(sampler)
    }

    /// Raw block contents
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Hand out the contents for upload if they changed, and mark the buffer in sync
    pub fn update(&mut self) -> Option<&[u8]> {
        if self.is_sync {
            return None;
        }
        self.is_sync = true;
        log::trace!("Uploading uniform block of {} bytes", self.size_in_bytes());
        Some(self.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_std140_packing() {
        let mut ubo = UniformBuffer::new(true);
        ubo.add_uniform("a", 3);
        ubo.add_uniform("b", 1);
        ubo.add_uniform("c", 2);
        ubo.add_uniform("m", 16);

        assert_eq!(ubo.slot("a").unwrap().offset, 0);
        // Scalar packs into the vec3 padding
        assert_eq!(ubo.slot("b").unwrap().offset, 3);
        assert_eq!(ubo.slot("c").unwrap().offset, 4);
        assert_eq!(ubo.slot("m").unwrap().offset, 8);
        assert_eq!(ubo.size_in_bytes(), 24 * 4);
    }

    #[test]
    fn test_sync_tracking() {
        let mut ubo = UniformBuffer::new(true);
        ubo.add_uniform("v", 2);
        assert!(ubo.update().is_some());
        assert!(ubo.is_sync());
        assert!(ubo.update().is_none());

        ubo.update_float2("v", 0.0, 0.0);
        assert!(ubo.is_sync(), "writing identical values keeps the buffer in sync");

        ubo.update_float2("v", 1.0, 2.0);
        assert!(!ubo.is_sync());
        assert_eq!(ubo.uniform("v").unwrap(), &[1.0, 2.0]);
    }

    #[test]
    fn test_unknown_uniform_is_ignored() {
        let mut ubo = UniformBuffer::new(true);
        ubo.update_float("missing", 1.0);
        assert!(ubo.uniform("missing").is_none());
        assert_eq!(ubo.size_in_bytes(), 0);
    }

    #[test]
    fn test_matrix_upload_is_column_major() {
        let mut ubo = UniformBuffer::new(true);
        ubo.add_uniform("m", 16);
        let mut m = Mat4::identity();
        m[(1, 3)] = 5.0;
        ubo.update_matrix("m", &m);
        assert_eq!(ubo.uniform("m").unwrap()[13], 5.0);
        assert_eq!(ubo.as_bytes().len(), 64);
    }
}

//! Compiled shader effect as seen by material features

use std::collections::BTreeMap;

use crate::render::texture::TextureRef;

/// Sampler bindings of the currently active shader program
#[derive(Debug, Clone, Default)]
pub struct Effect {
    name: String,
    samplers: BTreeMap<String, TextureRef>,
}

impl Effect {
    /// Create an effect with no bound samplers
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            samplers: BTreeMap::new(),
        }
    }

    /// Effect name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bind or clear a sampler
    pub fn set_texture(&mut self, sampler: &str, texture: Option<TextureRef>) {
        match texture {
            Some(texture) => {
                self.samplers.insert(sampler.to_string(), texture);
            }
            None => {
                if self.samplers.remove(sampler).is_some() {
                    log::trace!("Effect '{}' cleared sampler '{sampler}'", self.name);
                }
            }
        }
    }

    /// Texture bound to a sampler
    pub fn texture(&self, sampler: &str) -> Option<&TextureRef> {
        self.samplers.get(sampler)
    }
}

//! Ranked shader define fallbacks
//!
//! When a shader variant fails to compile (usually from exceeding sampler or
//! instruction limits) the material retries with the lowest-ranked optional
//! defines removed, one rank at a time.

use std::collections::BTreeMap;

/// Optional defines grouped by removal rank
#[derive(Debug, Clone, Default)]
pub struct EffectFallbacks {
    ranks: BTreeMap<u32, Vec<String>>,
}

impl EffectFallbacks {
    /// Empty fallback list
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `define` for removal at `rank`
    pub fn add_fallback(&mut self, rank: u32, define: impl Into<String>) {
        self.ranks.entry(rank).or_default().push(define.into());
    }

    /// Defines registered at `rank`
    pub fn defines_at(&self, rank: u32) -> &[String] {
        self.ranks.get(&rank).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True while at least one rank is left to remove
    pub fn has_more_fallbacks(&self) -> bool {
        !self.ranks.is_empty()
    }

    /// Drop the lowest remaining rank from `defines`
    ///
    /// `defines` holds `#define NAME [value]` lines. Returns the rank that was
    /// removed, or `None` when no fallbacks remain.
    pub fn reduce(&mut self, defines: &mut Vec<String>) -> Option<u32> {
        let rank = *self.ranks.keys().next()?;
        let removed = self.ranks.remove(&rank).unwrap_or_default();
        defines.retain(|line| {
            let name = line
                .trim_start_matches("#define")
                .split_whitespace()
                .next()
                .unwrap_or_default();
            !removed.iter().any(|define| define == name)
        });
        log::debug!("Shader fallback rank {rank} removed {removed:?}");
        Some(rank)
    }
}

//! Temporary render-target pool.
//!
//! Targets are acquired for a single capture and released right after
//! readback. Released targets are kept and handed out again for the next
//! request with the same descriptor.

use std::collections::HashMap;

use prefab_preview_core::PreviewOptions;

use crate::error::{RenderError, RenderResult};

/// Size and depth precision of a render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetDescriptor {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Depth buffer precision in bits (0 = no depth buffer).
    pub depth_bits: u32,
}

impl TargetDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub fn new(width: u32, height: u32, depth_bits: u32) -> Self {
        Self {
            width,
            height,
            depth_bits,
        }
    }

    /// Descriptor matching the output size and depth of `options`.
    #[must_use]
    pub fn from_options(options: &PreviewOptions) -> Self {
        Self::new(options.width, options.height, options.depth_bits)
    }

    /// Fails if either dimension is zero.
    pub fn validate(&self) -> RenderResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidTargetSize {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

impl Default for TargetDescriptor {
    fn default() -> Self {
        Self::new(256, 256, 24)
    }
}

/// Handle to an acquired render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetId(u64);

impl TargetId {
    /// Raw id value.
    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Reuse pool of render targets of type `T`.
#[derive(Debug)]
pub struct TargetPool<T> {
    free: Vec<(TargetDescriptor, T)>,
    in_use: HashMap<TargetId, (TargetDescriptor, T)>,
    next_id: u64,
}

impl<T> Default for TargetPool<T> {
    fn default() -> Self {
        Self {
            free: Vec::new(),
            in_use: HashMap::new(),
            next_id: 1,
        }
    }
}

impl<T> TargetPool<T> {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out a pooled target matching `desc`, or creates one with `create`.
    pub fn acquire(
        &mut self,
        desc: &TargetDescriptor,
        create: impl FnOnce(&TargetDescriptor) -> RenderResult<T>,
    ) -> RenderResult<TargetId> {
        desc.validate()?;
        let target = match self.free.iter().position(|(d, _)| d == desc) {
            Some(index) => self.free.swap_remove(index).1,
            None => {
                log::debug!(
                    "allocating {}x{} render target ({} bit depth)",
                    desc.width,
                    desc.height,
                    desc.depth_bits
                );
                create(desc)?
            }
        };

        let id = TargetId(self.next_id);
        self.next_id += 1;
        self.in_use.insert(id, (*desc, target));
        Ok(id)
    }

    /// Returns an acquired target and its descriptor.
    pub fn get(&self, id: TargetId) -> RenderResult<(&TargetDescriptor, &T)> {
        self.in_use
            .get(&id)
            .map(|(d, t)| (d, t))
            .ok_or(RenderError::UnknownTarget(id.0))
    }

    /// Returns a target to the pool. Returns false if `id` was not acquired.
    pub fn release(&mut self, id: TargetId) -> bool {
        match self.in_use.remove(&id) {
            Some(entry) => {
                self.free.push(entry);
                true
            }
            None => false,
        }
    }

    /// Number of targets currently acquired.
    #[must_use]
    pub fn in_use(&self) -> usize {
        self.in_use.len()
    }

    /// Number of released targets waiting for reuse.
    #[must_use]
    pub fn pooled(&self) -> usize {
        self.free.len()
    }
}

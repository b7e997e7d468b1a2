// 🔢 Version Sequencer - Gap-free entity versions for one device
//
// Seeded with the device's current high-water mark (e.g. `A-86`), it hands
// out `A-87`, `A-88`, ... one at a time. The cursor is the only state, so
// the sequence never runs out.

use crate::error::{Result, SplitterError};
use crate::knowledge::EntityVersion;

/// Largest seed counter accepted. Counters are `u128`, so a sequencer seeded
/// at or below this can never run out.
pub const MAX_SEED: u128 = u64::MAX as u128;

#[derive(Debug, Clone)]
pub struct VersionSequencer {
    current: EntityVersion,
    issued: u64,
}

impl VersionSequencer {
    /// Create a sequencer from a seed like `A-86`. Fails with a format error
    /// if the seed is not `<prefix>-<integer>` or its counter exceeds `MAX_SEED`.
    pub fn new(seed: &str) -> Result<Self> {
        Self::from_version(seed.parse()?)
    }

    pub fn from_version(seed: EntityVersion) -> Result<Self> {
        if seed.number() > MAX_SEED {
            return Err(SplitterError::format("entity version (too large to advance)", seed.to_string()));
        }
        Ok(VersionSequencer {
            current: seed,
            issued: 0,
        })
    }

    /// Issue the next version.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> EntityVersion {
        self.current = EntityVersion::new(self.current.prefix(), self.current.number() + 1);
        self.issued += 1;
        self.current.clone()
    }

    /// Most recently issued version, or the seed if nothing was issued yet
    pub fn current(&self) -> &EntityVersion {
        &self.current
    }

    /// How many versions this sequencer has issued
    pub fn issued(&self) -> u64 {
        self.issued
    }
}

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Layer 3: Internal module imports
// (none)

/// Directory index space per framework by default (spec.md §6
/// `MAX_ACTORS`). Construction-time, not compile-time, per this crate's
/// choice to make the knob testable (`SPEC_FULL.md` §1.3).
pub const DEFAULT_MAX_ACTORS: u32 = 1 << 20;
/// Receiver index space by default (spec.md §6 `MAX_RECEIVERS`).
pub const DEFAULT_MAX_RECEIVERS: u32 = 1 << 16;
/// Hard upper bound on `target_threads` by default (spec.md §6
/// `MAX_THREADS_PER_FRAMEWORK`).
pub const DEFAULT_MAX_THREADS_PER_FRAMEWORK: u32 = 256;
/// Minimum alignment for all allocations by default (spec.md §6
/// `CACHELINE_ALIGNMENT`).
pub const DEFAULT_CACHELINE_ALIGNMENT: usize = crate::alloc::CACHELINE_ALIGNMENT;
/// Caching-allocator size-class bound by default (spec.md §6 `MAX_POOLS`).
pub const DEFAULT_MAX_POOLS: usize = crate::alloc::MAX_POOLS;
/// Caching-allocator per-class block bound by default (spec.md §6
/// `MAX_BLOCKS`).
pub const DEFAULT_MAX_BLOCKS: usize = crate::alloc::MAX_BLOCKS;
/// Worker threads started at construction, by default (spec.md §6
/// `initial_thread_count`).
pub const DEFAULT_INITIAL_THREAD_COUNT: u32 = 1;

/// Construction-time parameters for a [`super::Framework`] (spec.md §6,
/// `SPEC_FULL.md` §1.3). Built via [`FrameworkBuilder`], mirroring the
/// teacher's `SystemConfig`/`SystemConfigBuilder` split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameworkParams {
    pub initial_thread_count: u32,
    pub node_mask: u64,
    pub processor_mask: u64,
    pub max_actors: u32,
    pub max_receivers: u32,
    pub max_threads_per_framework: u32,
    pub cacheline_alignment: usize,
    pub max_pools: usize,
    pub max_blocks: usize,
}

impl FrameworkParams {
    /// Start building params from defaults.
    pub fn builder() -> FrameworkBuilder {
        FrameworkBuilder::default()
    }
}

impl Default for FrameworkParams {
    fn default() -> Self {
        Self {
            initial_thread_count: DEFAULT_INITIAL_THREAD_COUNT,
            node_mask: u64::MAX,
            processor_mask: u64::MAX,
            max_actors: DEFAULT_MAX_ACTORS,
            max_receivers: DEFAULT_MAX_RECEIVERS,
            max_threads_per_framework: DEFAULT_MAX_THREADS_PER_FRAMEWORK,
            cacheline_alignment: DEFAULT_CACHELINE_ALIGNMENT,
            max_pools: DEFAULT_MAX_POOLS,
            max_blocks: DEFAULT_MAX_BLOCKS,
        }
    }
}

/// Validation failure from [`FrameworkBuilder::build`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("initial_thread_count must be at least 1")]
    ZeroThreadCount,
    #[error("max_actors must be at least 1")]
    ZeroActorCapacity,
    #[error("max_threads_per_framework must be at least initial_thread_count ({initial})")]
    MaxThreadsBelowInitial { initial: u32 },
    #[error("cacheline_alignment must be a power of two, got {0}")]
    AlignmentNotPowerOfTwo(usize),
}

/// Fluent builder for [`FrameworkParams`], following the teacher's
/// `SystemConfigBuilder` convention.
#[derive(Debug, Clone, Default)]
pub struct FrameworkBuilder {
    params: FrameworkParams,
}

impl FrameworkBuilder {
    pub fn initial_thread_count(mut self, count: u32) -> Self {
        self.params.initial_thread_count = count;
        self
    }

    pub fn node_mask(mut self, mask: u64) -> Self {
        self.params.node_mask = mask;
        self
    }

    pub fn processor_mask(mut self, mask: u64) -> Self {
        self.params.processor_mask = mask;
        self
    }

    pub fn max_actors(mut self, max: u32) -> Self {
        self.params.max_actors = max;
        self
    }

    pub fn max_receivers(mut self, max: u32) -> Self {
        self.params.max_receivers = max;
        self
    }

    pub fn max_threads_per_framework(mut self, max: u32) -> Self {
        self.params.max_threads_per_framework = max;
        self
    }

    pub fn cacheline_alignment(mut self, alignment: usize) -> Self {
        self.params.cacheline_alignment = alignment;
        self
    }

    pub fn max_pools(mut self, max: usize) -> Self {
        self.params.max_pools = max;
        self
    }

    pub fn max_blocks(mut self, max: usize) -> Self {
        self.params.max_blocks = max;
        self
    }

    /// Validate and produce the final [`FrameworkParams`].
    pub fn build(self) -> Result<FrameworkParams, ConfigError> {
        let params = self.params;
        if params.initial_thread_count == 0 {
            return Err(ConfigError::ZeroThreadCount);
        }
        if params.max_actors == 0 {
            return Err(ConfigError::ZeroActorCapacity);
        }
        if params.max_threads_per_framework < params.initial_thread_count {
            return Err(ConfigError::MaxThreadsBelowInitial {
                initial: params.initial_thread_count,
            });
        }
        if !params.cacheline_alignment.is_power_of_two() {
            return Err(ConfigError::AlignmentNotPowerOfTwo(params.cacheline_alignment));
        }
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_validate() {
        assert!(FrameworkParams::builder().build().is_ok());
    }

    #[test]
    fn zero_thread_count_is_rejected() {
        let err = FrameworkParams::builder()
            .initial_thread_count(0)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroThreadCount);
    }

    #[test]
    fn max_threads_below_initial_is_rejected() {
        let err = FrameworkParams::builder()
            .initial_thread_count(10)
            .max_threads_per_framework(4)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::MaxThreadsBelowInitial { initial: 10 }));
    }

    #[test]
    fn non_power_of_two_alignment_is_rejected() {
        let err = FrameworkParams::builder()
            .cacheline_alignment(100)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::AlignmentNotPowerOfTwo(100));
    }

    #[test]
    fn builder_overrides_apply() {
        let params = FrameworkParams::builder()
            .initial_thread_count(4)
            .max_actors(128)
            .build()
            .unwrap();
        assert_eq!(params.initial_thread_count, 4);
        assert_eq!(params.max_actors, 128);
    }

    #[test]
    fn params_roundtrip_through_json() {
        let params = FrameworkParams::builder()
            .initial_thread_count(4)
            .max_receivers(2048)
            .cacheline_alignment(128)
            .build()
            .unwrap();

        let json = serde_json::to_string(&params).unwrap();
        let deserialized: FrameworkParams = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.initial_thread_count, params.initial_thread_count);
        assert_eq!(deserialized.max_receivers, params.max_receivers);
        assert_eq!(deserialized.cacheline_alignment, params.cacheline_alignment);
    }
}

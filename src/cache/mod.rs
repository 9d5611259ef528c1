//! Process-local translation cache.

mod memory;

pub use memory::{CacheEntry, CacheStats, DEFAULT_CAPACITY, DEFAULT_TTL, TranslationCache};

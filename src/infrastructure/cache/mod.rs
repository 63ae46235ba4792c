//! Cache infrastructure - Single-flight slide plan cache

mod generation_cache;

pub use generation_cache::{EntryState, GenerationCache};

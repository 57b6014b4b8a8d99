//! Storage for per-owner kit collections
//!
//! `kit_codec` maps collections to and from the YAML owner-file format;
//! `kit_store` keeps the in-memory mirror and rewrites files on change.

pub mod kit_codec;
pub mod kit_store;

pub use kit_store::KitStore;

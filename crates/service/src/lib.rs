//! Service layer owning per-player kit collections.
//! - `storage` holds the file-backed store and its YAML codec.
//! - `kits` exposes the repository trait callers program against.
//! - Errors surface persistence failures instead of swallowing them.

pub mod errors;
pub mod kits;
pub mod runtime;
pub mod storage;

pub use errors::KitStoreError;
pub use kits::KitRepository;
pub use storage::KitStore;

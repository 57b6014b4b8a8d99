//! Data model for per-owner equipment kits.

pub mod errors;
pub mod item;
pub mod kit;
pub mod owner;

pub use item::{ItemStack, Slot};
pub use kit::{normalize_slots, Kit, ARMOR_SLOTS, CONTENTS_SLOTS, MAIN_INVENTORY_SLOTS, OFFHAND_SLOT};
pub use owner::{parse_owner_id, validate_kit_name, OwnerId};

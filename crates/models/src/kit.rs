//! Kits: named inventory snapshots with fixed-shape slot arrays.
//!
//! A `Kit` always carries exactly [`CONTENTS_SLOTS`] content slots and
//! [`ARMOR_SLOTS`] armor slots. Records loaded from older or hand-edited
//! files are repaired through [`normalize_slots`] rather than rejected.

use serde::Serialize;

use crate::item::Slot;

/// Main inventory slots (hotbar + storage).
pub const MAIN_INVENTORY_SLOTS: usize = 36;
/// Index of the off-hand slot inside `contents`.
pub const OFFHAND_SLOT: usize = MAIN_INVENTORY_SLOTS;
/// Main inventory plus off-hand.
pub const CONTENTS_SLOTS: usize = MAIN_INVENTORY_SLOTS + 1;
/// Boots, leggings, chestplate, helmet.
pub const ARMOR_SLOTS: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kit {
    pub name: String,
    pub display_name: String,
    contents: Vec<Slot>,
    armor: Vec<Slot>,
}

/// Resize a decoded slot list to `len`.
///
/// Absent lists become all-empty, short lists are padded with empty slots
/// and long lists keep their leading `len` entries. Applying it twice is
/// the same as applying it once.
pub fn normalize_slots(slots: Option<Vec<Slot>>, len: usize) -> Vec<Slot> {
    let mut slots = slots.unwrap_or_default();
    slots.resize(len, None);
    slots
}

impl Kit {
    /// Build a kit, normalizing both slot lists to their canonical lengths.
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        contents: Vec<Slot>,
        armor: Vec<Slot>,
    ) -> Self {
        Self::from_parts(name.into(), display_name.into(), Some(contents), Some(armor))
    }

    /// A kit with every slot empty; the display name mirrors the name.
    pub fn empty(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::from_parts(name.clone(), name, None, None)
    }

    /// Assemble a kit from possibly-missing record parts.
    ///
    /// A missing display name falls back to `name`.
    pub fn from_record(
        name: impl Into<String>,
        display_name: Option<String>,
        contents: Option<Vec<Slot>>,
        armor: Option<Vec<Slot>>,
    ) -> Self {
        let name = name.into();
        let display_name = display_name.unwrap_or_else(|| name.clone());
        Self::from_parts(name, display_name, contents, armor)
    }

    fn from_parts(
        name: String,
        display_name: String,
        contents: Option<Vec<Slot>>,
        armor: Option<Vec<Slot>>,
    ) -> Self {
        Self {
            name,
            display_name,
            contents: normalize_slots(contents, CONTENTS_SLOTS),
            armor: normalize_slots(armor, ARMOR_SLOTS),
        }
    }

    pub fn contents(&self) -> &[Slot] { &self.contents }

    pub fn armor(&self) -> &[Slot] { &self.armor }

    /// Mutable view of the contents; the slot count cannot change through it.
    pub fn contents_mut(&mut self) -> &mut [Slot] { &mut self.contents }

    pub fn armor_mut(&mut self) -> &mut [Slot] { &mut self.armor }

    pub fn offhand(&self) -> &Slot { &self.contents[OFFHAND_SLOT] }

    /// Number of occupied slots across contents and armor.
    pub fn item_count(&self) -> usize {
        self.contents.iter().chain(self.armor.iter()).filter(|s| s.is_some()).count()
    }
}

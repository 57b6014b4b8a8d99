use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// One inventory position: an item, or `None` for an empty slot.
pub type Slot = Option<ItemStack>;

/// Opaque item record as captured from the host game.
///
/// Only the material is interpreted here; everything else the host attaches
/// (enchantments, names, durability) travels untouched in `meta`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    #[serde(rename = "type", alias = "material", default)]
    pub material: String,
    #[serde(default = "default_amount")]
    pub amount: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

fn default_amount() -> u32 { 1 }

impl ItemStack {
    pub fn new(material: impl Into<String>, amount: u32) -> Self {
        Self { material: material.into(), amount, meta: None }
    }

    pub fn with_meta(mut self, meta: serde_json::Value) -> Self {
        self.meta = Some(meta);
        self
    }

    /// An item must name its material; the host cannot rebuild it otherwise.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.material.trim().is_empty() {
            return Err(ModelError::Validation("item has no material type".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_defaults_to_one() -> anyhow::Result<()> {
        let item: ItemStack = serde_json::from_value(serde_json::json!({ "type": "DIAMOND_SWORD" }))?;
        assert_eq!(item, ItemStack::new("DIAMOND_SWORD", 1));
        Ok(())
    }

    #[test]
    fn material_alias_is_accepted() -> anyhow::Result<()> {
        let item: ItemStack =
            serde_json::from_value(serde_json::json!({ "material": "ARROW", "amount": 64, "==": "ItemStack" }))?;
        assert_eq!(item.material, "ARROW");
        assert_eq!(item.amount, 64);
        Ok(())
    }

    #[test]
    fn blank_material_fails_validation() {
        assert!(ItemStack::new("  ", 1).validate().is_err());
        assert!(ItemStack::new("STONE", 1).validate().is_ok());
    }
}

//! YAML codec for per-owner kit files.
//!
//! A file is an ordered mapping `kit name -> record`:
//!
//! ```yaml
//! pvp:
//!   displayName: PvP
//!   contents: [ { type: DIAMOND_SWORD, amount: 1 }, ~, ... ]   # 37 slots
//!   armor: [ ~, ~, { type: IRON_CHESTPLATE }, ~ ]              # 4 slots
//! ```
//!
//! Decoding is tolerant per record: a record that fails to decode is
//! reported in [`DecodedOwnerFile::skipped`] and the remaining records load.
//! Slot lists of any length are accepted and normalized by [`Kit::from_record`].

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use models::{Kit, Slot, ARMOR_SLOTS, CONTENTS_SLOTS};

use crate::errors::KitStoreError;

/// Kits decoded from one owner file, in file order.
#[derive(Debug, Default)]
pub struct DecodedOwnerFile {
    pub kits: Vec<Kit>,
    /// Records that could not be decoded: `(kit name, reason)`.
    pub skipped: Vec<(String, String)>,
    /// Kits whose slot lists were absent or had a non-canonical length.
    pub repaired: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct KitRecord {
    #[serde(rename = "displayName", default)]
    display_name: Option<Value>,
    #[serde(default)]
    contents: Option<Vec<Slot>>,
    #[serde(default)]
    armor: Option<Vec<Slot>>,
}

#[derive(Serialize)]
struct KitRecordRef<'a> {
    #[serde(rename = "displayName")]
    display_name: &'a str,
    contents: &'a [Slot],
    armor: &'a [Slot],
}

/// Text of a scalar YAML node, as hosts read keys and labels.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn decode_record(name: &str, value: Value) -> Result<(Kit, bool), KitStoreError> {
    let record: KitRecord = match value {
        Value::Null => KitRecord::default(),
        v => serde_yaml::from_value(v).map_err(|e| KitStoreError::Codec(e.to_string()))?,
    };

    let display_name = match record.display_name {
        None | Some(Value::Null) => None,
        Some(v) => Some(
            scalar_text(&v).ok_or_else(|| KitStoreError::Codec("displayName is not a scalar".into()))?,
        ),
    };

    for item in record.contents.iter().chain(record.armor.iter()).flatten().flatten() {
        item.validate()?;
    }

    let repaired = record.contents.as_ref().map_or(true, |c| c.len() != CONTENTS_SLOTS)
        || record.armor.as_ref().map_or(true, |a| a.len() != ARMOR_SLOTS);
    let kit = Kit::from_record(name, display_name, record.contents, record.armor);
    Ok((kit, repaired))
}

/// Decode an owner file.
///
/// Fails as a whole only when the text is not YAML or its top level is not a
/// mapping; an empty document is an empty collection.
pub fn decode_owner_file(text: &str) -> Result<DecodedOwnerFile, KitStoreError> {
    let root: Value = serde_yaml::from_str(text).map_err(|e| KitStoreError::Codec(e.to_string()))?;
    let entries = match root {
        Value::Null => return Ok(DecodedOwnerFile::default()),
        Value::Mapping(m) => m,
        _ => return Err(KitStoreError::Codec("top level is not a mapping".into())),
    };

    let mut out = DecodedOwnerFile::default();
    for (key, value) in entries {
        let Some(name) = scalar_text(&key) else {
            out.skipped.push((format!("{key:?}"), "kit name is not a scalar".into()));
            continue;
        };
        match decode_record(&name, value) {
            Ok((kit, repaired)) => {
                if repaired {
                    out.repaired.push(name);
                }
                out.kits.push(kit);
            }
            Err(e) => out.skipped.push((name, e.to_string())),
        }
    }
    Ok(out)
}

/// Encode a full owner collection, preserving its order.
pub fn encode_owner_file(kits: &[Kit]) -> Result<String, KitStoreError> {
    let mut root = Mapping::new();
    for kit in kits {
        let record = KitRecordRef {
            display_name: &kit.display_name,
            contents: kit.contents(),
            armor: kit.armor(),
        };
        let value = serde_yaml::to_value(record).map_err(|e| KitStoreError::Codec(e.to_string()))?;
        root.insert(Value::String(kit.name.clone()), value);
    }
    serde_yaml::to_string(&root).map_err(|e| KitStoreError::Codec(e.to_string()))
}

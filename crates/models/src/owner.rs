use uuid::Uuid;

use crate::errors::ModelError;

/// Globally unique player identifier owning a kit collection.
pub type OwnerId = Uuid;

/// Parse an owner id in canonical hyphenated form.
///
/// Owner files are named after `Uuid::to_string`, so only the lowercase
/// hyphenated spelling round-trips to the same file name.
pub fn parse_owner_id(raw: &str) -> Result<OwnerId, ModelError> {
    let id = Uuid::parse_str(raw).map_err(|e| ModelError::InvalidOwnerId(format!("{raw}: {e}")))?;
    if id.to_string() != raw {
        return Err(ModelError::InvalidOwnerId(format!("{raw}: not in canonical hyphenated form")));
    }
    Ok(id)
}

/// Kit name syntax accepted from command/UI callers.
///
/// The store never rewrites names; callers check them here before saving.
/// `.` is rejected because hosts address nested config keys with it.
pub fn validate_kit_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::InvalidKitName("name is empty".into()));
    }
    if name.contains('.') {
        return Err(ModelError::InvalidKitName(format!("{name}: must not contain '.'")));
    }
    if name.chars().any(char::is_control) {
        return Err(ModelError::InvalidKitName(format!("{name:?}: contains control characters")));
    }
    Ok(())
}

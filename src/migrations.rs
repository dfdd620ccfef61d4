//! Definition migration
//!
//! Historical flow definitions are normalized to the current schema before the
//! loader sees them. The full migration pipeline lives outside this crate; the
//! default [`SpecVersionGate`] only accepts definitions already on the current
//! major version.

use crate::errors::MigrationError;
use serde_json::Value;

/// The flow schema version this interpreter understands
pub const CURRENT_SPEC_VERSION: &str = "14.3.0";

pub trait Migrator: Send + Sync {
    /// Bring a raw definition up to the current schema
    fn normalize(&self, definition: Value) -> Result<Value, MigrationError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SpecVersionGate;

impl Migrator for SpecVersionGate {
    fn normalize(&self, definition: Value) -> Result<Value, MigrationError> {
        let object = definition.as_object().ok_or(MigrationError::NotAnObject)?;
        let found = object
            .get("spec_version")
            .and_then(Value::as_str)
            .ok_or(MigrationError::MissingVersion)?;

        let found_version = parse_version(found)?;
        let current = parse_version(CURRENT_SPEC_VERSION)?;

        if found_version.0 != current.0 || found_version > current {
            return Err(MigrationError::Unsupported {
                found: found.to_string(),
                current: CURRENT_SPEC_VERSION.to_string(),
            });
        }

        Ok(definition)
    }
}

/// Parse `major.minor[.patch]`
fn parse_version(version: &str) -> Result<(u64, u64, u64), MigrationError> {
    let malformed = || MigrationError::Malformed(version.to_string());
    let mut parts = version.split('.').map(|p| p.parse::<u64>());

    let major = parts.next().ok_or_else(malformed)?.map_err(|_| malformed())?;
    let minor = parts.next().ok_or_else(malformed)?.map_err(|_| malformed())?;
    let patch = match parts.next() {
        Some(p) => p.map_err(|_| malformed())?,
        None => 0,
    };
    if parts.next().is_some() {
        return Err(malformed());
    }
    Ok((major, minor, patch))
}

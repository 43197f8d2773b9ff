use std::path::Path;

use crate::error::{SanitizeError, SanitizeResult};
use crate::sanitizer::constants::{CORE_IDENTITY_FIELDS, CORE_PROPERTIES_PART};
use crate::sanitizer::package::read_entry;

use super::xml::{core_field_spec, field_is_empty, parse_xml};

/// Comprueba que un documento Office limpio no conserva campos de identidad.
pub fn verify_document_metadata_clean(path: &Path) -> SanitizeResult<bool> {
    let Some(contents) = read_entry(path, "documento Office", CORE_PROPERTIES_PART)? else {
        return Ok(true);
    };

    let root = parse_xml(&contents).map_err(|reason| SanitizeError::Verification {
        reason: format!("core.xml: {reason}"),
    })?;

    Ok(CORE_IDENTITY_FIELDS
        .iter()
        .filter_map(|tag| core_field_spec(tag))
        .all(|spec| field_is_empty(&root, spec)))
}

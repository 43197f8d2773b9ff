use std::path::Path;
use tracing::debug;

use crate::error::{SanitizeError, SanitizeResult};
use crate::sanitizer::constants::{CONTENT_TYPES_PART, CORE_IDENTITY_FIELDS, CORE_PROPERTIES_PART};
use crate::sanitizer::package::{EntryTimestamps, read_entry, rewrite_zip};

use super::verify::verify_document_metadata_clean;
use super::xml::{clear_field, core_field_spec, parse_xml, write_xml};

const FORMAT: &str = "documento Office";

/// Vacía título, autor, descripción, asunto y palabras clave de `core.xml`.
///
/// Las propiedades personalizadas y el cuerpo del documento no se tocan.
pub(crate) fn strip_document_metadata(source: &Path, temp: &Path) -> SanitizeResult<()> {
    if read_entry(source, FORMAT, CONTENT_TYPES_PART)?.is_none() {
        return Err(SanitizeError::decode(
            FORMAT,
            "el paquete no contiene [Content_Types].xml",
        ));
    }

    let cleaned_anything = rewrite_zip(
        source,
        temp,
        FORMAT,
        EntryTimestamps::Preserve,
        |name, contents| match name {
            CORE_PROPERTIES_PART => sanitize_core_properties(contents)
                .map_err(|reason| SanitizeError::decode(FORMAT, format!("core.xml: {reason}"))),
            _ => Ok((contents, false)),
        },
    )?;
    debug!(source = %source.display(), cleaned_anything, "propiedades principales procesadas");

    if !verify_document_metadata_clean(temp)? {
        return Err(SanitizeError::Verification {
            reason: "core.xml conserva campos de identidad".to_string(),
        });
    }

    Ok(())
}

pub(crate) fn sanitize_core_properties(contents: Vec<u8>) -> Result<(Vec<u8>, bool), String> {
    let mut root = parse_xml(&contents)?;

    let mut modified = false;
    for tag in CORE_IDENTITY_FIELDS {
        if let Some(spec) = core_field_spec(tag) {
            modified |= clear_field(&mut root, spec);
        }
    }

    if !modified {
        return Ok((contents, false));
    }

    Ok((write_xml(&root)?, true))
}

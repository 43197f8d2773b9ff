//! Libros electrónicos: en EPUB se vacía el elemento `<metadata>` de cada
//! documento de paquete (`.opf`) y el resto de entradas se copian tal cual.

use std::path::Path;
use tracing::debug;
use xmltree::{Element, XMLNode};

use crate::error::{SanitizeError, SanitizeResult};

use super::constants::{OPF_METADATA_ELEMENT, OPF_SUFFIX};
use super::office::{parse_xml, write_xml};
use super::package::{EntryTimestamps, rewrite_zip};

const FORMAT: &str = "EPUB";

pub(crate) fn strip_epub_metadata(source: &Path, temp: &Path) -> SanitizeResult<()> {
    let cleaned = rewrite_zip(
        source,
        temp,
        FORMAT,
        EntryTimestamps::Preserve,
        |name, contents| {
            if name.to_lowercase().ends_with(OPF_SUFFIX) {
                debug!(entry = name, "limpiando metadata del paquete EPUB");
                sanitize_package_document(contents).map_err(|reason| {
                    SanitizeError::decode(FORMAT, format!("{name}: {reason}"))
                })
            } else {
                Ok((contents, false))
            }
        },
    )?;
    debug!(source = %source.display(), cleaned, "EPUB reescrito");
    Ok(())
}

/// Elimina todos los hijos del primer elemento `metadata` del OPF.
pub(crate) fn sanitize_package_document(contents: Vec<u8>) -> Result<(Vec<u8>, bool), String> {
    let mut root = parse_xml(&contents)?;

    let Some(metadata) = find_metadata_mut(&mut root) else {
        debug!("el documento OPF no contiene <metadata>");
        return Ok((contents, false));
    };

    if metadata.children.is_empty() {
        return Ok((contents, false));
    }
    metadata.children.clear();

    Ok((write_xml(&root)?, true))
}

fn find_metadata_mut(element: &mut Element) -> Option<&mut Element> {
    if element.name == OPF_METADATA_ELEMENT {
        return Some(element);
    }

    for node in element.children.iter_mut() {
        if let XMLNode::Element(child) = node
            && let Some(found) = find_metadata_mut(child)
        {
            return Some(found);
        }
    }
    None
}

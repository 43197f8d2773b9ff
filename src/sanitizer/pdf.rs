//! PDF: el diccionario de información del documento se sustituye por uno
//! vacío. Los flujos de contenido, fuentes y objetos incrustados no cambian.

use lopdf::{Dictionary, Document, Object};
use std::path::Path;
use tracing::debug;

use crate::error::{SanitizeError, SanitizeResult};

const FORMAT: &str = "PDF";

pub(crate) fn strip_pdf_metadata(source: &Path, temp: &Path) -> SanitizeResult<()> {
    let mut document = Document::load(source).map_err(|e| SanitizeError::decode(FORMAT, e))?;
    if document.is_encrypted() {
        return Err(SanitizeError::decode(FORMAT, "el documento está cifrado"));
    }

    replace_info_dictionary(&mut document);

    document
        .save(temp)
        .map_err(|e| SanitizeError::io("guardar el PDF limpio", e))?;

    if !verify_pdf_metadata_clean(temp)? {
        return Err(SanitizeError::Verification {
            reason: "el PDF conserva entradas en /Info".to_string(),
        });
    }

    Ok(())
}

/// Apunta `/Info` a un diccionario vacío. Si ya existía un objeto de
/// información se reutiliza su identificador para no dejar la copia antigua.
pub(crate) fn replace_info_dictionary(document: &mut Document) {
    let previous = document
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|info| info.as_reference().ok());

    let info_id = match previous {
        Some(id) => {
            document
                .objects
                .insert(id, Object::Dictionary(Dictionary::new()));
            id
        }
        None => document.add_object(Dictionary::new()),
    };
    debug!(?info_id, "diccionario de información reemplazado");

    document.trailer.set("Info", Object::Reference(info_id));
}

/// Comprueba que el diccionario de información del PDF no tiene entradas.
pub fn verify_pdf_metadata_clean(path: &Path) -> SanitizeResult<bool> {
    let document = Document::load(path).map_err(|e| SanitizeError::Verification {
        reason: e.to_string(),
    })?;

    let info = match document.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => document.get_object(*id).ok(),
        Ok(object) => Some(object),
        Err(_) => None,
    };

    Ok(match info {
        Some(Object::Dictionary(dictionary)) => dictionary.is_empty(),
        Some(_) => false,
        None => true,
    })
}

//! Limpieza de las propiedades principales de paquetes Office (OOXML).

mod clean;
mod verify;
mod xml;

pub(crate) use clean::strip_document_metadata;
pub use verify::verify_document_metadata_clean;
pub(crate) use xml::{parse_xml, write_xml};

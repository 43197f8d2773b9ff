//! Valores compartidos por las estrategias basadas en paquetes ZIP.

pub const DC_NS: &str = "http://purl.org/dc/elements/1.1/";
pub const CP_NS: &str = "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
pub const CORE_PROPERTIES_PART: &str = "docProps/core.xml";

/// Campos de identidad de `core.xml` que se vacían.
pub const CORE_IDENTITY_FIELDS: [&str; 5] = [
    "dc:title",
    "dc:creator",
    "dc:description",
    "dc:subject",
    "cp:keywords",
];

/// Sufijo del documento de paquete dentro de un EPUB.
pub const OPF_SUFFIX: &str = ".opf";
pub const OPF_METADATA_ELEMENT: &str = "metadata";

//! Archivos comprimidos. El subtipo sale de la extensión, no del contenido.

mod stream;
mod tar;
mod zip;

pub(crate) use self::stream::{recompress_bzip2, recompress_gzip, recompress_xz};
pub(crate) use self::tar::strip_tar_metadata;
pub(crate) use self::zip::strip_zip_metadata;

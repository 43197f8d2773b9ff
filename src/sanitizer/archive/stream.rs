//! Formatos de un solo flujo: se descomprime y se vuelve a comprimir.
//!
//! La cabecera gzip nueva no lleva nombre, comentario ni fecha; bzip2 y xz
//! no guardan metadata identificable.

use bzip2::read::BzDecoder;
use bzip2::write::BzEncoder;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use xz2::read::XzDecoder;
use xz2::write::XzEncoder;

use crate::error::{SanitizeError, SanitizeResult};

const XZ_PRESET: u32 = 6;

pub(crate) fn recompress_gzip(source: &Path, temp: &Path) -> SanitizeResult<()> {
    let decoder = MultiGzDecoder::new(open_source(source)?);
    let encoder = GzEncoder::new(create_temp(temp)?, flate2::Compression::default());
    let encoder = pump(decoder, encoder, "gzip")?;
    finish(encoder.finish())
}

pub(crate) fn recompress_bzip2(source: &Path, temp: &Path) -> SanitizeResult<()> {
    let decoder = BzDecoder::new(open_source(source)?);
    let encoder = BzEncoder::new(create_temp(temp)?, bzip2::Compression::default());
    let encoder = pump(decoder, encoder, "bzip2")?;
    finish(encoder.finish())
}

pub(crate) fn recompress_xz(source: &Path, temp: &Path) -> SanitizeResult<()> {
    let decoder = XzDecoder::new(open_source(source)?);
    let encoder = XzEncoder::new(create_temp(temp)?, XZ_PRESET);
    let encoder = pump(decoder, encoder, "xz")?;
    finish(encoder.finish())
}

fn open_source(source: &Path) -> SanitizeResult<BufReader<File>> {
    File::open(source)
        .map(BufReader::new)
        .map_err(|e| SanitizeError::io("abrir el archivo comprimido", e))
}

fn create_temp(temp: &Path) -> SanitizeResult<BufWriter<File>> {
    File::create(temp)
        .map(BufWriter::new)
        .map_err(|e| SanitizeError::io("crear el archivo comprimido limpio", e))
}

// Los errores de copia casi siempre vienen de un flujo de entrada corrupto.
fn pump<R: Read, W: Write>(
    mut decoder: R,
    mut encoder: W,
    format: &'static str,
) -> SanitizeResult<W> {
    io::copy(&mut decoder, &mut encoder).map_err(|e| SanitizeError::decode(format, e))?;
    Ok(encoder)
}

fn finish(result: io::Result<BufWriter<File>>) -> SanitizeResult<()> {
    let mut writer = result.map_err(|e| SanitizeError::io("finalizar la compresión", e))?;
    writer
        .flush()
        .map_err(|e| SanitizeError::io("finalizar la compresión", e))
}

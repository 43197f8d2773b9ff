use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{DateTime, ZipArchive, ZipWriter};

use crate::error::{SanitizeError, SanitizeResult};

/// Qué atributos de cada entrada se conservan al copiarla.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum EntryTimestamps {
    Preserve,
    /// 1980-01-01 00:00:00, la fecha mínima representable en ZIP.
    ResetToEpoch,
}

/// Reescribe un contenedor ZIP aplicando una transformación por entrada.
///
/// El orden, el nombre y el método de compresión de cada entrada se
/// mantienen. Devuelve si alguna entrada cambió.
pub(crate) fn rewrite_zip<F>(
    path: &Path,
    output_path: &Path,
    format: &'static str,
    timestamps: EntryTimestamps,
    mut transform: F,
) -> SanitizeResult<bool>
where
    F: FnMut(&str, Vec<u8>) -> SanitizeResult<(Vec<u8>, bool)>,
{
    let source_file = File::open(path).map_err(|e| SanitizeError::io("abrir el archivo", e))?;
    let mut archive = ZipArchive::new(BufReader::new(source_file))
        .map_err(|e| SanitizeError::decode(format, e))?;

    let target_file =
        File::create(output_path).map_err(|e| SanitizeError::io("crear el archivo limpio", e))?;
    let mut writer = ZipWriter::new(BufWriter::new(target_file));

    let mut modified_any = false;

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| SanitizeError::decode(format, e))?;
        let name = file.name().to_string();

        let mut options = FileOptions::<'_, ()>::default()
            .compression_method(file.compression())
            .large_file(file.size() >= u64::from(u32::MAX));
        if let Some(mode) = file.unix_mode() {
            options = options.unix_permissions(mode);
        }
        match timestamps {
            EntryTimestamps::Preserve => {
                if let Some(time) = file.last_modified() {
                    options = options.last_modified_time(time);
                }
            }
            EntryTimestamps::ResetToEpoch => {
                options = options.last_modified_time(DateTime::default());
            }
        }

        if file.is_dir() {
            writer
                .add_directory(name, options)
                .map_err(|e| SanitizeError::io("crear un directorio en el ZIP", e))?;
            continue;
        }

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .map_err(|e| SanitizeError::decode(format, e))?;

        let (data_to_write, changed) = transform(&name, contents)?;
        modified_any |= changed;

        writer
            .start_file(name, options)
            .map_err(|e| SanitizeError::io("escribir una entrada del ZIP", e))?;
        writer
            .write_all(&data_to_write)
            .map_err(|e| SanitizeError::io("escribir una entrada del ZIP", e))?;
    }

    let mut inner = writer
        .finish()
        .map_err(|e| SanitizeError::io("finalizar el ZIP", e))?;
    inner
        .flush()
        .map_err(|e| SanitizeError::io("finalizar el ZIP", e))?;

    Ok(modified_any)
}

/// Lee una entrada concreta, o `None` si el paquete no la contiene.
pub(crate) fn read_entry(
    path: &Path,
    format: &'static str,
    entry: &str,
) -> SanitizeResult<Option<Vec<u8>>> {
    let file = File::open(path).map_err(|e| SanitizeError::io("abrir el archivo", e))?;
    let mut archive =
        ZipArchive::new(BufReader::new(file)).map_err(|e| SanitizeError::decode(format, e))?;

    let mut zipped = match archive.by_name(entry) {
        Ok(zipped) => zipped,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(SanitizeError::decode(format, e)),
    };

    let mut contents = Vec::new();
    zipped
        .read_to_end(&mut contents)
        .map_err(|e| SanitizeError::decode(format, e))?;
    Ok(Some(contents))
}

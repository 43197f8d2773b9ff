use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use tar::{Archive, Builder, EntryType, Header};
use tracing::debug;

use crate::error::{SanitizeError, SanitizeResult};

const FORMAT: &str = "TAR";
const FILE_MODE: u32 = 0o644;
const DIRECTORY_MODE: u32 = 0o755;

/// Reescribe cada entrada con cabeceras nuevas: fecha 0, sin dueño ni grupo
/// y permisos fijos. El contenido se copia sin cambios.
pub(crate) fn strip_tar_metadata(source: &Path, temp: &Path) -> SanitizeResult<()> {
    let input = File::open(source).map_err(|e| SanitizeError::io("abrir el TAR", e))?;
    let mut archive = Archive::new(BufReader::new(input));

    let output = File::create(temp).map_err(|e| SanitizeError::io("crear el TAR limpio", e))?;
    let mut builder = Builder::new(BufWriter::new(output));

    let entries = archive
        .entries()
        .map_err(|e| SanitizeError::decode(FORMAT, e))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| SanitizeError::decode(FORMAT, e))?;
        let path = entry
            .path()
            .map_err(|e| SanitizeError::decode(FORMAT, e))?
            .into_owned();

        let entry_type = match entry.header().entry_type() {
            EntryType::XGlobalHeader | EntryType::XHeader => continue,
            EntryType::GNUSparse => {
                return Err(SanitizeError::decode(
                    FORMAT,
                    format!("entrada dispersa no soportada: {}", path.display()),
                ));
            }
            EntryType::Continuous => EntryType::Regular,
            other => other,
        };

        let mut header = neutral_header(entry_type, entry.size())
            .map_err(|e| SanitizeError::io("preparar la cabecera TAR", e))?;

        let written = match entry_type {
            EntryType::Symlink | EntryType::Link => {
                let target = entry
                    .link_name()
                    .map_err(|e| SanitizeError::decode(FORMAT, e))?
                    .map(|target| target.into_owned())
                    .unwrap_or_default();
                builder.append_link(&mut header, &path, &target)
            }
            _ if carries_data(entry_type) => builder.append_data(&mut header, &path, &mut entry),
            _ => builder.append_data(&mut header, &path, io::empty()),
        };
        written.map_err(|e| SanitizeError::io("escribir una entrada del TAR", e))?;
        debug!(entry = %path.display(), "entrada TAR copiada");
    }

    let mut inner = builder
        .into_inner()
        .map_err(|e| SanitizeError::io("finalizar el TAR", e))?;
    inner
        .flush()
        .map_err(|e| SanitizeError::io("finalizar el TAR", e))
}

fn neutral_header(entry_type: EntryType, size: u64) -> io::Result<Header> {
    let mut header = Header::new_gnu();
    header.set_entry_type(entry_type);
    header.set_mtime(0);
    header.set_uid(0);
    header.set_gid(0);
    header.set_username("")?;
    header.set_groupname("")?;

    header.set_size(if carries_data(entry_type) { size } else { 0 });
    header.set_mode(if entry_type.is_dir() {
        DIRECTORY_MODE
    } else {
        FILE_MODE
    });

    Ok(header)
}

/// Directorios, enlaces y nodos de dispositivo no llevan bloques de datos.
fn carries_data(entry_type: EntryType) -> bool {
    !(entry_type.is_dir()
        || entry_type.is_symlink()
        || entry_type.is_hard_link()
        || entry_type.is_character_special()
        || entry_type.is_block_special()
        || entry_type.is_fifo())
}

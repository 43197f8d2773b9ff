//! Protocolo de reemplazo en sitio: el contenido limpio se escribe en un
//! archivo hermano y solo después sustituye al original.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::ReplaceMode;
use crate::error::{SanitizeError, SanitizeResult};

const TEMP_MARKER: &str = "metascrub-tmp";

/// Operaciones de sistema de archivos que usa el protocolo. Se inyectan para
/// poder simular fallos de borrado o renombrado.
pub trait FileOps: Send + Sync {
    fn remove_file(&self, path: &Path) -> io::Result<()>;
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StdFileOps;

impl FileOps for StdFileOps {
    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }
}

/// Nombre temporal estable en el mismo directorio que `path`.
///
/// Conserva la extensión para que las herramientas que deducen el formato
/// por el nombre (ffmpeg) escriban el contenedor correcto.
pub fn temp_path_for(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();

    match path.extension() {
        Some(extension) => parent.join(format!(
            ".{}.{}.{}",
            stem,
            TEMP_MARKER,
            extension.to_string_lossy()
        )),
        None => parent.join(format!(".{}.{}", stem, TEMP_MARKER)),
    }
}

/// Ejecuta `produce` sobre un temporal hermano y lo promueve al lugar del
/// original. El temporal nunca sobrevive a la llamada salvo cuando el original
/// ya fue borrado y el renombrado falla (`OriginalLost`).
pub fn replace_in_place<F>(
    ops: &dyn FileOps,
    mode: ReplaceMode,
    original: &Path,
    produce: F,
) -> SanitizeResult<()>
where
    F: FnOnce(&Path) -> SanitizeResult<()>,
{
    ensure_regular_file(original)?;

    let temp = temp_path_for(original);
    debug!(original = %original.display(), temp = %temp.display(), "generando archivo temporal");

    if let Err(error) = produce(&temp) {
        discard_temp(ops, &temp);
        return Err(error);
    }

    if !temp.is_file() {
        return Err(SanitizeError::Verification {
            reason: "la estrategia no generó el archivo temporal".to_string(),
        });
    }

    match mode {
        ReplaceMode::Atomic => ops.rename(&temp, original).map_err(|error| {
            discard_temp(ops, &temp);
            SanitizeError::Replace {
                reason: error.to_string(),
            }
        }),
        ReplaceMode::DeleteThenRename => {
            if let Err(error) = ops.remove_file(original) {
                discard_temp(ops, &temp);
                return Err(SanitizeError::Replace {
                    reason: format!("no se pudo eliminar el original: {error}"),
                });
            }

            ops.rename(&temp, original).map_err(|error| {
                warn!(
                    original = %original.display(),
                    temp = %temp.display(),
                    %error,
                    "el original fue eliminado y el renombrado falló"
                );
                SanitizeError::OriginalLost {
                    temp: temp.clone(),
                    reason: error.to_string(),
                }
            })
        }
    }
}

/// Los enlaces simbólicos se rechazan: el renombrado reemplazaría el enlace
/// y dejaría intacto el archivo al que apunta.
pub(crate) fn ensure_regular_file(path: &Path) -> SanitizeResult<()> {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_file() => Ok(()),
        _ => Err(SanitizeError::NotARegularFile {
            path: path.to_path_buf(),
        }),
    }
}

fn discard_temp(ops: &dyn FileOps, temp: &Path) {
    if !temp.exists() {
        return;
    }
    if let Err(error) = ops.remove_file(temp) {
        warn!(temp = %temp.display(), %error, "no se pudo eliminar el archivo temporal");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::tempdir;

    /// Sistema de archivos real con fallos programables.
    #[derive(Default)]
    struct FlakyOps {
        fail_remove_original: AtomicBool,
        fail_rename: AtomicBool,
    }

    impl FileOps for FlakyOps {
        fn remove_file(&self, path: &Path) -> io::Result<()> {
            let is_temp = path.to_string_lossy().contains(TEMP_MARKER);
            if !is_temp && self.fail_remove_original.load(Ordering::SeqCst) {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "bloqueado"));
            }
            fs::remove_file(path)
        }

        fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
            if self.fail_rename.load(Ordering::SeqCst) {
                return Err(io::Error::other("renombrado simulado"));
            }
            fs::rename(from, to)
        }
    }

    #[test]
    fn temp_path_is_a_hidden_sibling_with_same_extension() {
        let temp = temp_path_for(Path::new("/data/photos/holiday.jpg"));
        assert_eq!(
            temp,
            PathBuf::from("/data/photos/.holiday.metascrub-tmp.jpg")
        );

        let bare = temp_path_for(Path::new("/data/README"));
        assert_eq!(bare, PathBuf::from("/data/.README.metascrub-tmp"));
    }

    #[test]
    fn success_promotes_temp_in_both_modes() -> Result<(), Box<dyn std::error::Error>> {
        for mode in [ReplaceMode::Atomic, ReplaceMode::DeleteThenRename] {
            let dir = tempdir()?;
            let source = dir.path().join("file.bin");
            fs::write(&source, b"original")?;

            replace_in_place(&StdFileOps, mode, &source, |temp| {
                fs::write(temp, b"clean").map_err(|e| SanitizeError::io("escribir", e))
            })?;

            assert_eq!(fs::read(&source)?, b"clean");
            assert!(!temp_path_for(&source).exists());
        }
        Ok(())
    }

    #[test]
    fn failed_transform_keeps_original_and_removes_temp() -> Result<(), Box<dyn std::error::Error>>
    {
        let dir = tempdir()?;
        let source = dir.path().join("file.bin");
        fs::write(&source, b"original")?;

        let result = replace_in_place(&StdFileOps, ReplaceMode::Atomic, &source, |temp| {
            fs::write(temp, b"half").map_err(|e| SanitizeError::io("escribir", e))?;
            Err(SanitizeError::decode("prueba", "corrupto"))
        });

        assert!(matches!(result, Err(SanitizeError::Decode { .. })));
        assert_eq!(fs::read(&source)?, b"original");
        assert!(!temp_path_for(&source).exists());
        Ok(())
    }

    #[test]
    fn failed_delete_keeps_original_untouched() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let source = dir.path().join("file.bin");
        fs::write(&source, b"original")?;

        let ops = FlakyOps::default();
        ops.fail_remove_original.store(true, Ordering::SeqCst);

        let result = replace_in_place(&ops, ReplaceMode::DeleteThenRename, &source, |temp| {
            fs::write(temp, b"clean").map_err(|e| SanitizeError::io("escribir", e))
        });

        let error = result.expect_err("el borrado simulado debía fallar");
        assert_eq!(error.kind(), crate::error::FailureKind::ReplaceFailure);
        assert_eq!(fs::read(&source)?, b"original");
        assert!(!temp_path_for(&source).exists());
        Ok(())
    }

    #[test]
    fn rename_after_delete_is_reported_as_data_loss() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let source = dir.path().join("file.bin");
        fs::write(&source, b"original")?;

        let ops = FlakyOps::default();
        ops.fail_rename.store(true, Ordering::SeqCst);

        let result = replace_in_place(&ops, ReplaceMode::DeleteThenRename, &source, |temp| {
            fs::write(temp, b"clean").map_err(|e| SanitizeError::io("escribir", e))
        });

        match result {
            Err(SanitizeError::OriginalLost { temp, .. }) => {
                assert!(!source.exists());
                assert_eq!(fs::read(&temp)?, b"clean");
            }
            other => panic!("se esperaba OriginalLost, se obtuvo {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn atomic_rename_failure_keeps_original() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let source = dir.path().join("file.bin");
        fs::write(&source, b"original")?;

        let ops = FlakyOps::default();
        ops.fail_rename.store(true, Ordering::SeqCst);

        let result = replace_in_place(&ops, ReplaceMode::Atomic, &source, |temp| {
            fs::write(temp, b"clean").map_err(|e| SanitizeError::io("escribir", e))
        });

        assert!(matches!(result, Err(SanitizeError::Replace { .. })));
        assert_eq!(fs::read(&source)?, b"original");
        assert!(!temp_path_for(&source).exists());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_rejected_and_target_is_untouched() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let target = dir.path().join("real.bin");
        let link = dir.path().join("link.bin");
        fs::write(&target, b"original")?;
        std::os::unix::fs::symlink(&target, &link)?;

        let result = replace_in_place(&StdFileOps, ReplaceMode::Atomic, &link, |temp| {
            fs::write(temp, b"clean").map_err(|e| SanitizeError::io("escribir", e))
        });

        assert!(matches!(result, Err(SanitizeError::NotARegularFile { .. })));
        assert!(fs::symlink_metadata(&link)?.file_type().is_symlink());
        assert_eq!(fs::read(&target)?, b"original");
        assert!(!temp_path_for(&link).exists());
        Ok(())
    }

    #[test]
    fn directories_are_rejected_before_producing() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let produced = AtomicBool::new(false);

        let result = replace_in_place(&StdFileOps, ReplaceMode::Atomic, dir.path(), |_| {
            produced.store(true, Ordering::SeqCst);
            Ok(())
        });

        assert!(matches!(result, Err(SanitizeError::NotARegularFile { .. })));
        assert!(!produced.load(Ordering::SeqCst));
        Ok(())
    }
}

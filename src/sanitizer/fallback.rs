//! Estrategia de respaldo: copia verificada byte a byte.
//!
//! No elimina metadata; existe para que toda categoría tenga una respuesta
//! segura. El resultado se marca como no-op.

use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{SanitizeError, SanitizeResult};

pub(crate) fn copy_verified(source: &Path, temp: &Path) -> SanitizeResult<()> {
    fs::copy(source, temp).map_err(|e| SanitizeError::io("copiar el archivo", e))?;

    let expected = sha256_of(source)?;
    let actual = sha256_of(temp)?;
    if expected != actual {
        return Err(SanitizeError::Verification {
            reason: "la copia no coincide con el original".to_string(),
        });
    }

    Ok(())
}

pub(crate) fn sha256_of(path: &Path) -> SanitizeResult<Vec<u8>> {
    let file = File::open(path).map_err(|e| SanitizeError::io("calcular el hash", e))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0_u8; 8192];

    loop {
        let read = reader
            .read(&mut buffer)
            .map_err(|e| SanitizeError::io("calcular el hash", e))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hasher.finalize().to_vec())
}

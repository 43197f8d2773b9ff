//! Errores del motor de saneamiento.
//!
//! Todos los fallos se transportan como valores clonables para que el
//! resultado por archivo pueda guardarse, serializarse y compararse en pruebas.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Clasificación gruesa de los fallos, útil para reportes por lote.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ClassificationUnknown,
    DecodeFailure,
    ExternalToolFailure,
    ReplaceFailure,
    OriginalLost,
    Internal,
}

#[derive(Clone, Debug, Error, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SanitizeError {
    #[error("No se pudo determinar la categoría de `{file_name}`")]
    ClassificationUnknown { file_name: String },

    #[error("`{}` no existe o no es un archivo regular", path.display())]
    NotARegularFile { path: PathBuf },

    #[error("Error de E/S al {action}: {reason}")]
    Io { action: String, reason: String },

    #[error("No se pudo interpretar el archivo como {format}: {reason}")]
    Decode { format: &'static str, reason: String },

    #[error("La herramienta de transcodificación falló ({status})")]
    ExternalTool { status: String, log: String },

    #[error("La verificación del archivo limpio falló: {reason}")]
    Verification { reason: String },

    #[error("No se pudo reemplazar el archivo original: {reason}")]
    Replace { reason: String },

    #[error(
        "El original fue eliminado pero el archivo limpio quedó en `{}`: {reason}",
        temp.display()
    )]
    OriginalLost { temp: PathBuf, reason: String },

    #[error("El saneamiento se interrumpió inesperadamente: {message}")]
    Panicked { message: String },
}

impl SanitizeError {
    pub fn io(action: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::Io {
            action: action.into(),
            reason: error.to_string(),
        }
    }

    pub fn decode(format: &'static str, error: impl std::fmt::Display) -> Self {
        Self::Decode {
            format,
            reason: error.to_string(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::ClassificationUnknown { .. } => FailureKind::ClassificationUnknown,
            Self::Decode { .. } => FailureKind::DecodeFailure,
            Self::ExternalTool { .. } => FailureKind::ExternalToolFailure,
            Self::NotARegularFile { .. } | Self::Replace { .. } => FailureKind::ReplaceFailure,
            Self::OriginalLost { .. } => FailureKind::OriginalLost,
            Self::Io { .. } | Self::Verification { .. } | Self::Panicked { .. } => {
                FailureKind::Internal
            }
        }
    }
}

pub type SanitizeResult<T> = Result<T, SanitizeError>;

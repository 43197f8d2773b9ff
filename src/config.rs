//! Configuración del motor. No existe archivo de configuración: los valores
//! salen de `Default`, del entorno y, en el binario, de los argumentos.

use serde::Serialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

pub const FFMPEG_ENV: &str = "METASCRUB_FFMPEG";
pub const REPLACE_MODE_ENV: &str = "METASCRUB_REPLACE_MODE";
pub const JPEG_QUALITY_ENV: &str = "METASCRUB_JPEG_QUALITY";

const DEFAULT_FFMPEG: &str = "ffmpeg";
const DEFAULT_JPEG_QUALITY: u8 = 100;

/// Forma de sustituir el original por el archivo temporal.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReplaceMode {
    /// Renombra el temporal sobre el original en una sola operación.
    #[default]
    Atomic,
    /// Elimina el original y luego renombra el temporal.
    DeleteThenRename,
}

impl FromStr for ReplaceMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "atomic" => Ok(ReplaceMode::Atomic),
            "delete-then-rename" | "delete" => Ok(ReplaceMode::DeleteThenRename),
            other => Err(format!("Modo de reemplazo inválido: {other}")),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SanitizerConfig {
    pub ffmpeg_program: PathBuf,
    pub replace_mode: ReplaceMode,
    pub jpeg_quality: u8,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            ffmpeg_program: PathBuf::from(DEFAULT_FFMPEG),
            replace_mode: ReplaceMode::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl SanitizerConfig {
    /// Lee la configuración del entorno; los valores inválidos se ignoran.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(program) = lookup(FFMPEG_ENV).filter(|value| !value.trim().is_empty()) {
            config.ffmpeg_program = PathBuf::from(program.trim());
        }

        if let Some(raw) = lookup(REPLACE_MODE_ENV) {
            match raw.parse() {
                Ok(mode) => config.replace_mode = mode,
                Err(error) => warn!(%error, "se usa el modo de reemplazo por defecto"),
            }
        }

        if let Some(raw) = lookup(JPEG_QUALITY_ENV) {
            match parse_quality(&raw) {
                Some(quality) => config.jpeg_quality = quality,
                None => warn!(value = %raw, "calidad JPEG fuera de rango (1-100), se usa 100"),
            }
        }

        config
    }
}

fn parse_quality(raw: &str) -> Option<u8> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .filter(|quality| (1..=100).contains(quality))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_environment() {
        let config = SanitizerConfig::from_lookup(|_| None);
        assert_eq!(config, SanitizerConfig::default());
        assert_eq!(config.replace_mode, ReplaceMode::Atomic);
        assert_eq!(config.jpeg_quality, 100);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = SanitizerConfig::from_lookup(lookup_from(&[
            (FFMPEG_ENV, "/opt/ffmpeg/bin/ffmpeg"),
            (REPLACE_MODE_ENV, "delete-then-rename"),
            (JPEG_QUALITY_ENV, "85"),
        ]));

        assert_eq!(config.ffmpeg_program, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(config.replace_mode, ReplaceMode::DeleteThenRename);
        assert_eq!(config.jpeg_quality, 85);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = SanitizerConfig::from_lookup(lookup_from(&[
            (FFMPEG_ENV, "  "),
            (REPLACE_MODE_ENV, "copy"),
            (JPEG_QUALITY_ENV, "0"),
        ]));

        assert_eq!(config, SanitizerConfig::default());
    }
}

//! Audio y video: se reempaquetan los flujos sin recodificar y se descarta
//! el mapa global de metadata.

use std::ffi::OsString;
use std::path::Path;
use tracing::debug;

use crate::error::{SanitizeError, SanitizeResult};

use super::transcode::TranscodeTool;

/// Argumentos equivalentes a `ffmpeg -y -i in -map 0 -map_metadata -1 -c copy out`.
pub(crate) fn strip_arguments(input: &Path, output: &Path) -> Vec<OsString> {
    vec![
        OsString::from("-y"),
        OsString::from("-i"),
        input.as_os_str().to_os_string(),
        OsString::from("-map"),
        OsString::from("0"),
        OsString::from("-map_metadata"),
        OsString::from("-1"),
        OsString::from("-c"),
        OsString::from("copy"),
        output.as_os_str().to_os_string(),
    ]
}

pub(crate) fn strip_media_metadata(
    tool: &dyn TranscodeTool,
    source: &Path,
    temp: &Path,
) -> SanitizeResult<()> {
    let outcome = tool.execute(&strip_arguments(source, temp));
    debug!(
        source = %source.display(),
        status = %outcome.status,
        log = %outcome.log,
        "salida de la herramienta de transcodificación"
    );

    if outcome.succeeded {
        Ok(())
    } else {
        Err(SanitizeError::ExternalTool {
            status: outcome.status,
            log: outcome.log,
        })
    }
}

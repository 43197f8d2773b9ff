//! Acceso a la herramienta externa de transcodificación.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

/// Resultado declarado por la herramienta y su salida combinada.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TranscodeOutcome {
    pub succeeded: bool,
    pub status: String,
    pub log: String,
}

/// Capacidad de ejecutar la herramienta; se sustituye por un doble en pruebas.
pub trait TranscodeTool: Send + Sync {
    fn execute(&self, args: &[OsString]) -> TranscodeOutcome;
}

/// Invoca `ffmpeg` como proceso síncrono.
#[derive(Clone, Debug)]
pub struct FfmpegTool {
    program: PathBuf,
}

impl FfmpegTool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl TranscodeTool for FfmpegTool {
    fn execute(&self, args: &[OsString]) -> TranscodeOutcome {
        match Command::new(&self.program).args(args).output() {
            Ok(output) => {
                let mut log = String::from_utf8_lossy(&output.stdout).into_owned();
                log.push_str(&String::from_utf8_lossy(&output.stderr));
                TranscodeOutcome {
                    succeeded: output.status.success(),
                    status: output.status.to_string(),
                    log,
                }
            }
            Err(error) => TranscodeOutcome {
                succeeded: false,
                status: "no se pudo iniciar".to_string(),
                log: format!("{}: {error}", self.program.display()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_reported_as_failure() {
        let tool = FfmpegTool::new("/nonexistent/metascrub-ffmpeg");
        let outcome = tool.execute(&[OsString::from("-version")]);

        assert!(!outcome.succeeded);
        assert!(outcome.log.contains("metascrub-ffmpeg"));
    }
}

//! Motor de saneamiento: elige la estrategia de cada archivo y reporta un
//! veredicto uniforme. Ningún error escapa de [`Sanitizer::sanitize`].

mod archive;
mod constants;
mod ebook;
mod fallback;
mod image;
mod media;
mod office;
mod package;
mod pdf;
pub mod replace;
pub mod transcode;

use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, info_span, warn};

use crate::classifier::{ArchiveKind, Category, classify_path, lowercase_extension};
use crate::config::SanitizerConfig;
use crate::error::{FailureKind, SanitizeError, SanitizeResult};

pub use image::verify_image_metadata_clean;
pub use office::verify_document_metadata_clean;
pub use pdf::verify_pdf_metadata_clean;
pub use replace::{FileOps, StdFileOps, replace_in_place, temp_path_for};
pub use transcode::{FfmpegTool, TranscodeOutcome, TranscodeTool};

/// Categoría declarada por quien llama, o `Auto` para clasificar por extensión.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CategoryHint {
    #[default]
    Auto,
    Declared(Category),
}

impl FromStr for CategoryHint {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.eq_ignore_ascii_case("auto") {
            return Ok(CategoryHint::Auto);
        }
        match value.parse::<Category>()? {
            Category::Unknown => Err("`unknown` no es una categoría declarable".to_string()),
            category => Ok(CategoryHint::Declared(category)),
        }
    }
}

impl fmt::Display for CategoryHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryHint::Auto => f.write_str("auto"),
            CategoryHint::Declared(category) => write!(f, "{category}"),
        }
    }
}

/// Veredicto por archivo. Se crea una vez y no cambia.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SanitizationResult {
    pub path: PathBuf,
    pub succeeded: bool,
    pub strategy_applied: Category,
    pub is_stubbed_noop: bool,
    pub error: Option<SanitizeError>,
}

impl SanitizationResult {
    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.error.as_ref().map(SanitizeError::kind)
    }

    /// El original se eliminó y el archivo limpio no llegó a su lugar.
    pub fn original_lost(&self) -> bool {
        matches!(self.error, Some(SanitizeError::OriginalLost { .. }))
    }
}

/// Procedimiento concreto, resuelto de forma exhaustiva a partir de la categoría.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Strategy {
    Image,
    Audio,
    Video,
    Pdf,
    Document,
    Epub,
    Zip,
    Tar,
    Gzip,
    Bzip2,
    Xz,
    Fallback,
}

impl Strategy {
    fn select(category: Category, path: &Path) -> Option<Self> {
        let strategy = match category {
            Category::Image => Strategy::Image,
            Category::Audio => Strategy::Audio,
            Category::Video => Strategy::Video,
            Category::Pdf => Strategy::Pdf,
            Category::Document => Strategy::Document,
            Category::Ebook => match lowercase_extension(path).as_deref() {
                Some("epub") => Strategy::Epub,
                _ => Strategy::Fallback,
            },
            Category::Archive => match ArchiveKind::from_path(path) {
                ArchiveKind::Zip => Strategy::Zip,
                ArchiveKind::Tar => Strategy::Tar,
                ArchiveKind::Gzip => Strategy::Gzip,
                ArchiveKind::Bzip2 => Strategy::Bzip2,
                ArchiveKind::Xz => Strategy::Xz,
                ArchiveKind::Other => Strategy::Fallback,
            },
            Category::Unknown => return None,
        };
        Some(strategy)
    }

    fn is_stub(self) -> bool {
        matches!(self, Strategy::Fallback)
    }
}

pub struct Sanitizer {
    config: SanitizerConfig,
    transcoder: Box<dyn TranscodeTool>,
    file_ops: Box<dyn FileOps>,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(SanitizerConfig::default())
    }
}

impl Sanitizer {
    pub fn new(config: SanitizerConfig) -> Self {
        let transcoder = Box::new(FfmpegTool::new(config.ffmpeg_program.clone()));
        Self {
            config,
            transcoder,
            file_ops: Box::new(StdFileOps),
        }
    }

    pub fn with_transcoder(mut self, transcoder: impl TranscodeTool + 'static) -> Self {
        self.transcoder = Box::new(transcoder);
        self
    }

    pub fn with_file_ops(mut self, file_ops: impl FileOps + 'static) -> Self {
        self.file_ops = Box::new(file_ops);
        self
    }

    pub fn config(&self) -> &SanitizerConfig {
        &self.config
    }

    /// Limpia un archivo. Siempre devuelve un veredicto, nunca un error.
    pub fn sanitize(&self, path: &Path, hint: CategoryHint) -> SanitizationResult {
        let category = match hint {
            CategoryHint::Auto => classify_path(path),
            CategoryHint::Declared(category) => category,
        };
        let span = info_span!("sanitize", path = %path.display(), %category);
        let _guard = span.enter();

        let strategy = Strategy::select(category, path);
        let outcome = match strategy {
            Some(strategy) => self.run(strategy, path),
            None => Err(SanitizeError::ClassificationUnknown {
                file_name: path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            }),
        };

        let result = SanitizationResult {
            path: path.to_path_buf(),
            succeeded: outcome.is_ok(),
            strategy_applied: category,
            is_stubbed_noop: strategy.is_some_and(Strategy::is_stub),
            error: outcome.err(),
        };

        match &result.error {
            None => info!(stubbed = result.is_stubbed_noop, "archivo saneado"),
            Some(error) if result.original_lost() => {
                warn!(%error, "pérdida de datos: el original ya no existe")
            }
            Some(error) => info!(%error, "no se pudo sanear el archivo"),
        }

        result
    }

    /// Procesa los archivos en orden, uno a la vez.
    pub fn sanitize_all<I, P>(&self, paths: I, hint: CategoryHint) -> Vec<SanitizationResult>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        paths
            .into_iter()
            .map(|path| self.sanitize(path.as_ref(), hint))
            .collect()
    }

    fn run(&self, strategy: Strategy, path: &Path) -> SanitizeResult<()> {
        replace_in_place(
            self.file_ops.as_ref(),
            self.config.replace_mode,
            path,
            |temp| {
                panic::catch_unwind(AssertUnwindSafe(|| self.produce(strategy, path, temp)))
                    .unwrap_or_else(|payload| {
                        Err(SanitizeError::Panicked {
                            message: panic_message(payload.as_ref()),
                        })
                    })
            },
        )
    }

    fn produce(&self, strategy: Strategy, source: &Path, temp: &Path) -> SanitizeResult<()> {
        match strategy {
            Strategy::Image => image::strip_image_metadata(source, temp, self.config.jpeg_quality),
            Strategy::Audio | Strategy::Video => {
                media::strip_media_metadata(self.transcoder.as_ref(), source, temp)
            }
            Strategy::Pdf => pdf::strip_pdf_metadata(source, temp),
            Strategy::Document => office::strip_document_metadata(source, temp),
            Strategy::Epub => ebook::strip_epub_metadata(source, temp),
            Strategy::Zip => archive::strip_zip_metadata(source, temp),
            Strategy::Tar => archive::strip_tar_metadata(source, temp),
            Strategy::Gzip => archive::recompress_gzip(source, temp),
            Strategy::Bzip2 => archive::recompress_bzip2(source, temp),
            Strategy::Xz => archive::recompress_xz(source, temp),
            Strategy::Fallback => fallback::copy_verified(source, temp),
        }
    }
}

/// Limpia un archivo con la configuración tomada del entorno.
pub fn sanitize(path: &Path, hint: CategoryHint) -> SanitizationResult {
    Sanitizer::new(SanitizerConfig::from_env()).sanitize(path, hint)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "pánico sin mensaje".to_string()
    }
}

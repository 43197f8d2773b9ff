use anyhow::{Context, Result};
use clap::Parser;
use metascrub::{
    Category, CategoryHint, ReplaceMode, SanitizationResult, SanitizeError, Sanitizer,
    SanitizerConfig, supported_extensions,
};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use crate::ui;

/// Elimina la metadata identificable de los archivos indicados, en sitio.
#[derive(Debug, Parser)]
#[command(name = "metascrub", version)]
pub struct Args {
    /// Categoría aplicada a todos los archivos; `auto` la deduce de la extensión.
    #[arg(
        long,
        value_name = "CATEGORÍA",
        default_value = "auto",
        long_help = category_help()
    )]
    category: CategoryHint,

    /// Programa de transcodificación para audio y video.
    #[arg(long, value_name = "PROGRAMA")]
    ffmpeg: Option<PathBuf>,

    /// `atomic` o `delete-then-rename`.
    #[arg(long, value_name = "MODO")]
    replace_mode: Option<ReplaceMode>,

    /// Imprime los resultados como JSON.
    #[arg(long)]
    json: bool,

    /// Recorre los directorios y limpia todos sus archivos.
    #[arg(short, long)]
    recursive: bool,

    /// Muestra el detalle de cada paso en stderr.
    #[arg(short, long)]
    verbose: bool,

    #[arg(required = true, value_name = "RUTAS")]
    paths: Vec<PathBuf>,
}

impl Args {
    /// Los argumentos tienen prioridad sobre el entorno.
    fn config(&self) -> SanitizerConfig {
        let mut config = SanitizerConfig::from_env();
        if let Some(program) = &self.ffmpeg {
            config.ffmpeg_program = program.clone();
        }
        if let Some(mode) = self.replace_mode {
            config.replace_mode = mode;
        }
        config
    }
}

/// Devuelve `true` cuando todos los archivos quedaron limpios.
pub fn run() -> Result<bool> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let sanitizer = Sanitizer::new(args.config());
    debug!(config = ?sanitizer.config(), "configuración efectiva");

    let results: Vec<SanitizationResult> = expand_targets(&args.paths, args.recursive)
        .into_iter()
        .map(|target| match target {
            Target::File(path) => sanitizer.sanitize(&path, args.category),
            Target::Rejected(result) => result,
        })
        .collect();

    if args.json {
        ui::print_json(&results).context("No se pudo serializar el resultado")?;
    } else {
        ui::render_header();
        ui::render_results(&results);
        ui::render_summary(&results);
    }

    Ok(results.iter().all(|result| result.succeeded))
}

/// Ayuda extendida de `--category`: una línea por categoría con sus extensiones.
fn category_help() -> String {
    let mut help = String::from(
        "Categoría aplicada a todos los archivos; `auto` la deduce de la extensión.\n",
    );
    for category in Category::ALL {
        let extensions = supported_extensions(category);
        if extensions.is_empty() {
            continue;
        }
        help.push_str(&format!(
            "\n  {:<9} {}",
            category.as_str(),
            extensions.join(", ")
        ));
    }
    help
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

#[derive(Debug)]
enum Target {
    File(PathBuf),
    Rejected(SanitizationResult),
}

fn expand_targets(paths: &[PathBuf], recursive: bool) -> Vec<Target> {
    let mut targets = Vec::new();

    for path in paths {
        if !path.is_dir() {
            targets.push(Target::File(path.clone()));
            continue;
        }

        if !recursive {
            targets.push(Target::Rejected(rejected_directory(path)));
            continue;
        }

        for entry in WalkDir::new(path).sort_by_file_name() {
            match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    targets.push(Target::File(entry.into_path()))
                }
                Ok(_) => {}
                Err(error) => warn!(%error, "se omite una entrada del recorrido"),
            }
        }
    }

    targets
}

fn rejected_directory(path: &Path) -> SanitizationResult {
    SanitizationResult {
        path: path.to_path_buf(),
        succeeded: false,
        strategy_applied: Category::Unknown,
        is_stubbed_noop: false,
        error: Some(SanitizeError::NotARegularFile {
            path: path.to_path_buf(),
        }),
    }
}

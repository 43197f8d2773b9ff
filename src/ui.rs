use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Row, Table};
use console::style;
use metascrub::{FailureKind, SanitizationResult};
use std::io::{self, Write};

const HEADER_WIDTH: usize = 74;

pub fn render_header() {
    let border = "─".repeat(HEADER_WIDTH - 2);
    println!("\n{}", style(format!("┌{}┐", border)).cyan());
    println!(
        "{}",
        style(format!(
            "│ {:^inner_width$} │",
            "▸ metascrub · Limpieza de Metadata ◂",
            inner_width = HEADER_WIDTH - 4
        ))
        .cyan()
        .bold()
    );
    println!("{}\n", style(format!("└{}┘", border)).cyan());
}

pub fn render_results(results: &[SanitizationResult]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        header_cell("Archivo"),
        header_cell("Categoría"),
        header_cell("Estado"),
        header_cell("Detalle"),
    ]);

    for result in results {
        table.add_row(build_row(result));
    }

    println!("{table}");
}

pub fn render_summary(results: &[SanitizationResult]) {
    let cleaned = results.iter().filter(|result| result.succeeded).count();
    let stubbed = results
        .iter()
        .filter(|result| result.succeeded && result.is_stubbed_noop)
        .count();
    let failed = results.len() - cleaned;

    println!(
        "\n{} {}  {} {}  {} {}",
        style("Limpios:").bold(),
        style(cleaned).green(),
        style("Sin cambios:").bold(),
        style(stubbed).yellow(),
        style("Fallidos:").bold(),
        style(failed).red()
    );

    for result in results.iter().filter(|result| result.original_lost()) {
        eprintln!(
            "{} {}",
            style("⚠ Original perdido:").red().bold(),
            result.path.display()
        );
    }
}

pub fn print_json(results: &[SanitizationResult]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, results)?;
    writeln!(handle)
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
        .add_attribute(Attribute::Underlined)
}

fn build_row(result: &SanitizationResult) -> Row {
    let (status, color) = status_label(result);
    let detail = result
        .error
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| {
            if result.is_stubbed_noop {
                "Formato sin limpieza específica; copia verificada".to_string()
            } else {
                String::new()
            }
        });

    Row::from(vec![
        Cell::new(result.path.display()).fg(Color::Rgb {
            r: 160,
            g: 196,
            b: 255,
        }),
        Cell::new(result.strategy_applied),
        Cell::new(status).fg(color),
        Cell::new(detail),
    ])
}

fn status_label(result: &SanitizationResult) -> (&'static str, Color) {
    match (result.succeeded, result.is_stubbed_noop, result.failure_kind()) {
        (true, false, _) => ("Limpio", Color::Green),
        (true, true, _) => ("Sin cambios", Color::Yellow),
        (false, _, Some(FailureKind::OriginalLost)) => ("Original perdido", Color::Magenta),
        (false, _, Some(FailureKind::ClassificationUnknown)) => ("No soportado", Color::DarkGrey),
        (false, _, _) => ("Fallido", Color::Red),
    }
}

//! CLI tool for sheet-sdl: validates a spreadsheet against an SDL metadata
//! file and extracts its typed rows.
//!
//! Usage:
//!   sdl_extract <metadata.sdl> <workbook.xlsx>          # table output
//!   sdl_extract <metadata.sdl> <workbook.xlsx> --json    # NDJSON output

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as ClapParser;

use sheet_sdl::instance::{append_row, CellValue};
use sheet_sdl::providers::xlsx::XlsxWorkbook;
use sheet_sdl::sheet::Cell;
use sheet_sdl::{Parser as SdlParser, SdlResult};

#[derive(ClapParser, Debug)]
#[command(
    name = "sdl_extract",
    about = "Validate a spreadsheet against an SDL metadata description and extract its typed rows"
)]
struct Cli {
    /// Path to the SDL metadata file (declare-type/declare-header/declare-data directives)
    metadata: PathBuf,

    /// Path to the .xlsx workbook to validate and extract
    workbook: PathBuf,

    /// Emit one JSON array per row instead of a plain table
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> SdlResult<()> {
    let metadata_file = File::open(&cli.metadata)?;
    let mut parser = SdlParser::new(BufReader::new(metadata_file));
    let metadata = parser.parse()?.validate()?;

    let workbook = XlsxWorkbook::open(&cli.workbook)?;
    let mut instance = metadata.bind(&workbook);

    let mut rows = Vec::new();
    let warnings = instance.extract(&mut rows, append_row)?;

    for warning in &warnings {
        tracing::warn!(%warning, "extraction warning");
    }

    if cli.json {
        print_json(&rows);
    } else {
        print_table(&rows);
    }

    Ok(())
}

fn print_table<C: Cell>(rows: &[Vec<CellValue<'_, C>>]) {
    for row in rows {
        let rendered: Vec<String> = row
            .iter()
            .map(|cell| format!("{}={}", cell.name, cell.value()))
            .collect();
        println!("{}", rendered.join("\t"));
    }
}

fn print_json<C: Cell>(rows: &[Vec<CellValue<'_, C>>]) {
    for row in rows {
        let entries: Vec<serde_json::Value> = row
            .iter()
            .map(|cell| {
                serde_json::json!({
                    "name": cell.name,
                    "type": cell.type_tag.name(),
                    "value": cell.value(),
                })
            })
            .collect();
        println!("{}", serde_json::Value::Array(entries));
    }
}

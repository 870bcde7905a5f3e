//! Carload CLI - convert shipment spreadsheets
//!
//! # Main Commands
//!
//! ```bash
//! carload serve                     # Start HTTP server (port 3000)
//! carload clean export.xlsx         # Readable sheet for review
//! carload map processed.xlsx        # Import-template CSV
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! carload parse export.xlsx         # Decoded records as JSON
//! carload headers                   # Import template headers
//! carload rules                     # Header mapping table
//! ```

use carload::{
    clean, output_file_name, parse_file, rules_description, to_csv_bytes, to_xlsx_bytes, Config,
    Converter, HeaderMapping, PipelineKind, SheetStyle, ShipmentSchema, TemplateHeaders,
};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "carload")]
#[command(about = "Convert shipment exports to readable sheets and import-template CSV", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean and reorder an export for review
    Clean {
        /// Input spreadsheet or CSV
        input: PathBuf,

        /// Output file (.xlsx, or .csv for plain text; default: <Month>_<day>_readable.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Map a sheet onto the import template
    Map {
        /// Input spreadsheet or CSV
        input: PathBuf,

        /// Import template CSV (default: bundled template)
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Output file (default: <Month>_<day>_superdispatch.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Decode a file and output its records as JSON
    Parse {
        /// Input spreadsheet or CSV
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the import template headers and the rule filling each
    Headers {
        /// Import template CSV (default: bundled template)
        #[arg(short, long)]
        template: Option<PathBuf>,
    },

    /// Show the header mapping table
    Rules {
        /// Import template CSV (default: bundled template)
        #[arg(short, long)]
        template: Option<PathBuf>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: CARLOAD_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Import template CSV (default: CARLOAD_TEMPLATE or bundled)
        #[arg(short, long)]
        template: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_env();

    let result = match cli.command {
        Commands::Clean { input, output } => cmd_clean(&input, output.as_deref()),

        Commands::Map {
            input,
            template,
            output,
        } => cmd_map(&config.with_template(template), &input, output.as_deref()),

        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),

        Commands::Headers { template } => cmd_headers(&config.with_template(template)),

        Commands::Rules { template } => cmd_rules(&config.with_template(template)),

        Commands::Serve { port, template } => {
            cmd_serve(config.with_port(port).with_template(template)).await
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_clean(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Cleaning: {}", input.display());

    let parsed = parse_file(input)?;
    eprintln!("   Format: {}", parsed.format);
    eprintln!("   Rows: {}", parsed.table.len());
    eprintln!("   Columns: {}", parsed.table.headers().join(", "));

    let cleaned = clean(parsed.table, &ShipmentSchema::default());
    eprintln!("\n🧹 Kept columns: {}", cleaned.headers().join(", "));

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(output_file_name(PipelineKind::Readable, &Local::now())));

    let bytes = if has_extension(&path, "csv") {
        to_csv_bytes(&cleaned)?
    } else {
        to_xlsx_bytes(&cleaned, &SheetStyle::default())?
    };
    fs::write(&path, bytes)?;

    eprintln!("💾 Output written to: {}", path.display());
    Ok(())
}

fn cmd_map(
    config: &Config,
    input: &Path,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let converter = Converter::load(config.template_path.as_deref())?;
    for gap in converter.coverage_gaps() {
        eprintln!("⚠️  Mapped header '{}' is not in the template", gap);
    }

    let result = converter.convert_file(PipelineKind::Import, input)?;

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&result.file_name));
    fs::write(&path, &result.bytes)?;

    eprintln!("💾 {} rows written to: {}", result.table.len(), path.display());
    Ok(())
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing: {}", input.display());

    let parsed = parse_file(input)?;
    eprintln!("   Format: {}", parsed.format);
    eprintln!("   Columns: {}", parsed.table.headers().join(", "));
    eprintln!("✅ Parsed {} records", parsed.table.len());

    let json = serde_json::to_string_pretty(&parsed.table.to_records())?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_headers(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let template = TemplateHeaders::load(config.template_path.as_deref())?;
    let mapping = HeaderMapping::default();
    eprintln!("📋 {} headers ({})\n", template.len(), template.origin());
    for (i, resolved) in mapping.resolve(template.headers()).iter().enumerate() {
        println!("[{:2}] {:<28} <- {}", i + 1, resolved.header, resolved.rule);
    }
    Ok(())
}

fn cmd_rules(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let converter = Converter::load(config.template_path.as_deref())?;

    println!("{}\n", rules_description());
    let resolved = converter.mapping().resolve(converter.template().headers());
    println!("{}", serde_json::to_string_pretty(&resolved)?);

    let gaps = converter.coverage_gaps();
    if !gaps.is_empty() {
        eprintln!("\n⚠️  Mapped headers missing from the template: {}", gaps.join(", "));
    }
    Ok(())
}

async fn cmd_serve(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    carload::server::start_server(config).await
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

//! Cutlist CLI - Convert furniture cutting-list XML to tables
//!
//! # Main Commands
//!
//! ```bash
//! cutlist convert lista.xml -f xls -o out/   # Convert to a spreadsheet
//! cutlist serve                             # Start HTTP server (port 3000)
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! cutlist detect lista.xml     # Show which schema was recognized
//! cutlist inspect lista.xml    # Dump extracted pieces and modules as JSON
//! ```

use clap::{Parser, Subcommand};
use cutlist::{
    analyze, convert_file, read_source, ConvertOptions, FormatKind, ParseErrorPolicy,
    api::logs::LOG_BROADCASTER,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cutlist")]
#[command(about = "Convert furniture cutting-list XML to CSV or spreadsheet tables", long_about = None)]
struct Cli {
    /// Suppress progress logs on stderr
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full conversion pipeline: XML → pieces → modules → table
    Convert {
        /// Input XML file
        input: PathBuf,

        /// Output format (default: CUTLIST_FORMAT or csv)
        #[arg(short, long, value_enum)]
        format: Option<FormatKind>,

        /// Output base file name, without extension
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Output file or directory (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit a header-only table instead of failing on malformed XML
        #[arg(long)]
        lenient: bool,

        /// Repeat the module header inside modules longer than 15 pieces
        #[arg(long)]
        repeat_header: bool,

        /// Prefix delimited output with a byte-order mark
        #[arg(long)]
        bom: bool,
    },

    /// Show the detected document schema
    Detect {
        /// Input XML file
        input: PathBuf,
    },

    /// Dump extracted pieces grouped into modules
    Inspect {
        /// Input XML file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    LOG_BROADCASTER.set_quiet(cli.quiet);

    let result = match cli.command {
        Commands::Convert {
            input,
            format,
            name,
            output,
            lenient,
            repeat_header,
            bom,
        } => {
            let mut options = ConvertOptions::from_env();
            if let Some(format) = format {
                options.format = format;
            }
            if let Some(name) = name {
                options.file_name = name;
            }
            if lenient {
                options.on_parse_error = ParseErrorPolicy::HeaderOnly;
            }
            if repeat_header {
                options.repeat_long_module_header = true;
            }
            if bom {
                options.byte_order_mark = Some(true);
            }
            cmd_convert(&input, &options, output.as_deref())
        }

        Commands::Detect { input } => cmd_detect(&input),

        Commands::Inspect { input, output } => cmd_inspect(&input, output.as_deref()),

        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_convert(
    input: &Path,
    options: &ConvertOptions,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let conversion = convert_file(input, options)?;
    let payload = conversion.payload;

    match output {
        Some(dir) if dir.is_dir() => {
            let target = dir.join(&payload.suggested_file_name);
            fs::write(&target, &payload.content)?;
            eprintln!("💾 Output written to: {}", target.display());
        }
        Some(path) => {
            fs::write(path, &payload.content)?;
            eprintln!("💾 Output written to: {}", path.display());
        }
        None => print!("{}", payload.content),
    }

    Ok(())
}

fn cmd_detect(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let source = read_source(input)?;
    let strategy = cutlist::detect_str(&source.text)?;
    println!("{}", strategy);
    Ok(())
}

fn cmd_inspect(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Inspecting: {}", input.display());

    let source = read_source(input)?;
    eprintln!("   Encoding: {}", source.encoding);

    let analysis = analyze(&source.text)?;
    eprintln!("   Strategy: {}", analysis.strategy);
    eprintln!(
        "   {} pieces in {} modules ({} excluded)",
        analysis.piece_count(),
        analysis.modules.len(),
        analysis.excluded
    );

    let json = serde_json::to_string_pretty(&analysis)?;
    write_output(&json, output)?;

    Ok(())
}

async fn cmd_serve(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    cutlist::server::start_server(port).await
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

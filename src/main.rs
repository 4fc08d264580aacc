use clap::{Args, Parser, Subcommand};
use folder2doc::config;
use folder2doc::convert::{self, ConvertEvent, OutputFormat, RunContext};
use folder2doc::extract::{self, DEFAULT_OUTPUT_DIR};
use folder2doc::logging::{self, LogConfig};
use folder2doc::{output, scan};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

#[derive(Parser)]
#[command(name = "folder2doc")]
#[command(about = "Turn a folder of image subfolders into an Excel, Word or PDF document")]
#[command(long_about = "\
Turn a folder of image subfolders into an Excel, Word or PDF document

Every immediate subfolder that holds images becomes a sheet, a heading or a
PDF section, in name order. Files in the root itself and deeper folders are
ignored.

  photos/
  ├── folder2doc.toml      # Optional layout overrides
  ├── 2023 Summer/         # Section 1
  │   ├── beach.jpg
  │   └── hotel.png
  ├── Empty/               # No images: skipped
  └── Receipts/            # Section 2
      └── scan-001.tiff

Recognized images: jpg jpeg png gif bmp tiff webp (any case).

Run 'folder2doc gen-config' to print a documented config file.")]
#[command(version)]
struct Cli {
    /// Layout config file (default: folder2doc.toml in the source folder)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

/// Shared arguments of the three conversion commands.
#[derive(Args, Clone)]
struct ConvertArgs {
    /// Folder whose subfolders hold the images
    source: PathBuf,

    /// Output file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Build an Excel workbook, one sheet per subfolder
    Excel(ConvertArgs),
    /// Build a Word document, one heading per subfolder
    Word(ConvertArgs),
    /// Build a PDF with a contents page and one section per subfolder
    Pdf(ConvertArgs),
    /// Extract embedded images from a PDF
    Extract {
        /// PDF file to read
        pdf: PathBuf,

        /// Directory for the extracted images
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output: PathBuf,
    },
    /// List what a conversion would include, without writing anything
    Scan {
        /// Folder whose subfolders hold the images
        source: PathBuf,

        /// Print the scan result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a stock folder2doc.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let log = LogConfig::from_flags(cli.verbose, cli.quiet);

    match cli.command {
        Command::Excel(args) => run_convert(OutputFormat::Excel, args, cli.config.as_deref(), log)?,
        Command::Word(args) => run_convert(OutputFormat::Word, args, cli.config.as_deref(), log)?,
        Command::Pdf(args) => run_convert(OutputFormat::Pdf, args, cli.config.as_deref(), log)?,
        Command::Extract { pdf, output: out } => {
            let report = logging::scoped(&log, || extract::extract(&pdf, &out))?;
            output::print_extract_report(&report);
        }
        Command::Scan { source, json } => {
            let result = logging::scoped(&log, || scan::scan(&source))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                output::print_scan_output(&result);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Run one conversion on a worker thread and print its progress here.
fn run_convert(
    format: OutputFormat,
    args: ConvertArgs,
    config_path: Option<&Path>,
    log: LogConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = logging::scoped(&log, || config::load_config(config_path, &args.source))?;
    let output_path = args
        .output
        .unwrap_or_else(|| PathBuf::from(format.default_output()));

    let (tx, rx) = mpsc::channel::<ConvertEvent>();
    let worker = std::thread::spawn(move || {
        logging::scoped(&log, || {
            convert::convert_folder(
                format,
                &args.source,
                &output_path,
                &config,
                &RunContext::with_events(tx),
            )
        })
    });

    for event in rx {
        for line in output::format_convert_event(&event) {
            println!("{}", line);
        }
    }

    let report = worker
        .join()
        .map_err(|_| "conversion worker panicked")??;
    output::print_convert_report(&report);
    Ok(())
}

//! Data Sweeper CLI - Clean, chart and convert CSV and Excel files
//!
//! # Commands
//!
//! ```bash
//! datasweeper serve                          # Start HTTP server (port 3000)
//! datasweeper inspect data.csv --rows 10     # Types, preview and a chart
//! datasweeper convert a.csv b.xlsx --to excel --dedup --fill-missing
//! ```

use clap::{Parser, Subcommand};
use datasweeper::{
    parse_file, run_paths, ChartRenderer, FileOutcome, PipelineOptions, ServerConfig, TableFormat,
    TextChartRenderer, Visualization,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "datasweeper")]
#[command(about = "Clean, visualize and convert CSV and Excel files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server
    Serve {
        /// Port to listen on (default: DATASWEEPER_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory of the built frontend to serve
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Show file info, column types and a preview
    Inspect {
        /// Input CSV or XLSX files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Number of preview rows
        #[arg(long, default_value = "5")]
        rows: usize,

        /// Draw a bar chart of this numeric column
        #[arg(long)]
        chart: Option<String>,
    },

    /// Clean and convert files
    Convert {
        /// Input CSV or XLSX files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format: csv or excel
        #[arg(long)]
        to: TableFormat,

        /// Remove duplicate rows
        #[arg(long)]
        dedup: bool,

        /// Fill missing numeric values with the column mean
        #[arg(long)]
        fill_missing: bool,

        /// Columns to keep, comma separated (default: all)
        #[arg(long, value_delimiter = ',')]
        columns: Option<Vec<String>>,

        /// Output directory (default: current directory)
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::from_env();

    let result = match cli.command {
        Commands::Serve { port, static_dir } => cmd_serve(config, port, static_dir).await,

        Commands::Inspect { files, rows, chart } => cmd_inspect(&files, rows, chart.as_deref()),

        Commands::Convert {
            files,
            to,
            dedup,
            fill_missing,
            columns,
            out_dir,
        } => {
            let options = PipelineOptions {
                remove_duplicates: dedup,
                fill_missing,
                columns,
                export: Some(to),
                ..PipelineOptions::default()
            };
            cmd_convert(&files, &options, &out_dir)
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_serve(
    mut config: ServerConfig,
    port: Option<u16>,
    static_dir: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(port) = port {
        config.port = port;
    }
    if static_dir.is_some() {
        config.static_dir = static_dir;
    }
    datasweeper::server::start_server(config).await
}

fn cmd_inspect(files: &[PathBuf], rows: usize, chart: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let mut failed = 0;

    for path in files {
        let (file, parsed) = match parse_file(path) {
            Ok(parsed) => parsed,
            Err(e) => {
                eprintln!("❌ {}: {}", path.display(), e);
                failed += 1;
                continue;
            }
        };
        let table = &parsed.table;

        println!("📄 {} ({:.2} KB, {})", file.name, file.size_kb(), parsed.format.label());
        if let Some(ref encoding) = parsed.encoding {
            println!("   Encoding: {}", encoding);
        }
        println!("   Rows: {}", table.row_count());
        println!("   Columns:");
        for column in table.summary() {
            println!("     - {} ({}, {} missing)", column.name, column.kind, column.missing);
        }

        println!("\n   🔍 Preview");
        println!("   {}", table.column_names().join(" | "));
        for row in table.head(rows).rows() {
            let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            println!("   {}", cells.join(" | "));
        }

        if chart.is_some() || !table.numeric_columns().is_empty() {
            match datasweeper::visualize(table, chart) {
                Ok(Visualization::Chart { chart }) => {
                    println!();
                    let mut renderer = TextChartRenderer::new(std::io::stdout());
                    renderer.render_bar_chart(&chart);
                }
                Ok(Visualization::Skipped { warning }) => println!("\n   ⚠️  {}", warning),
                Err(e) => {
                    eprintln!("❌ {}: {}", file.name, e);
                    failed += 1;
                }
            }
        }
        println!();
    }

    if failed > 0 {
        return Err(format!("{} of {} files failed", failed, files.len()).into());
    }
    Ok(())
}

fn cmd_convert(files: &[PathBuf], options: &PipelineOptions, out_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(out_dir)?;

    let outcomes = run_paths(files, options);
    let mut failed = 0;

    for outcome in &outcomes {
        match outcome {
            FileOutcome::Processed(report) => {
                if let Some(ref artifact) = report.export {
                    let target = out_dir.join(&artifact.file_name);
                    fs::write(&target, &artifact.bytes)?;
                    eprintln!("💾 {} → {}", report.name, target.display());
                }
            }
            FileOutcome::Failed { name, error } => {
                eprintln!("❌ {}: {}", name, error);
                failed += 1;
            }
        }
    }

    eprintln!(
        "\n✨ Done! {} converted, {} failed",
        outcomes.len() - failed,
        failed
    );

    if failed > 0 {
        return Err(format!("{} of {} files failed", failed, outcomes.len()).into());
    }
    Ok(())
}

//! Tenor CLI binary.
//!
//! Loads the rate curve, asset prices, durations and convexity once, then
//! prints one dashboard section or exports the filtered returns.

mod cli;
mod render;

use clap::Parser;
use cli::{Cli, Commands, OutputFormat};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tenor::data::InputFiles;
use tenor::output::{ExportFormat, Exporter, FilteredReturnsExport};
use tenor::{DashboardConfig, DateWindow, Section, Selection, Snapshot};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    init_logging();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = DashboardConfig::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }

    let snapshot = load_snapshot(&config.input_files())?;

    let assets = if cli.assets.is_empty() {
        snapshot
            .available_assets()
            .into_iter()
            .take(config.default_asset_count)
            .collect()
    } else {
        cli.assets.clone()
    };
    let window = DateWindow::from_bounds(cli.start, cli.end, snapshot.date_range()?)?;
    let selection = Selection::new(assets, window);

    let section = match cli.command {
        Commands::Overview => Section::Overview,
        Commands::Explore => Section::DataExplorer,
        Commands::Analytics => Section::AnalyticsAndRisk,
        Commands::Charts => Section::ChartsAndVisualization,
        Commands::Export { output, json } => {
            return export(&snapshot, &selection, output, json, &config);
        }
        Commands::Assets => {
            let listing = render::render_assets(
                &snapshot.available_assets(),
                snapshot.date_range()?,
                cli.format,
            )?;
            println!("{listing}");
            return Ok(());
        }
    };

    let filtered = snapshot.filter(&selection)?;
    let view = section.build(&snapshot, &filtered, &config.view_options())?;
    if cli.format == OutputFormat::Text {
        println!("\n{}", section.title().to_uppercase());
    }
    println!("{}", render::render_view(&view, &filtered, cli.format)?);

    Ok(())
}

fn load_snapshot(files: &InputFiles) -> Result<Snapshot, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    let loaded = Snapshot::load_with(files, |kind| {
        pb.set_message(format!("Reading {}...", files.file_name(kind)));
    });

    match loaded {
        Ok(snapshot) => {
            pb.finish_with_message(format!(
                "Loaded {} assets from {}",
                snapshot.available_assets().len(),
                files.directory().display()
            ));
            Ok(snapshot)
        }
        Err(e) => {
            pb.finish_and_clear();
            Err(e.into())
        }
    }
}

fn export(
    snapshot: &Snapshot,
    selection: &Selection,
    output: Option<PathBuf>,
    json: bool,
    config: &DashboardConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let format = if json {
        ExportFormat::PrettyJson
    } else {
        ExportFormat::Csv
    };
    let path = output.unwrap_or_else(|| config.export_path.with_extension(format.extension()));

    let filtered = snapshot.filter(selection)?;
    let export = FilteredReturnsExport::from_table(filtered.table())?;
    export.export_to_file(&path, format)?;

    info!(path = %path.display(), rows = export.rows.len(), "exported filtered returns");
    println!(
        "Wrote {} rows for {} assets to {}",
        export.rows.len(),
        export.assets.len(),
        path.display()
    );
    Ok(())
}

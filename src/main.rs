//! page2pdf CLI - capture a page region and export it as a paginated PDF

use std::path::PathBuf;

use clap::Parser;

use page2pdf::export::{ExportJob, OUTPUT_FILENAME};
use page2pdf::prefs::{self, Theme};
use page2pdf::{Capture, ExportConfig, Region};

#[derive(Parser)]
#[command(name = "page2pdf")]
#[command(version)]
#[command(about = "Export a rendered page region as a paginated PDF", long_about = None)]
struct Cli {
    /// URL of the document to capture
    #[arg(long, conflicts_with = "input")]
    url: Option<String>,

    /// Local HTML file to capture
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// CSS selector of the region to export
    #[arg(long, default_value = "main")]
    selector: String,

    /// Output file
    #[arg(short, long, value_name = "FILE", default_value = OUTPUT_FILENAME)]
    output: PathBuf,

    /// Switch the presentation theme and persist the choice
    #[arg(long, value_enum)]
    theme: Option<ThemeArg>,

    /// Preference file location
    #[arg(long, value_name = "FILE", default_value = "page2pdf-prefs.json")]
    prefs: PathBuf,

    /// Print the export report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ThemeArg {
    Light,
    Dark,
}

fn run(cli: &Cli) -> page2pdf::Result<()> {
    // Read the persisted preferences at startup; a broken file falls back
    // to defaults rather than blocking the export.
    if let Err(err) = prefs::init(&cli.prefs) {
        log::warn!("ignoring preferences: {}", err);
    }
    if let Some(theme) = cli.theme {
        let theme = match theme {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        };
        if let Err(err) = prefs::set_theme(theme) {
            log::warn!("could not persist theme: {}", err);
        }
    }

    let config = ExportConfig {
        theme: prefs::current().theme,
        ..Default::default()
    };
    let mut capture = page2pdf::new_capture(config)?;

    match (&cli.url, &cli.input) {
        (Some(url), _) => capture.load_url(url)?,
        (None, Some(path)) => {
            let html = std::fs::read_to_string(path).map_err(|e| {
                page2pdf::Error::LoadError(format!("failed to read {}: {}", path.display(), e))
            })?;
            capture.load_html(&html)?;
        }
        (None, None) => {
            return Err(page2pdf::Error::ConfigError(
                "either --url or --input is required".into(),
            ))
        }
    }

    let region = Region::Selector(cli.selector.clone());
    let report = ExportJob::new(&mut capture).run(&region, &cli.output)?;
    capture.close()?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).unwrap_or_default()
        );
    } else {
        println!(
            "{} page(s) ({} bytes) -> {}",
            report.pages,
            report.bytes_written,
            cli.output.display()
        );
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        log::error!("{}", err);
        eprintln!("{}", err.user_message());
        std::process::exit(1);
    }
}

use std::{fs, path::PathBuf};

use clap::{Parser, Subcommand};

use apexline::{
    AnalysisConfig, ApexlineError, CornerWindow, analyze_lap,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze one lap's telemetry export and print the result as JSON
    Analyze {
        /// Raw telemetry export (CSV-like, any delimiter)
        #[arg(short, long)]
        input: PathBuf,

        /// Optional JSON file with the track's corner windows
        #[arg(short, long)]
        corners: Option<PathBuf>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },
}

fn analyze(input: &PathBuf, corners: Option<&PathBuf>, pretty: bool) -> Result<(), ApexlineError> {
    if !input.exists() {
        return Err(ApexlineError::InvalidExportFile {
            path: format!("{input:?}"),
        });
    }
    let content =
        fs::read_to_string(input).map_err(|e| ApexlineError::ExportIOError { source: e })?;
    let lines: Vec<String> = content.lines().map(str::to_owned).collect();

    let windows: Option<Vec<CornerWindow>> = match corners {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| ApexlineError::CornerWindowIOError { source: e })?;
            Some(
                serde_json::from_str(&text)
                    .map_err(|e| ApexlineError::CornerWindowParseError { source: e })?,
            )
        }
        None => None,
    };

    let analysis = analyze_lap(&lines, windows.as_deref(), &AnalysisConfig::default())?;
    let output = if pretty {
        serde_json::to_string_pretty(&analysis)
    } else {
        serde_json::to_string(&analysis)
    };
    match output {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("could not serialize analysis: {e}"),
    }
    Ok(())
}

fn main() {
    colog::init();

    let cli = Args::parse();
    match &cli.command {
        Commands::Analyze {
            input,
            corners,
            pretty,
        } => {
            analyze(input, corners.as_ref(), *pretty)
                .expect("Error while analyzing telemetry export");
        }
    };
}

// Error types for apexline

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum ApexlineError {
    // Errors while normalizing a raw telemetry export. These abort the
    // whole lap: without a header, a time axis, or the kinematic channels
    // there is nothing to analyze.
    #[snafu(display("No header row (Time, Speed, ...) found in telemetry export"))]
    HeaderNotFound,
    #[snafu(display("No time column found (looked for time/time*/timestamp or a seconds unit)"))]
    TimeColumnNotFound,
    #[snafu(display("No parsable data rows left after dropping malformed lines"))]
    NoParsableRows,
    #[snafu(display("Required column missing from telemetry export: {column}"))]
    MissingRequiredColumn { column: String },

    // Errors for the CLI front-end
    #[snafu(display("Invalid telemetry export file: {path}"))]
    InvalidExportFile { path: String },
    #[snafu(display("Error reading telemetry export"))]
    ExportIOError { source: io::Error },
    #[snafu(display("Error reading corner windows file"))]
    CornerWindowIOError { source: io::Error },
    #[snafu(display("Error parsing corner windows file"))]
    CornerWindowParseError { source: serde_json::Error },
}

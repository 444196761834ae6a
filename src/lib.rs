// Library interface for apexline
// This allows integration tests to access internal modules

pub mod analysis;
pub mod config;
pub mod corners;
pub mod detect;
pub mod dynamics;
pub mod errors;
pub mod normalize;
pub mod series;
pub mod summary;

// Re-export commonly used types
pub use analysis::{LapAnalysis, analyze_lap};
pub use config::AnalysisConfig;
pub use corners::CornerWindow;
pub use detect::{Segment, SegmentKind};
pub use dynamics::{BrakingMetrics, EntryMetrics, ExitMetrics, SegmentMetrics};
pub use errors::ApexlineError;
pub use normalize::normalize_lines;
pub use series::{ChannelPresence, LapSeries, Sample, WheelValues};
pub use summary::LapSummary;

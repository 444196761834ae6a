// One-shot lap analysis pipeline: raw export lines in, enriched segments
// and a lap summary out.

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::corners::{CornerWindow, map_segment_to_corner};
use crate::detect::{Segment, detect_braking_zones, detect_corner_entries, detect_corner_exits};
use crate::dynamics::enrich_segment;
use crate::errors::ApexlineError;
use crate::normalize::normalize_lines;
use crate::series::LapSeries;
use crate::summary::{LapSummary, summarize_lap};

/// Everything one analysis invocation produces for a lap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LapAnalysis {
    pub series: LapSeries,
    pub braking_segments: Vec<Segment>,
    pub entry_segments: Vec<Segment>,
    pub exit_segments: Vec<Segment>,
    pub summary: LapSummary,
}

/// Run the full pipeline for one lap: normalize, detect the three segment
/// kinds, enrich each segment, map corners when a track layout was
/// supplied, and fold the braking segments into a summary.
///
/// Fatal preconditions (no header, no time column, missing kinematic
/// channels) surface as errors; everything after parsing degrades
/// gracefully, so an empty segment list with an empty summary is a valid
/// result.
pub fn analyze_lap(
    lines: &[String],
    corner_windows: Option<&[CornerWindow]>,
    config: &AnalysisConfig,
) -> Result<LapAnalysis, ApexlineError> {
    let series = normalize_lines(lines)?;

    let braking_segments = enrich(&series, detect_braking_zones(&series, config), config);
    let entry_segments = enrich(&series, detect_corner_entries(&series), config);
    let exit_segments = enrich(&series, detect_corner_exits(&series), config);

    let mut analysis = LapAnalysis {
        summary: summarize_lap(&braking_segments),
        series,
        braking_segments,
        entry_segments,
        exit_segments,
    };

    if let Some(windows) = corner_windows {
        for segment in analysis
            .braking_segments
            .iter_mut()
            .chain(analysis.entry_segments.iter_mut())
            .chain(analysis.exit_segments.iter_mut())
        {
            map_segment_to_corner(segment, windows);
        }
    }

    info!(
        "analyzed lap: {} samples, {} braking / {} entry / {} exit segments",
        analysis.series.len(),
        analysis.braking_segments.len(),
        analysis.entry_segments.len(),
        analysis.exit_segments.len()
    );
    Ok(analysis)
}

/// Enrich each detected segment, dropping the ones the dynamics calculator
/// skips. Detection order is ascending in time and is preserved.
fn enrich(series: &LapSeries, mut segments: Vec<Segment>, config: &AnalysisConfig) -> Vec<Segment> {
    segments.retain_mut(|segment| enrich_segment(series, segment, config));
    segments
}

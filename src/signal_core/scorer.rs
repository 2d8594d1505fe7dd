//! Convergence scoring for cross-source timelines
//!
//! Produces the 0-10 heuristic ranking of how tightly and how ideally a
//! Trinity ticker's three evidence sources line up. The ideal cascade is
//! Legislator first (policy visibility), then Insider (material
//! information), then Fund (deep diligence confirming last).

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EvidenceSource {
    #[serde(rename = "LEGISLATOR")]
    Legislator,
    #[serde(rename = "INSIDER")]
    Insider,
    #[serde(rename = "FUND")]
    Fund,
}

impl EvidenceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceSource::Legislator => "LEGISLATOR",
            EvidenceSource::Insider => "INSIDER",
            EvidenceSource::Fund => "FUND",
        }
    }
}

/// One source's anchor point on the convergence timeline
#[derive(Debug, Clone, Serialize)]
pub struct TimelinePoint {
    pub source: EvidenceSource,
    pub date: NaiveDate,
    pub count: usize,
}

const BASE_SCORE: i32 = 5;
const SEQUENTIAL_BONUS: i32 = 3;
const REVERSE_PENALTY: i32 = 1;
const TIGHT_WINDOW_BONUS: i32 = 2;
const BIPARTISAN_BONUS: i32 = 1;

pub struct ConvergenceScorer {
    tight_window_days: i64,
}

impl ConvergenceScorer {
    pub fn new(tight_window_days: i64) -> Self {
        Self { tight_window_days }
    }

    pub fn with_defaults() -> Self {
        Self::new(14)
    }

    /// Score a date-ascending three-point timeline
    ///
    /// Returns the clamped score and a human-readable pattern label.
    pub fn score(&self, timeline: &[TimelinePoint], bipartisan: bool) -> (u8, String) {
        let mut score = BASE_SCORE;
        let mut pattern = "CONCURRENT".to_string();

        if timeline.len() == 3 {
            let sequence: Vec<EvidenceSource> = timeline.iter().map(|p| p.source).collect();

            if sequence
                == [
                    EvidenceSource::Legislator,
                    EvidenceSource::Insider,
                    EvidenceSource::Fund,
                ]
            {
                score += SEQUENTIAL_BONUS;
                pattern = "SEQUENTIAL (Ideal)".to_string();
            } else if sequence
                == [
                    EvidenceSource::Fund,
                    EvidenceSource::Insider,
                    EvidenceSource::Legislator,
                ]
            {
                score -= REVERSE_PENALTY;
                pattern = "REVERSE".to_string();
            }

            let span_days = (timeline[2].date - timeline[0].date).num_days();
            if span_days <= self.tight_window_days {
                score += TIGHT_WINDOW_BONUS;
                pattern.push_str(&format!(" - TIGHT ({}d)", span_days));
            }
        }

        if bipartisan {
            score += BIPARTISAN_BONUS;
        }

        (score.clamp(0, 10) as u8, pattern)
    }
}

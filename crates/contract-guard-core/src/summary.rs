use serde::{Deserialize, Serialize};

use crate::catalog::Severity;
use crate::matcher::Match;

pub const SYNOPSIS_CLEAN: &str = "no critical points found";
pub const SYNOPSIS_ATTENTION: &str = "attention points found; review the flagged clauses";

/// Number of `High` matches that escalate the rating to `High`.
pub const HIGH_RATING_THRESHOLD: usize = 3;
/// Number of `High` matches that escalate the rating to `Medium`.
pub const MEDIUM_RATING_THRESHOLD: usize = 1;

/// Match counts per severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

/// Qualitative digest of a match list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub synopsis: String,
    pub severity_rating: Severity,
    /// Number of `High` severity matches.
    pub critical_count: usize,
    pub counts: SeverityCounts,
}

impl Summary {
    pub fn is_clean(&self) -> bool {
        self.counts == SeverityCounts::default()
    }
}

pub fn summarize(matches: &[Match]) -> Summary {
    let mut counts = SeverityCounts::default();
    for found in matches {
        match found.severity {
            Severity::High => counts.high += 1,
            Severity::Medium => counts.medium += 1,
            Severity::Low => counts.low += 1,
        }
    }

    if matches.is_empty() {
        return Summary {
            synopsis: SYNOPSIS_CLEAN.to_string(),
            severity_rating: Severity::Low,
            critical_count: 0,
            counts,
        };
    }

    let critical_count = counts.high;
    let severity_rating = if critical_count >= HIGH_RATING_THRESHOLD {
        Severity::High
    } else if critical_count >= MEDIUM_RATING_THRESHOLD {
        Severity::Medium
    } else {
        Severity::Low
    };

    Summary {
        synopsis: SYNOPSIS_ATTENTION.to_string(),
        severity_rating,
        critical_count,
        counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn found(severity: Severity) -> Match {
        Match {
            title: format!("{severity} clause"),
            severity,
            explanation: String::new(),
            suggestion: String::new(),
            evidence: String::new(),
        }
    }

    #[test]
    fn empty_list_is_clean() {
        let summary = summarize(&[]);
        assert_eq!(summary.synopsis, SYNOPSIS_CLEAN);
        assert_eq!(summary.severity_rating, Severity::Low);
        assert_eq!(summary.critical_count, 0);
        assert!(summary.is_clean());
    }

    #[test]
    fn three_high_matches_rate_high() {
        let mut matches = vec![found(Severity::High); 3];
        matches.push(found(Severity::Low));
        matches.push(found(Severity::Medium));
        let summary = summarize(&matches);
        assert_eq!(summary.severity_rating, Severity::High);
        assert_eq!(summary.critical_count, 3);
        assert_eq!(
            summary.counts,
            SeverityCounts {
                high: 3,
                medium: 1,
                low: 1
            }
        );
    }

    #[test]
    fn two_high_matches_rate_medium() {
        let summary = summarize(&[found(Severity::High), found(Severity::High)]);
        assert_eq!(summary.severity_rating, Severity::Medium);
        assert_eq!(summary.critical_count, 2);
        assert_eq!(summary.synopsis, SYNOPSIS_ATTENTION);
    }

    #[test]
    fn non_critical_matches_still_report_attention() {
        let summary = summarize(&[found(Severity::Medium), found(Severity::Low)]);
        assert_eq!(summary.severity_rating, Severity::Low);
        assert_eq!(summary.critical_count, 0);
        assert_eq!(summary.synopsis, SYNOPSIS_ATTENTION);
        assert!(!summary.is_clean());
    }
}

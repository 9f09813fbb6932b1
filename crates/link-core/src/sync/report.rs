//! Aggregated run report

use serde::Serialize;

use crate::link::{LinkAction, LinkOutcome};

/// Counts and outcomes of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub dry_run: bool,
    pub created: usize,
    pub skipped: usize,
    pub errors: usize,
    pub outcomes: Vec<LinkOutcome>,
}

impl SyncReport {
    pub fn from_outcomes(outcomes: Vec<LinkOutcome>, dry_run: bool) -> Self {
        let count = |action| outcomes.iter().filter(|o| o.action == action).count();
        Self {
            dry_run,
            created: count(LinkAction::Created),
            skipped: count(LinkAction::Skipped),
            errors: count(LinkAction::Error),
            outcomes,
        }
    }

    /// No outcome is an error.
    pub fn success(&self) -> bool {
        self.errors == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &LinkOutcome> {
        self.outcomes.iter().filter(|o| o.is_error())
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::reason;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    #[test]
    fn counts_each_action() {
        let (s, t) = (Path::new("/s/a"), Path::new("/t/a"));
        let report = SyncReport::from_outcomes(
            vec![
                LinkOutcome::created(s, t),
                LinkOutcome::created(s, t),
                LinkOutcome::skipped(s, t, reason::LOCAL_OVERRIDE),
                LinkOutcome::error(s, t, reason::SOURCE_MISSING),
            ],
            false,
        );

        assert_eq!((report.created, report.skipped, report.errors), (2, 1, 1));
        assert_eq!(report.total(), 4);
        assert!(!report.success());
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn empty_report_is_success() {
        assert!(SyncReport::from_outcomes(Vec::new(), true).success());
    }

    #[test]
    fn serializes_counts_and_outcomes() {
        let report = SyncReport::from_outcomes(
            vec![LinkOutcome::created(Path::new("/s/a"), Path::new("/t/a"))],
            true,
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["created"], 1);
        assert_eq!(json["dry_run"], true);
        assert_eq!(json["outcomes"][0]["action"], "created");
    }
}

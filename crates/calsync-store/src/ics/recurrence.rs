//! RRULE expansion.
//!
//! Rules are evaluated with the `rrule` crate from a UTC `DTSTART`. Every
//! expansion is capped at a fixed number of occurrences, so rules without
//! `COUNT` or `UNTIL` terminate.

use chrono::{DateTime, Utc};
use rrule::RRuleSet;

use calsync_core::format_compact;

use crate::error::{StoreError, StoreResult};

/// Upper bound on occurrences produced from one recurrence rule.
pub const MAX_OCCURRENCES: u16 = 1000;

/// Occurrence starts produced by a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    /// Occurrence start instants, in order.
    pub occurrences: Vec<DateTime<Utc>>,
    /// Whether the limit cut the rule short.
    pub truncated: bool,
}

/// Expands `rule` (an RRULE value such as `FREQ=DAILY;COUNT=5`) starting at
/// `start`, skipping `exdates`, yielding at most `limit` occurrences.
///
/// # Errors
///
/// Returns a `ParseError` if the rule cannot be parsed.
pub fn expand_rule(
    start: DateTime<Utc>,
    rule: &str,
    exdates: &[DateTime<Utc>],
    limit: u16,
) -> StoreResult<Expansion> {
    let mut lines = vec![
        format!("DTSTART:{}", format_compact(start)),
        format!("RRULE:{}", rule.trim()),
    ];
    lines.extend(
        exdates
            .iter()
            .map(|exdate| format!("EXDATE:{}", format_compact(*exdate))),
    );

    let set: RRuleSet = lines
        .join("\n")
        .parse()
        .map_err(|e| StoreError::parse(format!("invalid recurrence rule '{}': {}", rule, e)))?;

    let result = set.all(limit);
    Ok(Expansion {
        occurrences: result
            .dates
            .iter()
            .map(|dt| dt.with_timezone(&Utc))
            .collect(),
        truncated: result.limited,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn unbounded_daily_rule_is_capped() {
        let expansion = expand_rule(start(), "FREQ=DAILY", &[], MAX_OCCURRENCES).unwrap();
        assert_eq!(expansion.occurrences.len(), usize::from(MAX_OCCURRENCES));
        assert!(expansion.truncated);
        assert_eq!(expansion.occurrences[0], start());
        assert_eq!(
            expansion.occurrences[999],
            start() + Duration::days(999)
        );
    }

    #[test]
    fn count_bounded_rule() {
        let expansion = expand_rule(start(), "FREQ=WEEKLY;COUNT=3", &[], MAX_OCCURRENCES).unwrap();
        assert_eq!(
            expansion.occurrences,
            vec![start(), start() + Duration::weeks(1), start() + Duration::weeks(2)]
        );
        assert!(!expansion.truncated);
    }

    #[test]
    fn count_above_limit_is_truncated() {
        let expansion =
            expand_rule(start(), "FREQ=DAILY;COUNT=5000", &[], MAX_OCCURRENCES).unwrap();
        assert_eq!(expansion.occurrences.len(), usize::from(MAX_OCCURRENCES));
        assert!(expansion.truncated);
    }

    #[test]
    fn count_at_limit_is_complete() {
        let expansion =
            expand_rule(start(), "FREQ=DAILY;COUNT=1000", &[], MAX_OCCURRENCES).unwrap();
        assert_eq!(expansion.occurrences.len(), 1000);
    }

    #[test]
    fn unbounded_secondly_rule_is_capped() {
        let expansion = expand_rule(start(), "FREQ=SECONDLY", &[], MAX_OCCURRENCES).unwrap();
        assert_eq!(expansion.occurrences.len(), usize::from(MAX_OCCURRENCES));
        assert!(expansion.truncated);
        assert_eq!(expansion.occurrences[999], start() + Duration::seconds(999));
    }

    #[test]
    fn until_bounded_rule() {
        let expansion = expand_rule(
            start(),
            "FREQ=DAILY;UNTIL=20240105T090000Z",
            &[],
            MAX_OCCURRENCES,
        )
        .unwrap();
        assert_eq!(expansion.occurrences.len(), 5);
    }

    #[test]
    fn exdates_are_skipped() {
        let skipped = start() + Duration::days(1);
        let expansion =
            expand_rule(start(), "FREQ=DAILY;COUNT=3", &[skipped], MAX_OCCURRENCES).unwrap();
        assert_eq!(expansion.occurrences.len(), 2);
        assert!(!expansion.occurrences.contains(&skipped));
    }

    #[test]
    fn smaller_limit_applies() {
        let expansion = expand_rule(start(), "FREQ=HOURLY", &[], 10).unwrap();
        assert_eq!(expansion.occurrences.len(), 10);
    }

    #[test]
    fn invalid_rule_is_a_parse_error() {
        let err = expand_rule(start(), "FREQ=SOMETIMES", &[], MAX_OCCURRENCES).unwrap_err();
        assert_eq!(err.code(), crate::error::StoreErrorCode::ParseError);
    }
}

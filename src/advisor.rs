use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

use crate::attendance::{reconstruct_by_group, reconstruct_by_slot};
use crate::models::{
    AttendanceRecord, AttendanceSummary, BunkSuggestion, ClassSlot, Holiday, SuggestionType,
};

pub const NO_CLASSES_MESSAGE: &str = "No classes recorded yet.";
pub const INVALID_TARGET_MESSAGE: &str =
    "Set a target percentage between 0 and 100 to get a suggestion.";

#[derive(Debug, Error, PartialEq)]
pub enum TargetError {
    #[error("target percentage must be strictly between 0 and 100, got {0}")]
    OutOfRange(f64),
}

/// Accepts targets in the open interval (0, 100); the bunk arithmetic divides by
/// both the target and its complement.
pub fn validate_target(target: f64) -> Result<f64, TargetError> {
    if target > 0.0 && target < 100.0 {
        Ok(target)
    } else {
        Err(TargetError::OutOfRange(target))
    }
}

pub fn advise_group(
    name: &str,
    slots: &[ClassSlot],
    records: &[AttendanceRecord],
    target_percentage: f64,
    holidays: &[Holiday],
    as_of: NaiveDate,
) -> BunkSuggestion {
    let summary = reconstruct_by_group(name, slots, records, holidays, as_of);
    advise_summary(&summary, target_percentage)
}

pub fn advise_slot(
    slot_id: &str,
    slots: &[ClassSlot],
    records: &[AttendanceRecord],
    target_percentage: f64,
    holidays: &[Holiday],
    as_of: NaiveDate,
) -> BunkSuggestion {
    let summary = reconstruct_by_slot(slot_id, slots, records, holidays, as_of);
    advise_summary(&summary, target_percentage)
}

/// Turns a reconstructed summary into a recommendation against `target_percentage`.
///
/// Safe branch: the number of further absences (each growing the total by one)
/// that keep attendance at or above target. Danger branch: the number of
/// consecutive attendances needed to climb back to target. Both are computed in
/// percentage units so whole-number targets floor and ceil exactly.
pub fn advise_summary(summary: &AttendanceSummary, target_percentage: f64) -> BunkSuggestion {
    let (suggestion, suggestion_type) = suggest(summary, target_percentage);
    debug!(
        percentage = summary.percentage,
        target = target_percentage,
        ?suggestion_type,
        "computed bunk suggestion"
    );

    BunkSuggestion {
        attended: summary.attended,
        bunked: summary.bunked,
        total: summary.total,
        percentage: summary.percentage,
        suggestion,
        suggestion_type,
    }
}

fn suggest(summary: &AttendanceSummary, target: f64) -> (String, SuggestionType) {
    if summary.total == 0 {
        return (NO_CLASSES_MESSAGE.to_string(), SuggestionType::Neutral);
    }
    if validate_target(target).is_err() {
        return (INVALID_TARGET_MESSAGE.to_string(), SuggestionType::Neutral);
    }

    let attended = f64::from(summary.attended) * 100.0;
    let total = f64::from(summary.total);

    if summary.percentage >= target {
        let bunks_allowed = ((attended - target * total) / target).floor();
        if bunks_allowed > 0.0 {
            let count = bunks_allowed as u64;
            (
                format!("You can safely bunk {count} more {}.", classes(count)),
                SuggestionType::Safe,
            )
        } else {
            (
                "You are just above the target. Don't bunk the next class.".to_string(),
                SuggestionType::Safe,
            )
        }
    } else {
        let required = ((target * total - attended) / (100.0 - target)).ceil();
        if required > 0.0 {
            let count = required as u64;
            (
                format!(
                    "You must attend the next {count} {} to reach {target}%.",
                    classes(count)
                ),
                SuggestionType::Danger,
            )
        } else {
            (
                "You are below the target. Attend the next class.".to_string(),
                SuggestionType::Danger,
            )
        }
    }
}

fn classes(count: u64) -> &'static str {
    if count == 1 {
        "class"
    } else {
        "classes"
    }
}

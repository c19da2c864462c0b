use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::grouping::{group_subjects, same_subject};
use crate::models::{
    AttendanceRecord, AttendanceStatus, AttendanceSummary, ClassSlot, Holiday, SkipProjection,
    Standing,
};

/// Reconstructs attendance for every slot sharing `name` (case and whitespace
/// insensitive).
pub fn reconstruct_by_group(
    name: &str,
    slots: &[ClassSlot],
    records: &[AttendanceRecord],
    holidays: &[Holiday],
    as_of: NaiveDate,
) -> AttendanceSummary {
    let selected: Vec<&ClassSlot> = slots
        .iter()
        .filter(|slot| same_subject(&slot.name, name))
        .collect();
    let summary = reconstruct_selected(&selected, records, holidays, as_of);
    debug!(subject = name, slots = selected.len(), ?summary, "reconstructed group");
    summary
}

/// Reconstructs attendance for the single slot with `slot_id`.
pub fn reconstruct_by_slot(
    slot_id: &str,
    slots: &[ClassSlot],
    records: &[AttendanceRecord],
    holidays: &[Holiday],
    as_of: NaiveDate,
) -> AttendanceSummary {
    let selected: Vec<&ClassSlot> = slots.iter().filter(|slot| slot.id == slot_id).collect();
    let summary = reconstruct_selected(&selected, records, holidays, as_of);
    debug!(slot = slot_id, ?summary, "reconstructed slot");
    summary
}

fn reconstruct_selected(
    selected: &[&ClassSlot],
    records: &[AttendanceRecord],
    holidays: &[Holiday],
    as_of: NaiveDate,
) -> AttendanceSummary {
    if selected.is_empty() {
        return AttendanceSummary::default();
    }

    let mut attended = 0u32;
    let mut bunked = 0u32;
    for record in records
        .iter()
        .filter(|record| selected.iter().any(|slot| slot.id == record.subject_id))
    {
        match record.status {
            AttendanceStatus::Present => attended += 1,
            AttendanceStatus::Absent => bunked += 1,
        }
    }

    // The first mark anywhere in the system opens the term for every subject.
    let Some(start) = term_start(records) else {
        return AttendanceSummary::default();
    };

    let mut per_weekday = [0u32; 7];
    for slot in selected {
        if let Some(count) = per_weekday.get_mut(usize::from(slot.day)) {
            *count += 1;
        }
    }

    let scheduled = scheduled_classes(&per_weekday, start, as_of, holidays);
    let total = scheduled.max(attended + bunked);

    AttendanceSummary {
        attended,
        total,
        bunked,
        percentage: percentage_of(attended, total),
    }
}

/// Earliest record date across all records, the inferred start of term.
pub fn term_start(records: &[AttendanceRecord]) -> Option<NaiveDate> {
    records.iter().map(|record| record.date).min()
}

/// 0 = Sunday through 6 = Saturday, matching `ClassSlot::day`.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Number of dates in `start..=end` falling on `weekday`.
pub fn weekday_occurrences(start: NaiveDate, end: NaiveDate, weekday: u8) -> u32 {
    if end < start || weekday > 6 {
        return 0;
    }

    let days = (end - start).num_days() + 1;
    let offset = (i64::from(weekday) - i64::from(weekday_index(start))).rem_euclid(7);
    let extra = if offset < days % 7 { 1 } else { 0 };
    (days / 7 + extra) as u32
}

/// Class occurrences in `start..=end` for the given per-weekday slot counts,
/// skipping holidays.
fn scheduled_classes(
    per_weekday: &[u32; 7],
    start: NaiveDate,
    end: NaiveDate,
    holidays: &[Holiday],
) -> u32 {
    let mut total: u32 = (0u8..7)
        .map(|weekday| per_weekday[usize::from(weekday)] * weekday_occurrences(start, end, weekday))
        .sum();

    let holiday_dates: BTreeSet<NaiveDate> = holidays
        .iter()
        .map(|holiday| holiday.date)
        .filter(|date| *date >= start && *date <= end)
        .collect();

    for date in holiday_dates {
        total -= per_weekday[usize::from(weekday_index(date))];
    }

    total
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn percentage_of(attended: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        round_one_decimal(f64::from(attended) / f64::from(total) * 100.0)
    }
}

/// Sums every grouped subject into a single figure.
pub fn overall_summary(
    slots: &[ClassSlot],
    records: &[AttendanceRecord],
    holidays: &[Holiday],
    as_of: NaiveDate,
) -> AttendanceSummary {
    let mut overall = AttendanceSummary::default();

    for subject in group_subjects(slots) {
        let summary = reconstruct_by_group(&subject.name, slots, records, holidays, as_of);
        overall.attended += summary.attended;
        overall.total += summary.total;
        overall.bunked += summary.bunked;
    }

    overall.percentage = percentage_of(overall.attended, overall.total);
    overall
}

/// Percentage after `skips` further absences with no attendance in between.
pub fn project_skip(summary: &AttendanceSummary, skips: u32) -> SkipProjection {
    let total = u64::from(summary.total) + u64::from(skips);
    let projected = if total == 0 {
        0.0
    } else {
        round_one_decimal(f64::from(summary.attended) / total as f64 * 100.0)
    };

    SkipProjection {
        original: summary.percentage,
        projected,
    }
}

impl Standing {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 85.0 {
            Standing::Good
        } else if percentage >= 75.0 {
            Standing::Warning
        } else {
            Standing::Critical
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Standing::Good => "good",
            Standing::Warning => "warning",
            Standing::Critical => "critical",
        }
    }
}

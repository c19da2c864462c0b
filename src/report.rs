use std::fmt::Write;

use chrono::NaiveDate;

use crate::advisor::advise_summary;
use crate::attendance::{overall_summary, reconstruct_by_group};
use crate::grouping::group_subjects;
use crate::models::{AttendanceSummary, Snapshot, Standing};

#[derive(Debug, Clone)]
pub struct SubjectRow {
    pub name: String,
    pub summary: AttendanceSummary,
}

/// One row per grouped subject, in timetable order.
pub fn subject_rows(snapshot: &Snapshot, as_of: NaiveDate) -> Vec<SubjectRow> {
    group_subjects(&snapshot.subjects)
        .into_iter()
        .map(|subject| {
            let summary = reconstruct_by_group(
                &subject.name,
                &snapshot.subjects,
                &snapshot.attendance_records,
                &snapshot.holidays,
                as_of,
            );
            SubjectRow {
                name: subject.name,
                summary,
            }
        })
        .collect()
}

pub fn build_report(snapshot: &Snapshot, target_percentage: f64, as_of: NaiveDate) -> String {
    let overall = overall_summary(
        &snapshot.subjects,
        &snapshot.attendance_records,
        &snapshot.holidays,
        as_of,
    );
    let rows = subject_rows(snapshot, as_of);

    let mut output = String::new();

    let _ = writeln!(output, "# Attendance Report");
    let _ = writeln!(output, "Report generated on {}", as_of.format("%-d %B %Y"));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Overall Summary");
    let _ = writeln!(output, "- Total attendance: {:.1}%", overall.percentage);
    let _ = writeln!(
        output,
        "- Attended {} out of {} classes ({} bunked)",
        overall.attended, overall.total, overall.bunked
    );
    let _ = writeln!(output, "- Target attendance: {}%", target_percentage);
    let _ = writeln!(
        output,
        "- Standing: {}",
        Standing::from_percentage(overall.percentage).label()
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Subjects");

    if rows.is_empty() {
        let _ = writeln!(output, "No subjects in the timetable.");
        return output;
    }

    let _ = writeln!(output, "| Subject | Total Classes | Attended | Bunked | Percentage |");
    let _ = writeln!(output, "|---|---|---|---|---|");
    for row in rows.iter() {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} | {:.1}% |",
            row.name,
            row.summary.total,
            row.summary.attended,
            row.summary.bunked,
            row.summary.percentage
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Bunk Outlook");
    for row in rows.iter() {
        let advice = advise_summary(&row.summary, target_percentage);
        let _ = writeln!(output, "- {}: {}", row.name, advice.suggestion);
    }

    output
}

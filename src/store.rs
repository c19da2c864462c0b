use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::{Duration, NaiveDate};
use tracing::{debug, info};
use uuid::Uuid;

use crate::attendance::weekday_index;
use crate::models::{AttendanceRecord, AttendanceStatus, ClassSlot, Holiday, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    Marked,
    Unmarked,
    Updated,
}

impl MarkOutcome {
    pub fn describe(&self) -> &'static str {
        match self {
            MarkOutcome::Marked => "Attendance marked",
            MarkOutcome::Unmarked => "Attendance unmarked",
            MarkOutcome::Updated => "Attendance updated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HolidayOutcome {
    Added,
    Removed,
}

impl Snapshot {
    /// Marks `subject_id` on `date`. Repeating the existing status removes the
    /// mark; a different status replaces it. Keeps one record per slot and date.
    pub fn toggle_mark(
        &mut self,
        subject_id: &str,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> MarkOutcome {
        let existing = self
            .attendance_records
            .iter()
            .position(|record| record.subject_id == subject_id && record.date == date);

        match existing {
            None => {
                self.attendance_records.push(AttendanceRecord {
                    id: Uuid::new_v4().to_string(),
                    subject_id: subject_id.to_string(),
                    date,
                    status,
                });
                MarkOutcome::Marked
            }
            Some(position) if self.attendance_records[position].status == status => {
                self.attendance_records.remove(position);
                MarkOutcome::Unmarked
            }
            Some(position) => {
                self.attendance_records[position].status = status;
                MarkOutcome::Updated
            }
        }
    }

    /// Adds a holiday unless one already exists on `date`.
    pub fn add_holiday(&mut self, date: NaiveDate, reason: Option<String>) -> bool {
        if self.is_holiday(date) {
            return false;
        }
        self.holidays.push(Holiday {
            id: Uuid::new_v4().to_string(),
            date,
            reason,
        });
        true
    }

    /// Drops every holiday on `date`; false if there was none.
    pub fn remove_holiday(&mut self, date: NaiveDate) -> bool {
        let before = self.holidays.len();
        self.holidays.retain(|holiday| holiday.date != date);
        self.holidays.len() != before
    }

    /// Declares `date` a holiday, or lifts it if it already is one.
    pub fn toggle_holiday(&mut self, date: NaiveDate, reason: Option<String>) -> HolidayOutcome {
        if self.remove_holiday(date) {
            HolidayOutcome::Removed
        } else {
            self.add_holiday(date, reason);
            HolidayOutcome::Added
        }
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.iter().any(|holiday| holiday.date == date)
    }

    pub fn slot(&self, slot_id: &str) -> Option<&ClassSlot> {
        self.subjects.iter().find(|slot| slot.id == slot_id)
    }
}

pub fn load_snapshot(path: &Path) -> anyhow::Result<Snapshot> {
    if !path.exists() {
        debug!(path = %path.display(), "no snapshot on disk, starting empty");
        return Ok(Snapshot::default());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&raw)
        .with_context(|| format!("invalid snapshot JSON in {}", path.display()))?;
    debug!(
        subjects = snapshot.subjects.len(),
        records = snapshot.attendance_records.len(),
        holidays = snapshot.holidays.len(),
        "loaded snapshot"
    );
    Ok(snapshot)
}

pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    debug!(path = %path.display(), "saved snapshot");
    Ok(())
}

/// Appends records from a CSV with `subject_id,date,status[,id]` columns.
/// Rows for a slot and date that already carry a mark are skipped.
pub fn import_records_csv(snapshot: &mut Snapshot, csv_path: &Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        subject_id: String,
        date: NaiveDate,
        status: AttendanceStatus,
        #[serde(default)]
        id: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let duplicate = snapshot
            .attendance_records
            .iter()
            .any(|record| record.subject_id == row.subject_id && record.date == row.date);
        if duplicate {
            debug!(subject_id = %row.subject_id, date = %row.date, "skipping duplicate mark");
            continue;
        }

        snapshot.attendance_records.push(AttendanceRecord {
            id: row
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            subject_id: row.subject_id,
            date: row.date,
            status: row.status,
        });
        inserted += 1;
    }

    info!(inserted, path = %csv_path.display(), "imported attendance records");
    Ok(inserted)
}

/// Demo timetable with two weeks of marks ending on `as_of`.
pub fn seed_snapshot(as_of: NaiveDate) -> Snapshot {
    let timetable = vec![
        ("seed-math-mon", "Mathematics", 1, "09:00", "10:00", "Dr. Rao", "#0369a1"),
        ("seed-math-wed", "Mathematics", 3, "09:00", "10:00", "Dr. Rao", "#0369a1"),
        ("seed-phys-tue", "Physics", 2, "11:00", "12:00", "Prof. Iyer", "#15803d"),
        ("seed-phys-thu", "physics ", 4, "11:00", "12:00", "Prof. Iyer", "#15803d"),
        ("seed-chem-fri", "Chemistry", 5, "10:00", "11:00", "Dr. Menon", "#7e22ce"),
        ("seed-prog-mon", "Programming", 1, "14:00", "16:00", "Ms. Das", "#b45309"),
    ];

    let subjects: Vec<ClassSlot> = timetable
        .into_iter()
        .map(|(id, name, day, start, end, teacher, color)| ClassSlot {
            id: id.to_string(),
            name: name.to_string(),
            day,
            start_time: start.to_string(),
            end_time: end.to_string(),
            teacher: Some(teacher.to_string()),
            color: Some(color.to_string()),
        })
        .collect();

    let mut attendance_records = Vec::new();
    for offset in (0..14i64).rev() {
        let date = as_of - Duration::days(offset);
        for (index, slot) in subjects.iter().enumerate() {
            if slot.day != weekday_index(date) {
                continue;
            }
            let status = if (offset as usize + index) % 4 == 0 {
                AttendanceStatus::Absent
            } else {
                AttendanceStatus::Present
            };
            attendance_records.push(AttendanceRecord {
                id: Uuid::new_v4().to_string(),
                subject_id: slot.id.clone(),
                date,
                status,
            });
        }
    }

    Snapshot {
        subjects,
        attendance_records,
        holidays: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::reconstruct_by_group;
    use std::io::Write;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    #[test]
    fn toggle_cycles_through_mark_update_unmark() {
        let mut snapshot = Snapshot::default();
        assert_eq!(
            snapshot.toggle_mark("m1", monday(), AttendanceStatus::Present),
            MarkOutcome::Marked
        );
        assert_eq!(
            snapshot.toggle_mark("m1", monday(), AttendanceStatus::Absent),
            MarkOutcome::Updated
        );
        assert_eq!(snapshot.attendance_records.len(), 1);
        assert_eq!(snapshot.attendance_records[0].status, AttendanceStatus::Absent);
        assert_eq!(
            snapshot.toggle_mark("m1", monday(), AttendanceStatus::Absent),
            MarkOutcome::Unmarked
        );
        assert!(snapshot.attendance_records.is_empty());
    }

    #[test]
    fn holidays_are_unique_per_date() {
        let mut snapshot = Snapshot::default();
        assert!(snapshot.add_holiday(monday(), Some("Holi".to_string())));
        assert!(!snapshot.add_holiday(monday(), None));
        assert_eq!(snapshot.holidays.len(), 1);
        assert!(snapshot.is_holiday(monday()));
    }

    #[test]
    fn toggling_a_holiday_twice_restores_its_classes() {
        let mut snapshot = Snapshot::default();
        snapshot.subjects.push(ClassSlot {
            id: "m1".to_string(),
            name: "Math".to_string(),
            day: 1,
            start_time: "09:00".to_string(),
            end_time: "10:00".to_string(),
            teacher: None,
            color: None,
        });
        snapshot.toggle_mark("m1", monday(), AttendanceStatus::Present);
        let next_monday = monday() + Duration::days(7);
        let total = |snapshot: &Snapshot| {
            reconstruct_by_group(
                "Math",
                &snapshot.subjects,
                &snapshot.attendance_records,
                &snapshot.holidays,
                next_monday,
            )
            .total
        };
        assert_eq!(total(&snapshot), 2);

        assert_eq!(
            snapshot.toggle_holiday(next_monday, Some("Typo".to_string())),
            HolidayOutcome::Added
        );
        assert_eq!(total(&snapshot), 1);

        assert_eq!(snapshot.toggle_holiday(next_monday, None), HolidayOutcome::Removed);
        assert!(!snapshot.is_holiday(next_monday));
        assert_eq!(total(&snapshot), 2);
    }

    #[test]
    fn removing_a_missing_holiday_reports_false() {
        let mut snapshot = Snapshot::default();
        assert!(!snapshot.remove_holiday(monday()));
    }

    #[test]
    fn snapshot_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("snapshot.json");
        let snapshot = seed_snapshot(monday());

        save_snapshot(&path, &snapshot).unwrap();
        let loaded = load_snapshot(&path).unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn snapshot_uses_camel_case_keys() {
        let json = r#"{
            "subjects": [
                {"id": "a", "name": "Math", "day": 1, "startTime": "09:00", "endTime": "10:00"}
            ],
            "attendanceRecords": [
                {"id": "r", "subjectId": "a", "date": "2026-03-02", "status": "present"}
            ]
        }"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.subjects[0].start_time, "09:00");
        assert_eq!(snapshot.attendance_records[0].status, AttendanceStatus::Present);
        assert!(snapshot.holidays.is_empty());
    }

    #[test]
    fn missing_snapshot_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_snapshot(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, Snapshot::default());
    }

    #[test]
    fn csv_import_skips_existing_marks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("marks.csv");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "subject_id,date,status,id").unwrap();
        writeln!(file, "m1,2026-03-02,present,r-1").unwrap();
        writeln!(file, "m1,2026-03-09,absent,").unwrap();
        writeln!(file, "m1,2026-03-02,absent,r-3").unwrap();
        drop(file);

        let mut snapshot = Snapshot::default();
        let inserted = import_records_csv(&mut snapshot, &path).unwrap();
        assert_eq!(inserted, 2);
        assert_eq!(snapshot.attendance_records[0].id, "r-1");
        assert!(!snapshot.attendance_records[1].id.is_empty());
        assert_eq!(snapshot.attendance_records[1].status, AttendanceStatus::Absent);
    }

    #[test]
    fn seed_marks_only_scheduled_days() {
        let snapshot = seed_snapshot(monday());
        assert!(!snapshot.attendance_records.is_empty());
        for record in &snapshot.attendance_records {
            let slot = snapshot.slot(&record.subject_id).unwrap();
            assert_eq!(slot.day, weekday_index(record.date));
            assert!(record.date <= monday());
        }
    }
}

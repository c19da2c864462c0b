use chrono::NaiveDate;

use crate::attendance::weekday_index;
use crate::models::{AttendanceRecord, AttendanceStatus, ClassSlot, Holiday};

#[derive(Debug, Clone)]
pub struct ScheduledClass<'a> {
    pub slot: &'a ClassSlot,
    pub status: Option<AttendanceStatus>,
}

#[derive(Debug, Clone)]
pub struct DaySchedule<'a> {
    pub date: NaiveDate,
    pub is_holiday: bool,
    pub classes: Vec<ScheduledClass<'a>>,
}

/// Classes held on `date`'s weekday ordered by start time, each with its mark
/// for that date if one exists.
pub fn schedule_for<'a>(
    slots: &'a [ClassSlot],
    records: &[AttendanceRecord],
    holidays: &[Holiday],
    date: NaiveDate,
) -> DaySchedule<'a> {
    let weekday = weekday_index(date);
    let mut todays: Vec<&ClassSlot> = slots.iter().filter(|slot| slot.day == weekday).collect();
    todays.sort_by(|a, b| a.start_time.cmp(&b.start_time));

    let classes = todays
        .into_iter()
        .map(|slot| ScheduledClass {
            slot,
            status: records
                .iter()
                .find(|record| record.subject_id == slot.id && record.date == date)
                .map(|record| record.status),
        })
        .collect();

    DaySchedule {
        date,
        is_holiday: holidays.iter().any(|holiday| holiday.date == date),
        classes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: &str, day: u8, start: &str) -> ClassSlot {
        ClassSlot {
            id: id.to_string(),
            name: id.to_uppercase(),
            day,
            start_time: start.to_string(),
            end_time: "17:00".to_string(),
            teacher: None,
            color: None,
        }
    }

    #[test]
    fn lists_the_days_classes_by_start_time() {
        let monday = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let slots = vec![
            slot("late", 1, "14:00"),
            slot("tue", 2, "08:00"),
            slot("early", 1, "09:30"),
        ];
        let records = vec![AttendanceRecord {
            id: "r1".to_string(),
            subject_id: "late".to_string(),
            date: monday,
            status: AttendanceStatus::Absent,
        }];

        let schedule = schedule_for(&slots, &records, &[], monday);
        let ids: Vec<&str> = schedule.classes.iter().map(|c| c.slot.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late"]);
        assert_eq!(schedule.classes[0].status, None);
        assert_eq!(schedule.classes[1].status, Some(AttendanceStatus::Absent));
        assert!(!schedule.is_holiday);
    }

    #[test]
    fn flags_holidays() {
        let monday = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let holidays = vec![Holiday {
            id: "h1".to_string(),
            date: monday,
            reason: Some("Founders' Day".to_string()),
        }];
        let slots = [slot("a", 1, "09:00")];
        let schedule = schedule_for(&slots, &[], &holidays, monday);
        assert!(schedule.is_holiday);
        assert_eq!(schedule.classes.len(), 1);
    }
}

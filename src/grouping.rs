use std::collections::HashMap;

use crate::models::{ClassSlot, GroupedSubject};

/// Grouping key for a subject name: trimmed and case-folded.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

pub fn same_subject(a: &str, b: &str) -> bool {
    normalize_name(a) == normalize_name(b)
}

/// Collapses weekly slots into logical subjects, in first-appearance order.
///
/// The first slot seen for a name supplies the display name (trimmed, original
/// casing), teacher and color.
pub fn group_subjects(slots: &[ClassSlot]) -> Vec<GroupedSubject> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut grouped: Vec<GroupedSubject> = Vec::new();

    for slot in slots {
        let key = normalize_name(&slot.name);
        match index.get(&key) {
            Some(&position) => grouped[position].original_ids.push(slot.id.clone()),
            None => {
                index.insert(key, grouped.len());
                grouped.push(GroupedSubject {
                    name: slot.name.trim().to_string(),
                    teacher: slot.teacher.clone(),
                    color: slot.color.clone(),
                    original_ids: vec![slot.id.clone()],
                });
            }
        }
    }

    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: &str, name: &str, day: u8) -> ClassSlot {
        ClassSlot {
            id: id.to_string(),
            name: name.to_string(),
            day,
            start_time: "09:00".to_string(),
            end_time: "10:00".to_string(),
            teacher: None,
            color: None,
        }
    }

    #[test]
    fn names_differing_in_case_and_whitespace_merge() {
        let grouped = group_subjects(&[slot("a", "Math", 1), slot("b", " math ", 3)]);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].original_ids, vec!["a", "b"]);
        assert_eq!(grouped[0].name, "Math");
    }

    #[test]
    fn display_name_comes_from_first_slot_trimmed() {
        let grouped = group_subjects(&[slot("a", "  physics ", 1), slot("b", "PHYSICS", 2)]);
        assert_eq!(grouped[0].name, "physics");
    }

    #[test]
    fn first_seen_teacher_and_color_win() {
        let mut first = slot("a", "Chemistry", 1);
        first.teacher = Some("Dr. Rao".to_string());
        first.color = Some("#0369a1".to_string());
        let mut second = slot("b", "chemistry", 4);
        second.teacher = Some("Dr. Iyer".to_string());

        let grouped = group_subjects(&[first, second]);
        assert_eq!(grouped[0].teacher.as_deref(), Some("Dr. Rao"));
        assert_eq!(grouped[0].color.as_deref(), Some("#0369a1"));
    }

    #[test]
    fn keeps_first_appearance_order() {
        let grouped = group_subjects(&[
            slot("a", "History", 1),
            slot("b", "Art", 2),
            slot("c", "history", 5),
        ]);
        let names: Vec<&str> = grouped.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["History", "Art"]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(group_subjects(&[]).is_empty());
    }
}

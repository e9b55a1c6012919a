use crate::models::{GroupReport, GroupScore, StudentRecord, Subject, SubjectGroup};
use Subject::*;

/// Admission subject groups. Declaration order is the report order.
pub static SUBJECT_GROUPS: [SubjectGroup; 15] = [
    group("A00", [Math, Physics, Chemistry]),
    group("A01", [Math, Physics, English]),
    group("A02", [Math, Physics, Biology]),
    group("B00", [Math, Chemistry, Biology]),
    group("B08", [Math, Biology, English]),
    group("B03", [Math, Literature, Biology]),
    group("C01", [Literature, Math, Physics]),
    group("C02", [Literature, Math, Chemistry]),
    group("C08", [Literature, Chemistry, Biology]),
    group("D01", [Literature, Math, English]),
    group("D07", [Math, Chemistry, English]),
    group("D08", [Math, Biology, English]),
    group("D11", [Literature, Physics, English]),
    group("D12", [Literature, Chemistry, English]),
    group("D13", [Literature, Biology, English]),
];

const fn group(code: &'static str, subjects: [Subject; 3]) -> SubjectGroup {
    SubjectGroup { code, subjects }
}

pub struct GroupAnalyzer<'a> {
    pub groups: &'a [SubjectGroup],
}

impl Default for GroupAnalyzer<'static> {
    fn default() -> Self {
        Self::new(&SUBJECT_GROUPS)
    }
}

impl<'a> GroupAnalyzer<'a> {
    pub fn new(groups: &'a [SubjectGroup]) -> Self {
        Self { groups }
    }

    /// Groups whose three subjects all have a score, with their subtotals.
    pub fn evaluate(&self, record: &StudentRecord) -> GroupReport {
        let groups = self
            .groups
            .iter()
            .filter_map(|group| Self::score_group(group, record))
            .collect();

        GroupReport { groups }
    }

    fn score_group(group: &SubjectGroup, record: &StudentRecord) -> Option<GroupScore> {
        let [first, second, third] = group.subjects;
        let scores = [
            record.score(first).value()?,
            record.score(second).value()?,
            record.score(third).value()?,
        ];

        Some(GroupScore {
            code: group.code,
            subjects: group.subjects,
            scores,
            sum: scores.iter().sum(),
        })
    }
}

/// Evaluate a record against the standard group table.
pub fn evaluate_groups(record: &StudentRecord) -> GroupReport {
    GroupAnalyzer::default().evaluate(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_records;

    fn record(row: &str) -> StudentRecord {
        let text = format!("SBD,HỌ VÀ TÊN,Toán,Văn,Anh,Lý,Hóa,Sinh\n{}", row);
        parse_records(&text).remove(0)
    }

    #[test]
    fn test_group_table_order() {
        let codes: Vec<_> = SUBJECT_GROUPS.iter().map(|g| g.code).collect();
        assert_eq!(
            codes,
            vec![
                "A00", "A01", "A02", "B00", "B08", "B03", "C01", "C02", "C08", "D01", "D07",
                "D08", "D11", "D12", "D13"
            ]
        );
    }

    #[test]
    fn test_all_subjects_present_qualifies_for_every_group() {
        let report = evaluate_groups(&record("001,A,1,2,3,4,5,6"));
        let codes: Vec<_> = SUBJECT_GROUPS.iter().map(|g| g.code).collect();
        assert_eq!(report.codes(), codes);
    }

    #[test]
    fn test_missing_chemistry_excludes_chemistry_groups() {
        let report = evaluate_groups(&record("001,A,8,7,6,5,,4"));

        for code in ["A00", "B00", "C02", "C08", "D07"] {
            assert!(report.get(code).is_none(), "{} should be excluded", code);
        }
        assert!(report.get("A01").is_some());
        assert!(report.get("D01").is_some());
    }

    #[test]
    fn test_group_sum_and_subject_order() {
        let report = evaluate_groups(&record("001,A,8,7.5,6,,,"));

        assert_eq!(report.codes(), vec!["D01"]);
        let d01 = report.get("D01").unwrap();
        assert_eq!(d01.subjects, [Literature, Math, English]);
        assert_eq!(d01.scores, [7.5, 8.0, 6.0]);
        assert_eq!(d01.sum, 21.5);
    }

    #[test]
    fn test_no_scores_gives_empty_report() {
        let report = evaluate_groups(&record("001,A,,,,,,"));
        assert!(report.is_empty());
    }

    #[test]
    fn test_custom_group_table() {
        let table = [group("X01", [Physics, Chemistry, Biology])];
        let analyzer = GroupAnalyzer::new(&table);

        let report = analyzer.evaluate(&record("001,A,,,,4,5,6"));
        assert_eq!(report.codes(), vec!["X01"]);
        assert_eq!(report.groups[0].sum, 15.0);
    }
}

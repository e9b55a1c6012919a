use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Data source configuration
    pub data_source_mode: DataSourceMode,
    pub data_file: Option<String>,
    pub data_url: Option<String>,
    pub request_timeout_secs: u64,
    pub output_directory: Option<String>,
    /// Load the dataset before the first lookup is requested
    pub preload: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSourceMode {
    #[serde(rename = "local")]
    Local,
    #[serde(rename = "internet")]
    Internet,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_source_mode: DataSourceMode::Local,
            data_file: Some("diem_thi.csv".to_string()),
            data_url: Some("https://example.com/diem_thi.csv".to_string()),
            request_timeout_secs: 30,
            output_directory: Some("output".to_string()),
            preload: true,
        }
    }
}

impl Config {
    pub fn load_from_file(file_path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(file_path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, file_path: &str) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(file_path, content)?;
        Ok(())
    }
}

/// The six canonical exam subjects, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subject {
    Math,
    Literature,
    English,
    Physics,
    Chemistry,
    Biology,
}

impl Subject {
    pub const ALL: [Subject; 6] = [
        Subject::Math,
        Subject::Literature,
        Subject::English,
        Subject::Physics,
        Subject::Chemistry,
        Subject::Biology,
    ];

    /// Column label used by the exam export
    pub fn label(self) -> &'static str {
        match self {
            Subject::Math => "Toán",
            Subject::Literature => "Văn",
            Subject::English => "Anh",
            Subject::Physics => "Lý",
            Subject::Chemistry => "Hóa",
            Subject::Biology => "Sinh",
        }
    }

    /// Header spellings accepted for this subject, in priority order.
    pub fn header_spellings(self) -> [String; 2] {
        let label = self.label();
        [label.to_string(), format!("{} ", label)]
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One cell as it arrives from the source, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Text(String),
    Number(f64),
    Empty,
}

impl From<Option<&str>> for RawCell {
    fn from(value: Option<&str>) -> Self {
        match value {
            Some(text) if !text.is_empty() => RawCell::Text(text.to_string()),
            _ => RawCell::Empty,
        }
    }
}

/// A normalized subject score. `Missing` is distinct from a score of zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Score {
    Present(f64),
    #[default]
    Missing,
}

impl Score {
    pub fn value(self) -> Option<f64> {
        match self {
            Score::Present(value) => Some(value),
            Score::Missing => None,
        }
    }

    pub fn is_present(self) -> bool {
        matches!(self, Score::Present(_))
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Present(value) => write!(f, "{}", value),
            Score::Missing => f.write_str("N/V"),
        }
    }
}

pub const SBD_COLUMN: &str = "SBD";
pub const FULL_NAME_COLUMN: &str = "HỌ VÀ TÊN";
pub const BIRTH_DATE_COLUMN: &str = "NGÀY THÁNG NĂM SINH";
pub const SEX_COLUMN: &str = "GIỚI TÍNH";
pub const EXAM_SCORE_COLUMN: &str = "ĐIỂM THI";

/// Identity columns shown in the student info block, in display order.
pub const INFO_COLUMNS: [&str; 5] = [
    SBD_COLUMN,
    FULL_NAME_COLUMN,
    BIRTH_DATE_COLUMN,
    SEX_COLUMN,
    EXAM_SCORE_COLUMN,
];

#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    /// Non-subject columns, trimmed header -> trimmed value
    fields: HashMap<String, String>,
    scores: [Score; 6],
    total_score: f64,
}

impl StudentRecord {
    pub(crate) fn new(fields: HashMap<String, String>, scores: [Score; 6]) -> Self {
        let total_score = crate::score::total_score(&scores);
        Self {
            fields,
            scores,
            total_score,
        }
    }

    pub fn field(&self, column: &str) -> Option<&str> {
        self.fields
            .get(column)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn sbd(&self) -> Option<&str> {
        self.field(SBD_COLUMN)
    }

    pub fn full_name(&self) -> Option<&str> {
        self.field(FULL_NAME_COLUMN)
    }

    pub fn birth_date(&self) -> Option<&str> {
        self.field(BIRTH_DATE_COLUMN)
    }

    pub fn sex(&self) -> Option<&str> {
        self.field(SEX_COLUMN)
    }

    pub fn exam_score_label(&self) -> Option<&str> {
        self.field(EXAM_SCORE_COLUMN)
    }

    pub fn score(&self, subject: Subject) -> Score {
        self.scores[subject.index()]
    }

    pub fn scores(&self) -> &[Score; 6] {
        &self.scores
    }

    pub fn total_score(&self) -> f64 {
        self.total_score
    }
}

/// A group code paired with the three subjects it is scored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubjectGroup {
    pub code: &'static str,
    pub subjects: [Subject; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupScore {
    pub code: &'static str,
    pub subjects: [Subject; 3],
    pub scores: [f64; 3],
    pub sum: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupReport {
    pub groups: Vec<GroupScore>,
}

impl GroupReport {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&GroupScore> {
        self.groups.iter().find(|group| group.code == code)
    }

    pub fn codes(&self) -> Vec<&'static str> {
        self.groups.iter().map(|group| group.code).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_display() {
        assert_eq!(Score::Present(8.0).to_string(), "8");
        assert_eq!(Score::Present(7.5).to_string(), "7.5");
        assert_eq!(Score::Missing.to_string(), "N/V");
    }

    #[test]
    fn test_header_spellings_include_trailing_space_variant() {
        assert_eq!(
            Subject::Math.header_spellings(),
            ["Toán".to_string(), "Toán ".to_string()]
        );
    }

    #[test]
    fn test_identity_accessors_skip_empty_values() {
        let mut fields = HashMap::new();
        fields.insert(SBD_COLUMN.to_string(), "001".to_string());
        fields.insert(SEX_COLUMN.to_string(), String::new());
        let record = StudentRecord::new(fields, [Score::Missing; 6]);

        assert_eq!(record.sbd(), Some("001"));
        assert_eq!(record.sex(), None);
        assert_eq!(record.full_name(), None);
    }

    #[test]
    fn test_config_missing_keys_fall_back_to_defaults() {
        let config: Config = toml::from_str("data_source_mode = \"internet\"").unwrap();
        assert_eq!(config.data_source_mode, DataSourceMode::Internet);
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.preload);
    }
}

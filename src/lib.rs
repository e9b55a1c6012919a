//! Exam score lookup: parse a score export once per session, find an examinee
//! by SBD and report the admission subject groups their scores qualify for.

pub mod analyzer;
pub mod dataset;
pub mod error;
pub mod models;
pub mod parser;
pub mod report;
pub mod score;

pub use analyzer::{evaluate_groups, GroupAnalyzer, SUBJECT_GROUPS};
pub use dataset::{find_record, ConfiguredSource, DataSource, LoadState, Lookup, Session};
pub use error::{LookupError, Severity};
pub use models::{Config, GroupReport, Score, StudentRecord, Subject};
pub use parser::{parse_records, RecordParser};
pub use score::{normalize_score, total_score};

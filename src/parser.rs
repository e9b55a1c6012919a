use crate::models::{RawCell, Score, StudentRecord, Subject};
use crate::score::normalize_score;
use std::collections::HashMap;
use tracing::debug;

const BYTE_ORDER_MARK: char = '\u{FEFF}';

/// Turns an exam-score export into normalized student records.
///
/// Parsing is lenient: rows whose field count does not match the header are
/// dropped, and cells that are not usable scores become [`Score::Missing`].
/// Nothing here returns an error.
pub struct RecordParser {
    delimiter: char,
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordParser {
    pub fn new() -> Self {
        Self { delimiter: ',' }
    }

    pub fn with_delimiter(delimiter: char) -> Self {
        Self { delimiter }
    }

    pub fn parse(&self, text: &str) -> Vec<StudentRecord> {
        let mut lines = text
            .split('\n')
            .enumerate()
            .filter(|(_, line)| !is_blank(line));

        let Some((_, header_line)) = lines.next() else {
            return Vec::new();
        };
        let headers = self.parse_header(header_line);

        let mut records = Vec::new();
        let mut dropped = 0usize;

        for (line_index, line) in lines {
            let values = self.tokenize_line(line);
            if values.len() != headers.len() {
                debug!(
                    line = line_index + 1,
                    expected = headers.len(),
                    found = values.len(),
                    "dropping malformed row"
                );
                dropped += 1;
                continue;
            }

            records.push(self.build_record(&headers, values));
        }

        debug!(records = records.len(), dropped, "parsed dataset");
        records
    }

    /// Header names split on the delimiter, trimmed, with any byte order mark removed.
    pub fn parse_header(&self, line: &str) -> Vec<String> {
        line.strip_prefix(BYTE_ORDER_MARK)
            .unwrap_or(line)
            .split(self.delimiter)
            .map(|name| name.trim().to_string())
            .collect()
    }

    /// Split one data line into trimmed fields.
    ///
    /// A double quote toggles quoted mode and is not kept; the delimiter only
    /// ends a field outside quotes. Escaped quotes are not recognized.
    pub fn tokenize_line(&self, line: &str) -> Vec<String> {
        let mut values = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;

        for ch in line.chars() {
            if ch == '"' {
                in_quotes = !in_quotes;
            } else if ch == self.delimiter && !in_quotes {
                values.push(current.trim().to_string());
                current.clear();
            } else {
                current.push(ch);
            }
        }
        values.push(current.trim().to_string());

        values
    }

    fn build_record(&self, headers: &[String], values: Vec<String>) -> StudentRecord {
        // Later duplicate headers overwrite earlier ones
        let mut fields: HashMap<String, String> = headers.iter().cloned().zip(values).collect();

        let mut scores = [Score::Missing; 6];
        for (slot, subject) in scores.iter_mut().zip(Subject::ALL) {
            let spellings = subject.header_spellings();
            let raw = spellings
                .iter()
                .filter_map(|key| fields.get(key))
                .find(|value| !value.is_empty())
                .map(String::as_str);
            *slot = normalize_score(&RawCell::from(raw));

            for key in &spellings {
                fields.remove(key);
            }
        }

        StudentRecord::new(fields, scores)
    }
}

/// Whitespace-only lines, counting a stray byte order mark as whitespace.
fn is_blank(line: &str) -> bool {
    line.trim_matches(|c: char| c.is_whitespace() || c == BYTE_ORDER_MARK)
        .is_empty()
}

/// Parse with the default comma delimiter.
pub fn parse_records(text: &str) -> Vec<StudentRecord> {
    RecordParser::new().parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "SBD,HỌ VÀ TÊN,Toán,Văn,Anh,Lý,Hóa,Sinh";

    #[test]
    fn test_quoted_field_keeps_delimiter() {
        let parser = RecordParser::new();
        assert_eq!(parser.tokenize_line("a,\"b,c\",d"), vec!["a", "b,c", "d"]);
    }

    #[test]
    fn test_fields_are_trimmed() {
        let parser = RecordParser::new();
        assert_eq!(
            parser.tokenize_line(" 001 , Nguyen A ,8\r"),
            vec!["001", "Nguyen A", "8"]
        );
        assert_eq!(parser.tokenize_line("a,,"), vec!["a", "", ""]);
    }

    #[test]
    fn test_header_strips_byte_order_mark() {
        let parser = RecordParser::new();
        assert_eq!(
            parser.parse_header("\u{FEFF}SBD , Toán "),
            vec!["SBD".to_string(), "Toán".to_string()]
        );
    }

    #[test]
    fn test_fewer_than_two_lines_yields_nothing() {
        assert!(parse_records("").is_empty());
        assert!(parse_records("\n  \n").is_empty());
        assert!(parse_records(HEADER).is_empty());
    }

    #[test]
    fn test_byte_order_mark_on_its_own_line_is_blank() {
        let records = parse_records("\u{FEFF}\nSBD,Toán\n1,9");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].score(Subject::Math), Score::Present(9.0));
    }

    #[test]
    fn test_row_count_and_malformed_rows() {
        let text = format!(
            "{}\n001,A,8,7,6,5,4,3\n002,B,8,7,6,5,4,3\n003,C,8,7\n\n004,D,1,2,3,4,5,6\n",
            HEADER
        );
        let records = parse_records(&text);

        let ids: Vec<_> = records.iter().filter_map(|r| r.sbd()).collect();
        assert_eq!(ids, vec!["001", "002", "004"]);
    }

    #[test]
    fn test_scores_are_normalized() {
        let text = format!("{}\n001,Nguyen A,8,\"7,5\",Vắng,,abc,N/V", HEADER);
        let records = parse_records(&text);
        let record = &records[0];

        assert_eq!(record.score(Subject::Math), Score::Present(8.0));
        assert_eq!(record.score(Subject::Literature), Score::Present(7.5));
        assert_eq!(record.score(Subject::English), Score::Missing);
        assert_eq!(record.score(Subject::Physics), Score::Missing);
        assert_eq!(record.score(Subject::Chemistry), Score::Missing);
        assert_eq!(record.score(Subject::Biology), Score::Missing);
        assert_eq!(record.total_score(), 15.5);
    }

    #[test]
    fn test_missing_subject_columns_default_to_missing() {
        let records = parse_records("SBD,Toán\n001,9");
        let record = &records[0];

        assert_eq!(record.score(Subject::Math), Score::Present(9.0));
        for subject in &Subject::ALL[1..] {
            assert_eq!(record.score(*subject), Score::Missing);
        }
        assert_eq!(record.total_score(), 9.0);
    }

    #[test]
    fn test_whitespace_variant_headers_resolve_to_canonical_subject() {
        let records = parse_records("SBD, Toán ,Văn \n001,9,8");
        let record = &records[0];

        assert_eq!(record.score(Subject::Math), Score::Present(9.0));
        assert_eq!(record.score(Subject::Literature), Score::Present(8.0));
        assert_eq!(record.field("Toán"), None);
    }

    #[test]
    fn test_duplicate_header_keeps_last_value() {
        let records = parse_records("SBD,Toán,Toán\n001,,6");
        assert_eq!(records[0].score(Subject::Math), Score::Present(6.0));
    }

    #[test]
    fn test_custom_delimiter() {
        let parser = RecordParser::with_delimiter(';');
        let records = parser.parse("SBD;Toán;Văn\n001;8,5;7");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].score(Subject::Math), Score::Present(8.5));
    }
}

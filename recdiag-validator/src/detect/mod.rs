//! Record boundary detectors.
//!
//! Each sub-module implements one way of recognising the first line of a record:
//! - `timestamp`: lines starting with a timestamp in the agent's date/time format
//! - `pattern`: lines matching a start-of-record regular expression
//!
//! Splitting itself is shared: a single forward pass over the lines where every
//! boundary line opens a new record and other lines extend the current one.

pub mod pattern;
pub mod timestamp;

use serde::Serialize;

/// One logical record cut out of the sample content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    /// 1-based line number of the record's first line.
    pub start_line: usize,
    /// The record's lines joined with `\n` (no trailing terminator).
    pub text: String,
}

impl Record {
    fn open(start_line: usize, line: &str) -> Self {
        Self {
            start_line,
            text: line.to_owned(),
        }
    }

    fn extend(&mut self, line: &str) {
        self.text.push('\n');
        self.text.push_str(line);
    }
}

/// A rule deciding where records begin.
pub trait BoundaryDetector {
    /// Whether `line` opens a new record.
    fn is_record_start(&self, line: &str) -> bool;

    /// Split `content` into records.
    ///
    /// Lines preceding the first boundary form a record of their own. When no
    /// line is a boundary the whole content is a single record; empty content
    /// yields no records.
    fn split(&self, content: &str) -> Vec<Record> {
        let mut records = Vec::new();
        let mut current: Option<Record> = None;

        for (idx, line) in content.lines().enumerate() {
            let line_no = idx + 1;
            match &mut current {
                Some(record) if !self.is_record_start(line) => record.extend(line),
                slot => {
                    if let Some(done) = slot.replace(Record::open(line_no, line)) {
                        records.push(done);
                    }
                }
            }
        }

        records.extend(current);
        records
    }

    /// How many `records` an auxiliary extraction pattern matches, if the
    /// detector carries one.
    fn extraction_matches(&self, _records: &[Record]) -> Option<usize> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Prefix(&'static str);

    impl BoundaryDetector for Prefix {
        fn is_record_start(&self, line: &str) -> bool {
            line.starts_with(self.0)
        }
    }

    #[test]
    fn test_split_groups_continuation_lines() {
        let records = Prefix(">").split(">a\n  more\n>b\n>c\n  x\n  y\n");
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], Record::open(1, ">a\n  more"));
        assert_eq!(records[1].start_line, 3);
        assert_eq!(records[2].text, ">c\n  x\n  y");
    }

    #[test]
    fn test_split_without_boundary_is_one_record() {
        let records = Prefix(">").split("a\nb\nc\n");
        assert_eq!(records, vec![Record::open(1, "a\nb\nc")]);
    }

    #[test]
    fn test_split_leading_lines_form_own_record() {
        let records = Prefix(">").split("header\n>a\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text, "header");
        assert_eq!(records[1].start_line, 2);
    }

    #[test]
    fn test_split_empty_content() {
        assert!(Prefix(">").split("").is_empty());
    }

    #[test]
    fn test_default_has_no_extraction() {
        assert_eq!(Prefix(">").extraction_matches(&[]), None);
    }
}

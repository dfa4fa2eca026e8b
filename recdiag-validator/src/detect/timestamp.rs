//! Timestamp-prefixed records.
//!
//! The agent declares timestamps with .NET custom date/time format strings
//! (`yyyy-MM-dd HH:mm:ss`, `MM/dd/yyyy hh:mm:ss tt`, ...). A format is
//! translated once into two equivalent forms:
//! - an anchored regular expression that finds the candidate prefix of a line
//! - a chrono strftime string that checks the prefix is a real date/time
//!   (month 13 or minute 61 are rejected)
//!
//! Tokens without a chrono equivalent (`F`, `t`, `z`, `K`) disable the second
//! check for the whole format; the regex alone then decides.

use chrono::format::{Parsed, StrftimeItems};
use regex::Regex;
use tracing::debug;

use super::BoundaryDetector;
use crate::error::DiagError;

/// Detects records that begin with a timestamp.
#[derive(Debug)]
pub struct TimestampDetector {
    prefix: Regex,
    strftime: Option<String>,
}

impl TimestampDetector {
    /// Compile a detector for a .NET custom date/time `format`.
    ///
    /// # Errors
    ///
    /// Returns [`DiagError::InvalidPattern`] if the translated expression
    /// does not compile or would match an empty line prefix.
    pub fn new(format: &str) -> Result<Self, DiagError> {
        let translated = Translation::of(format);
        let prefix =
            Regex::new(&format!("^(?:{})", translated.regex)).map_err(|e| {
                DiagError::InvalidPattern {
                    field: "TimestampFormat",
                    pattern: format.to_owned(),
                    cause: e.to_string(),
                }
            })?;
        // A prefix that may be empty would make every line a boundary.
        if prefix.is_match("") {
            return Err(DiagError::InvalidPattern {
                field: "TimestampFormat",
                pattern: format.to_owned(),
                cause: "format matches an empty prefix".to_owned(),
            });
        }

        debug!(
            format,
            regex = prefix.as_str(),
            strftime = translated.strftime.as_deref().unwrap_or("-"),
            "compiled timestamp format"
        );

        Ok(Self {
            prefix,
            strftime: translated.strftime,
        })
    }
}

impl BoundaryDetector for TimestampDetector {
    fn is_record_start(&self, line: &str) -> bool {
        let Some(found) = self.prefix.find(line) else {
            return false;
        };
        let Some(strftime) = self.strftime.as_deref() else {
            return true;
        };
        let mut parsed = Parsed::new();
        chrono::format::parse(&mut parsed, found.as_str(), StrftimeItems::new(strftime)).is_ok()
    }
}

/// A .NET format string rendered as regex source and, when possible, strftime.
#[derive(Debug, Default)]
struct Translation {
    regex: String,
    strftime: Option<String>,
}

impl Translation {
    fn of(format: &str) -> Self {
        let mut out = Self {
            regex: String::new(),
            strftime: Some(String::new()),
        };

        let chars: Vec<char> = format.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            match c {
                '\'' | '"' => {
                    let end = chars[i + 1..]
                        .iter()
                        .position(|&q| q == c)
                        .map_or(chars.len(), |p| i + 1 + p);
                    let literal: String = chars[i + 1..end].iter().collect();
                    out.literal(&literal);
                    i = end + 1;
                }
                '\\' => {
                    if let Some(&escaped) = chars.get(i + 1) {
                        out.literal(escaped.encode_utf8(&mut [0; 4]));
                        i += 2;
                    } else {
                        out.literal("\\");
                        i += 1;
                    }
                }
                // `%d` marks a lone single-letter specifier
                '%' => i += 1,
                _ => {
                    let run = chars[i..].iter().take_while(|&&x| x == c).count();
                    if let Some((regex, strftime)) = specifier(c, run) {
                        out.regex.push_str(&regex);
                        match strftime {
                            Some(item) => {
                                if let Some(s) = out.strftime.as_mut() {
                                    s.push_str(item);
                                }
                            }
                            None => out.strftime = None,
                        }
                    } else {
                        let literal: String = std::iter::repeat_n(c, run).collect();
                        out.literal(&literal);
                    }
                    i += run;
                }
            }
        }
        out
    }

    fn literal(&mut self, text: &str) {
        self.regex.push_str(&regex::escape(text));
        if let Some(s) = self.strftime.as_mut() {
            s.push_str(&text.replace('%', "%%"));
        }
    }
}

/// Regex source and strftime item for a run of `run` copies of specifier `c`.
fn specifier(c: char, run: usize) -> Option<(String, Option<&'static str>)> {
    let fixed = |n: usize| format!(r"\d{{{n}}}");
    let spec = match (c, run) {
        ('y', 1) => (r"\d{1,2}".to_owned(), None),
        ('y', 2) => (fixed(2), Some("%y")),
        ('y', 3) => (r"\d{3,4}".to_owned(), Some("%Y")),
        ('y', n) => (fixed(n), Some("%Y")),
        ('M', 1) => (r"\d{1,2}".to_owned(), Some("%m")),
        ('M', 2) => (fixed(2), Some("%m")),
        ('M', 3) => ("[A-Za-z]{3}".to_owned(), Some("%b")),
        ('M', _) => ("[A-Za-z]+".to_owned(), Some("%B")),
        ('d', 1) => (r"\d{1,2}".to_owned(), Some("%d")),
        ('d', 2) => (fixed(2), Some("%d")),
        ('d', 3) => ("[A-Za-z]{3}".to_owned(), Some("%a")),
        ('d', _) => ("[A-Za-z]+".to_owned(), Some("%A")),
        ('H', 1) => (r"\d{1,2}".to_owned(), Some("%H")),
        ('H', _) => (fixed(2), Some("%H")),
        ('h', 1) => (r"\d{1,2}".to_owned(), Some("%I")),
        ('h', _) => (fixed(2), Some("%I")),
        ('m', 1) => (r"\d{1,2}".to_owned(), Some("%M")),
        ('m', _) => (fixed(2), Some("%M")),
        ('s', 1) => (r"\d{1,2}".to_owned(), Some("%S")),
        ('s', _) => (fixed(2), Some("%S")),
        ('f', n) if n <= 9 => (fixed(n), Some("%f")),
        ('F', n) if n <= 9 => (format!(r"\d{{0,{n}}}"), None),
        ('t', 1) => ("[AaPp]".to_owned(), None),
        ('t', _) => ("[AaPp][Mm]".to_owned(), Some("%p")),
        ('z', 1) => (r"[+-]\d{1,2}".to_owned(), None),
        ('z', 2) => (r"[+-]\d{2}".to_owned(), None),
        ('z', _) => (r"[+-]\d{2}:\d{2}".to_owned(), Some("%:z")),
        ('K', _) => (r"(?:Z|[+-]\d{2}:\d{2})?".to_owned(), None),
        _ => return None,
    };
    Some(spec)
}

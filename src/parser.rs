use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use tracing::warn;

use crate::models::ParsedRow;

/// `DD/MM/YYYY`, a non-greedy description, then the first amount that
/// follows: `.` thousands, `,` decimals, optional `C`/`D` suffix.
const LINE_PATTERN: &str = r"(\d{2}/\d{2}/\d{4})\s+(.*?)\s+([\d.]+,\d{2}\s?[CD]?)";

fn line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(LINE_PATTERN).expect("line pattern is valid"))
}

fn whitespace_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t\r\x0B\x0C]{2,}").expect("whitespace pattern is valid"))
}

pub struct ParseOutcome {
    pub rows: Vec<ParsedRow>,
    pub unparsed: usize,
}

/// Match one line of recognized text. Returns `None` for lines that do not
/// carry a date, a description and an amount.
///
/// The date must exist on the calendar, so OCR misreads such as `30/02/2024`
/// or `45/13/2024` are rejected and end up counted as unparsed lines.
pub fn parse_line(line: &str) -> Option<ParsedRow> {
    let caps = line_regex().captures(line)?;
    let date = caps.get(1)?.as_str();
    NaiveDate::parse_from_str(date, "%d/%m/%Y").ok()?;
    Some(ParsedRow {
        date: date.to_string(),
        description: caps.get(2)?.as_str().trim().to_string(),
        amount: caps.get(3)?.as_str().replace(' ', ""),
    })
}

/// Split one page of recognized text into lines and parse each of them.
/// Lines that do not match are logged and dropped.
pub fn parse_page(text: &str) -> ParseOutcome {
    let collapsed = whitespace_run().replace_all(text, " ");
    let mut rows = Vec::new();
    let mut unparsed = 0usize;

    for line in collapsed.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_line(line) {
            Some(row) => rows.push(row),
            None => {
                warn!("Line ignored (does not match the statement pattern): {line}");
                unparsed += 1;
            }
        }
    }

    ParseOutcome { rows, unparsed }
}

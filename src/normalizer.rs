use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use crate::models::{ParsedRow, TransactionRecord};
use crate::settings::{DescriptionCleanup, Settings};

fn amount_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(-?)(\d[\d.]*),(\d{2})([CD]?)$").expect("amount pattern is valid")
    })
}

fn leading_number() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*\d+\s*").expect("leading number pattern is valid"))
}

/// Remove the document/sequence number OCR tends to glue onto the front of a
/// description. `AlphaOnly` also drops every non-letter character.
pub fn clean_description(text: &str, mode: DescriptionCleanup) -> String {
    let stripped = leading_number().replace(text, "");
    match mode {
        DescriptionCleanup::LeadingDigits => stripped.trim().to_string(),
        DescriptionCleanup::AlphaOnly => stripped
            .chars()
            .filter(|c| c.is_alphabetic() || c.is_whitespace())
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// Convert `1.234,56D` style text to a signed value. `D` negates, `C` or no
/// suffix keeps the value positive. Returns `None` for anything else.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let caps = amount_regex().captures(&compact)?;
    let integer = caps[2].replace('.', "");
    let value: f64 = format!("{}{integer}.{}", &caps[1], &caps[3]).parse().ok()?;
    if &caps[4] == "D" {
        Some(-value)
    } else {
        Some(value)
    }
}

/// Format a value with `.` thousands and `,` decimals: -1234.56 -> -1.234,56
pub fn format_amount(val: f64) -> String {
    let negative = val < 0.0;
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut grouped = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();

    if negative && cents != "0.00" {
        format!("-{grouped},{dec_part}")
    } else {
        format!("{grouped},{dec_part}")
    }
}

pub fn is_balance_row(description: &str, marker: &str) -> bool {
    !marker.is_empty() && description.to_uppercase().contains(&marker.to_uppercase())
}

/// Clean descriptions, convert amounts and drop balance and zero-value rows.
pub fn normalize(rows: Vec<ParsedRow>, settings: &Settings) -> Vec<TransactionRecord> {
    let mut records = Vec::with_capacity(rows.len());

    for row in rows {
        let description = clean_description(&row.description, settings.description_cleanup);
        if is_balance_row(&description, &settings.balance_marker) {
            continue;
        }

        let amount = parse_amount(&row.amount);
        match amount {
            Some(value) if value == 0.0 => continue,
            Some(_) => {}
            None => warn!(
                "Could not convert amount '{}' on {} ({description})",
                row.amount, row.date
            ),
        }

        records.push(TransactionRecord {
            date: row.date,
            description,
            amount,
            raw_amount: row.amount,
            codes: None,
            generic_code: None,
        });
    }

    records
}

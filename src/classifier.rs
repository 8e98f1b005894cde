use std::collections::{HashMap, HashSet};
use std::path::Path;

use calamine::{Data, Reader};
use tracing::{info, warn};

use crate::error::{GenesisError, Result};
use crate::models::{CodeTriple, TransactionRecord};
use crate::settings::{CodeSource, Settings};

pub const DESCRIPTION_COLUMN: &str = "Histórico";
pub const DEBIT_COLUMN: &str = "Cód. Conta Debito";
pub const CREDIT_COLUMN: &str = "Cód. Conta Credito";
pub const HISTORY_COLUMN: &str = "Cód. Histórico";
pub const GENERIC_COLUMN: &str = "Código";

const REQUIRED_COLUMNS: [&str; 4] = [DESCRIPTION_COLUMN, DEBIT_COLUMN, CREDIT_COLUMN, HISTORY_COLUMN];

/// Lottery-agency statement codes used when no reference workbook is wanted.
const EMBEDDED_CODES: &[(&str, CodeTriple)] = &[
    ("CR-COM-SIL", CodeTriple::new(9, 5, 10)),
    ("AZCX MC CD", CodeTriple::new(9, 5, 10)),
    ("AZCX EL CD", CodeTriple::new(9, 5, 10)),
    ("AZCX VS CD", CodeTriple::new(9, 5, 10)),
    ("DEB ISSQN", CodeTriple::new(215, 9, 10)),
    ("DP DIN LOT", CodeTriple::new(289, 9, 10)),
];

pub fn normalize_key(description: &str) -> String {
    description.trim().to_uppercase()
}

/// Description -> accounting codes, read once per operation.
#[derive(Debug, Default)]
pub struct ReferenceTable {
    codes: HashMap<String, CodeTriple>,
    generic: Option<HashMap<String, i64>>,
    skipped: usize,
}

impl ReferenceTable {
    pub fn embedded() -> Self {
        Self::from_entries(EMBEDDED_CODES.iter().map(|(d, c)| (*d, *c)))
    }

    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, CodeTriple)>) -> Self {
        let codes = entries
            .into_iter()
            .map(|(desc, triple)| (normalize_key(desc), triple))
            .collect();
        Self {
            codes,
            generic: None,
            skipped: 0,
        }
    }

    /// Resolve the table an operation should use according to `settings`.
    pub fn for_settings(settings: &Settings) -> Result<Self> {
        match settings.code_source {
            CodeSource::Embedded => Ok(Self::embedded()),
            CodeSource::ReferenceTable => {
                let path = settings
                    .reference_table()
                    .ok_or(GenesisError::MissingReferenceTable)?;
                Self::load(&path)
            }
        }
    }

    /// Read the first worksheet of a reference workbook. The header row is the
    /// first row that contains the description column.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(GenesisError::ReferenceTableNotFound(path.display().to_string()));
        }
        let mut workbook = calamine::open_workbook_auto(path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| GenesisError::Other(format!("{} has no worksheets", path.display())))??;

        let mut rows = range.rows();
        let header = rows
            .by_ref()
            .find(|row| row.iter().any(|c| cell_text(c).as_deref() == Some(DESCRIPTION_COLUMN)));
        let Some(header) = header else {
            return Err(GenesisError::MissingColumns(
                REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            ));
        };

        let position = |name: &str| {
            header
                .iter()
                .position(|c| cell_text(c).as_deref() == Some(name))
        };
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| position(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(GenesisError::MissingColumns(missing));
        }
        let (Some(idx_desc), Some(idx_debit), Some(idx_credit), Some(idx_history)) = (
            position(DESCRIPTION_COLUMN),
            position(DEBIT_COLUMN),
            position(CREDIT_COLUMN),
            position(HISTORY_COLUMN),
        ) else {
            return Err(GenesisError::MissingColumns(
                REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            ));
        };
        let idx_generic = position(GENERIC_COLUMN);

        let mut table = Self {
            codes: HashMap::new(),
            generic: idx_generic.map(|_| HashMap::new()),
            skipped: 0,
        };

        for row in rows {
            let Some(description) = row.get(idx_desc).and_then(cell_text) else {
                continue;
            };
            if description.trim().is_empty() {
                continue;
            }

            if let (Some(generic), Some(idx)) = (table.generic.as_mut(), idx_generic) {
                if let Some(code) = row.get(idx).and_then(cell_code) {
                    generic.insert(description.clone(), code);
                }
            }

            let codes = (
                row.get(idx_debit).and_then(cell_code),
                row.get(idx_credit).and_then(cell_code),
                row.get(idx_history).and_then(cell_code),
            );
            match codes {
                (Some(debit), Some(credit), Some(history)) => {
                    table
                        .codes
                        .insert(normalize_key(&description), CodeTriple::new(debit, credit, history));
                }
                _ => {
                    warn!("Reference row '{description}' has incomplete codes, skipped");
                    table.skipped += 1;
                }
            }
        }

        info!(
            "Reference table loaded from {}: {} entries, {} skipped",
            path.display(),
            table.codes.len(),
            table.skipped
        );
        Ok(table)
    }

    pub fn lookup(&self, description: &str) -> Option<CodeTriple> {
        self.codes.get(&normalize_key(description)).copied()
    }

    /// Generic code for a description, matched exactly as written in the table.
    pub fn generic_code(&self, description: &str) -> Option<i64> {
        self.generic.as_ref()?.get(description).copied()
    }

    pub fn has_generic_codes(&self) -> bool {
        self.generic.is_some()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.trim().to_string()),
        other => Some(other.to_string()),
    }
}

fn cell_code(cell: &Data) -> Option<i64> {
    match cell {
        Data::Int(i) => Some(*i),
        Data::Float(f) if f.fract() == 0.0 => Some(*f as i64),
        Data::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.fract() == 0.0)
                    .map(|f| f as i64)
            })
        }
        _ => None,
    }
}

pub struct ClassifyResult {
    pub matched: usize,
    pub unmatched: Vec<String>,
}

/// Fill in codes for every record the table knows. Records without a match
/// keep empty codes; their descriptions are reported once each.
pub fn classify(records: &mut [TransactionRecord], table: &ReferenceTable) -> ClassifyResult {
    let mut matched = 0usize;
    let mut seen = HashSet::new();
    let mut unmatched = Vec::new();

    for record in records.iter_mut() {
        record.codes = table.lookup(&record.description);
        record.generic_code = table.generic_code(&record.description);
        if record.codes.is_some() {
            matched += 1;
        } else if seen.insert(normalize_key(&record.description)) {
            unmatched.push(record.description.trim().to_string());
        }
    }

    if !unmatched.is_empty() {
        warn!(
            "Descriptions not found in the reference table: {}",
            unmatched.join(" | ")
        );
    }

    ClassifyResult { matched, unmatched }
}

/// Date/description/amount triple captured from one line of recognized text,
/// before any cleanup.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub date: String,
    pub description: String,
    pub amount: String,
}

/// Debit account, credit account and history code assigned to a description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeTriple {
    pub debit: i64,
    pub credit: i64,
    pub history: i64,
}

impl CodeTriple {
    pub const fn new(debit: i64, credit: i64, history: i64) -> Self {
        Self {
            debit,
            credit,
            history,
        }
    }
}

/// One statement transaction as it travels from the normalizer to the writers.
///
/// `amount` is `None` when `raw_amount` could not be converted. Codes are
/// either fully resolved or absent, never partially filled.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub date: String,
    pub description: String,
    pub amount: Option<f64>,
    pub raw_amount: String,
    pub codes: Option<CodeTriple>,
    pub generic_code: Option<i64>,
}

impl TransactionRecord {
    pub fn debit_code(&self) -> Option<i64> {
        self.codes.map(|c| c.debit)
    }

    pub fn credit_code(&self) -> Option<i64> {
        self.codes.map(|c| c.credit)
    }

    pub fn history_code(&self) -> Option<i64> {
        self.codes.map(|c| c.history)
    }
}

use serde::Serialize;
use thiserror::Error;

use crate::fmt::{clean_currency, clean_currency_text, format_currency, money};
use crate::models::AccountOption;
use crate::page::SelectOption;

/// Value of the "nothing chosen yet" option every account selector starts on.
pub const UNSELECTED: &str = "-1";
pub const UNSELECTED_LABEL: &str = "--select account--";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Debit,
    Credit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Free-form entry: any number of rows on both sides.
    Full,
    /// Expense categories paid from a single payment account.
    Simple,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    #[error("Debit and credit balances don't match.")]
    Unbalanced,
    #[error("Incomplete Form!")]
    Incomplete,
    #[error("Cannot have blank amount for any account")]
    BlankAmount,
    #[error("Cannot have negative or zero amount")]
    NonPositiveAmount,
    #[error("Invalid account selected")]
    InvalidAccount,
    #[error("Date must be YYYY-MM-DD")]
    InvalidDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRow {
    /// Index into the group's options; 0 is the unselected sentinel.
    pub account: usize,
    pub amount: String,
    pub removable: bool,
}

/// One side of the entry: its rows plus the derived subtotal.
#[derive(Debug, Clone, PartialEq)]
pub struct RowGroup {
    pub direction: Direction,
    pub label: &'static str,
    pub options: Vec<SelectOption>,
    pub rows: Vec<LedgerRow>,
    pub subtotal: f64,
    /// Whether the group offers an Add control.
    pub addable: bool,
}

impl RowGroup {
    pub fn new(direction: Direction, label: &'static str, addable: bool) -> Self {
        Self {
            direction,
            label,
            options: vec![SelectOption::new(UNSELECTED, UNSELECTED_LABEL)],
            rows: Vec::new(),
            subtotal: 0.0,
            addable,
        }
    }

    pub fn set_accounts(&mut self, accounts: &[AccountOption]) {
        self.options.truncate(1);
        self.options
            .extend(accounts.iter().map(|a| SelectOption::new(&a.id, &a.name)));
    }

    pub fn add_row(&mut self, removable: bool) {
        self.rows.push(LedgerRow {
            account: 0,
            amount: String::new(),
            removable,
        });
    }

    /// Returns false (and leaves the group alone) for fixed rows.
    pub fn remove_row(&mut self, index: usize) -> bool {
        match self.rows.get(index) {
            Some(row) if row.removable => {
                self.rows.remove(index);
                self.recompute_subtotal();
                true
            }
            _ => false,
        }
    }

    pub fn focus_amount(&mut self, index: usize) {
        if let Some(row) = self.rows.get_mut(index) {
            row.amount = clean_currency_text(&row.amount);
        }
    }

    pub fn blur_amount(&mut self, index: usize) {
        if let Some(row) = self.rows.get_mut(index) {
            row.amount = format_currency(&row.amount);
        }
        self.recompute_subtotal();
    }

    pub fn cycle_account(&mut self, index: usize, forward: bool) {
        let count = self.options.len();
        if let Some(row) = self.rows.get_mut(index) {
            row.account = if forward {
                (row.account + 1) % count
            } else {
                (row.account + count - 1) % count
            };
        }
    }

    pub fn account_label(&self, index: usize) -> &str {
        self.rows
            .get(index)
            .and_then(|row| self.options.get(row.account))
            .map(|o| o.label.as_str())
            .unwrap_or(UNSELECTED_LABEL)
    }

    /// Invalid amounts count as zero here; submission rejects them.
    pub fn recompute_subtotal(&mut self) {
        self.subtotal = self
            .rows
            .iter()
            .map(|row| clean_currency(&row.amount).unwrap_or(0.0))
            .sum();
    }

    pub fn subtotal_text(&self) -> String {
        money(self.subtotal)
    }

    /// Validate each row in order and turn the group into ledger lines.
    pub fn gather(&self) -> Result<Vec<LedgerEntry>, ComposeError> {
        let mut lines = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            if row.amount.trim().is_empty() {
                return Err(ComposeError::BlankAmount);
            }
            let amount = match clean_currency(&row.amount) {
                Some(v) if v > 0.0 => v,
                _ => return Err(ComposeError::NonPositiveAmount),
            };
            let account_id = self
                .options
                .get(row.account)
                .map(|o| o.value.as_str())
                .unwrap_or(UNSELECTED);
            if account_id == UNSELECTED {
                return Err(ComposeError::InvalidAccount);
            }
            lines.push(LedgerEntry {
                amount,
                direction: self.direction,
                account_id: account_id.to_string(),
            });
        }
        Ok(lines)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub amount: f64,
    pub direction: Direction,
    pub account_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryHeader {
    pub timestamp: String,
    pub entity_id: String,
    pub vendor: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JournalEntrySubmission {
    pub new_journal_entry: EntryHeader,
    pub ledger_list: Vec<LedgerEntry>,
}

/// The text fields of the composer form.
#[derive(Debug, Clone, Default)]
pub struct Draft {
    pub date: String,
    pub vendor: String,
    pub description: String,
}

fn cents(value: f64) -> i64 {
    (value * 100.0).round() as i64
}

/// Validate the whole entry, fail-fast, and build the submission.
///
/// Balance is checked first for both variants, then the simple variant's
/// required header fields, then every debit row followed by every credit row,
/// and finally the date format.
pub fn compose(
    variant: Variant,
    entity_id: &str,
    draft: &Draft,
    debit: &RowGroup,
    credit: &RowGroup,
) -> Result<JournalEntrySubmission, ComposeError> {
    let mut debit = debit.clone();
    let mut credit = credit.clone();
    debit.recompute_subtotal();
    credit.recompute_subtotal();

    if cents(debit.subtotal) != cents(credit.subtotal) {
        return Err(ComposeError::Unbalanced);
    }

    let date = draft.date.trim();
    let vendor = draft.vendor.trim();
    let description = draft.description.trim();
    if variant == Variant::Simple && (date.is_empty() || vendor.is_empty() || description.is_empty()) {
        return Err(ComposeError::Incomplete);
    }

    let mut ledger_list = debit.gather()?;
    ledger_list.extend(credit.gather()?);

    if chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
        return Err(ComposeError::InvalidDate);
    }

    Ok(JournalEntrySubmission {
        new_journal_entry: EntryHeader {
            timestamp: date.to_string(),
            entity_id: entity_id.to_string(),
            vendor: (!vendor.is_empty()).then(|| vendor.to_string()),
            description: description.to_string(),
        },
        ledger_list,
    })
}

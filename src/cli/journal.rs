use chrono::NaiveDate;
use comfy_table::{Cell, CellAlignment, Table};

use super::Console;
use crate::endpoints::{self, JournalFilter};
use crate::error::{DeskError, Result};
use crate::fmt::money;
use crate::models::{JournalRecord, LedgerLine};

const DEFAULT_START: &str = "2025-01-01";
const DEFAULT_STOP: &str = "2030-01-01";

fn check_date(date: &str) -> Result<()> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| DeskError::Other(format!("Invalid date {date}: expected YYYY-MM-DD")))
}

/// A date range is sent only when at least one end is given; the other end
/// falls back to the journal view's defaults.
pub fn build_filter(
    max_rows: u32,
    from_date: Option<String>,
    to_date: Option<String>,
    account: Option<String>,
) -> Result<JournalFilter> {
    let dates = match (from_date, to_date) {
        (None, None) => None,
        (from, to) => {
            let from = from.unwrap_or_else(|| DEFAULT_START.to_string());
            let to = to.unwrap_or_else(|| DEFAULT_STOP.to_string());
            check_date(&from)?;
            check_date(&to)?;
            Some((from, to))
        }
    };
    Ok(JournalFilter {
        account_name: account.filter(|a| !a.trim().is_empty()),
        max_rows: Some(max_rows),
        dates,
    })
}

fn lines(lines: &[LedgerLine]) -> String {
    lines
        .iter()
        .map(|l| format!("{}  {}", l.account, money(l.amount)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn journal_table(records: &[JournalRecord]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Date", "User", "Vendor", "Description", "Debits", "Credits"]);
    for r in records {
        table.add_row(vec![
            Cell::new(&r.date),
            Cell::new(&r.user),
            Cell::new(r.vendor.as_deref().unwrap_or("")),
            Cell::new(&r.description),
            Cell::new(lines(&r.debits)).set_alignment(CellAlignment::Right),
            Cell::new(lines(&r.credits)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub fn run(
    max_rows: u32,
    from_date: Option<String>,
    to_date: Option<String>,
    account: Option<String>,
) -> Result<()> {
    let filter = build_filter(max_rows, from_date, to_date, account)?;
    let console = Console::open()?;
    let (session, entity) = console.entity()?;

    let body = console.fetch(Some(&session.token), &endpoints::journal(&entity, &filter))?;
    let records = endpoints::read_journal(body)?;
    if records.is_empty() {
        println!("No journal entries.");
        return Ok(());
    }
    println!("Journal Entries\n{}", journal_table(&records));
    println!("{} entries", records.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_without_dates() {
        let filter = build_filter(100, None, None, Some("Rent".into())).unwrap();
        assert_eq!(filter.max_rows, Some(100));
        assert_eq!(filter.account_name.as_deref(), Some("Rent"));
        assert_eq!(filter.dates, None);
    }

    #[test]
    fn test_one_date_fills_the_other() {
        let filter = build_filter(1000, Some("2025-06-01".into()), None, None).unwrap();
        assert_eq!(
            filter.dates,
            Some(("2025-06-01".to_string(), DEFAULT_STOP.to_string()))
        );
        assert!(build_filter(1000, None, Some("06/01/2025".into()), None).is_err());
    }

    #[test]
    fn test_journal_table_shows_both_sides() {
        let records = vec![JournalRecord {
            date: "2025-03-01".into(),
            user: "ada".into(),
            vendor: Some("Landlord".into()),
            description: "March rent".into(),
            debits: vec![LedgerLine { account: "Rent".into(), amount: 1200.0 }],
            credits: vec![LedgerLine { account: "Checking".into(), amount: 1200.0 }],
        }];
        let rendered = journal_table(&records).to_string();
        assert!(rendered.contains("Landlord"));
        assert!(rendered.contains("Rent  $1,200.00"));
        assert!(rendered.contains("Checking  $1,200.00"));
    }
}

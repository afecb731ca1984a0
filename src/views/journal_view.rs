use crate::api::Outcome;
use crate::composer::{UNSELECTED, UNSELECTED_LABEL};
use crate::endpoints::{self, JournalFilter};
use crate::fmt::money;
use crate::models::{JournalRecord, LedgerLine};
use crate::page::{Form, FormField, Page, PageEvent, SelectOption};
use crate::table::{Column, TableData};
use crate::view::{on_success, Activation, Section, Tag, View};

use super::decoded;

const NAMES: Tag = "account-names";
const ENTRIES: Tag = "journal-entries";

const FILTER_FORM: &str = "form-filter";
const BTN_APPLY: &str = "btn-filter-refresh";
const JOURNAL_TABLE: &str = "data-table";

const MAX_ROWS: [&str; 3] = ["1000", "100", "10"];

fn lines(lines: &[LedgerLine]) -> String {
    lines
        .iter()
        .map(|l| format!("{} {}", l.account, money(l.amount)))
        .collect::<Vec<_>>()
        .join("; ")
}

fn journal_columns() -> Vec<Column<JournalRecord>> {
    vec![
        Column::text("date", |r: &JournalRecord| r.date.clone()),
        Column::text("user", |r: &JournalRecord| r.user.clone()),
        Column::text("vendor", |r: &JournalRecord| r.vendor.clone().unwrap_or_default()),
        Column::text("description", |r: &JournalRecord| r.description.clone()),
        Column::text("debits", |r: &JournalRecord| lines(&r.debits)),
        Column::text("credits", |r: &JournalRecord| lines(&r.credits)),
    ]
}

fn filter_form() -> Form {
    let max_rows = MAX_ROWS
        .iter()
        .map(|n| SelectOption::new(n, &format!("Max {n}")))
        .collect();
    Form::new(vec![
        FormField::toggle("chk-filter-date", "Transaction Dates", false),
        FormField::text("date-start", "start", "2025-01-01"),
        FormField::text("date-end", "end", "2030-01-01"),
        FormField::selector("filter-max-ret-val", "Rows", max_rows),
        FormField::selector(
            "account_id",
            "Specific Account",
            vec![SelectOption::new(UNSELECTED, UNSELECTED_LABEL)],
        ),
    ])
}

/// Read the filter form the way the query string is assembled.
fn read_filter(form: &Form) -> JournalFilter {
    let account = form.value("account_id");
    let dates = (form.value("chk-filter-date") == "on")
        .then(|| (form.value("date-start"), form.value("date-end")));
    JournalFilter {
        account_name: (account != UNSELECTED).then_some(account),
        max_rows: form.value("filter-max-ret-val").parse().ok(),
        dates,
    }
}

/// Filterable listing of journal entries for the current entity.
#[derive(Default)]
pub struct JournalView;

impl View for JournalView {
    fn markup(&self) -> Page {
        Page::new("Journal Entries")
            .heading("filters-heading", "Filters")
            .form(FILTER_FORM, filter_form())
            .button(BTN_APPLY, "Apply", true)
            .table(
                JOURNAL_TABLE,
                TableData::with_columns(&journal_columns()).sortable(),
            )
    }

    fn section(&self) -> Section {
        Section::Journal
    }

    fn activate(&mut self, page: &mut Page, cx: &mut Activation) {
        if let Some(entity) = cx.require_entity(page) {
            cx.request(NAMES, endpoints::account_names(&entity));
        }
    }

    fn on_response(&mut self, tag: Tag, outcome: Outcome, page: &mut Page, _cx: &mut Activation) {
        match tag {
            NAMES => on_success(outcome, page, |body, page| {
                let Some(names) = decoded(page, endpoints::read_account_names(body)) else {
                    return;
                };
                let mut options = vec![SelectOption::new(UNSELECTED, UNSELECTED_LABEL)];
                options.extend(names.iter().map(|n| SelectOption::new(n, n)));
                if let Some(form) = page.form_mut(FILTER_FORM) {
                    form.set_options("account_id", options);
                }
            }),
            ENTRIES => on_success(outcome, page, |body, page| {
                if let Some(records) = decoded(page, endpoints::read_journal(body)) {
                    tracing::debug!(count = records.len(), "journal entries loaded");
                    if let Some(table) = page.table_mut(JOURNAL_TABLE) {
                        table.populate(&records, &journal_columns(), |r| r.date.clone());
                    }
                }
            }),
            _ => {}
        }
    }

    fn on_event(&mut self, event: PageEvent, page: &mut Page, cx: &mut Activation) {
        match event {
            PageEvent::Click(BTN_APPLY) | PageEvent::Submit(FILTER_FORM) => {
                let Some(entity) = cx.require_entity(page) else {
                    return;
                };
                let Some(filter) = page.form_data(FILTER_FORM).map(read_filter) else {
                    return;
                };
                cx.request(ENTRIES, endpoints::journal(&entity, &filter));
            }
            _ => {}
        }
    }
}

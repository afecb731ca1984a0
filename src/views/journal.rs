use crate::api::Outcome;
use crate::composer::{compose, Direction, Draft, RowGroup, Variant};
use crate::endpoints;
use crate::models::AccountOption;
use crate::page::{Form, FormField, Page, PageEvent};
use crate::view::{on_success, Activation, Section, Tag, View};

use super::decoded;

const ACCOUNTS: Tag = "accounts";
const EXPENSE_ACCOUNTS: Tag = "expense-accounts";
const ASSET_ACCOUNTS: Tag = "asset-accounts";
const LIABILITY_ACCOUNTS: Tag = "liability-accounts";
const POST: Tag = "post-journal";

const META_FORM: &str = "form-journal-entry";
const DEBIT: &str = "journal-entry-debit";
const CREDIT: &str = "journal-entry-credit";
const BTN_SUBMIT: &str = "btn-new-journal-submit";

/// Double-entry composer. `Full` edits both sides freely; `Simple` pays a set
/// of expense rows from one fixed payment row.
pub struct ComposerView {
    variant: Variant,
    /// Short-term assets held until the liabilities arrive.
    assets: Option<Vec<AccountOption>>,
}

impl ComposerView {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            assets: None,
        }
    }

    fn groups(&self) -> (RowGroup, RowGroup) {
        match self.variant {
            Variant::Full => (
                RowGroup::new(Direction::Debit, "Debit", true),
                RowGroup::new(Direction::Credit, "Credit", true),
            ),
            Variant::Simple => (
                RowGroup::new(Direction::Debit, "expense categories", true),
                RowGroup::new(Direction::Credit, "payment method", false),
            ),
        }
    }

    fn fill(page: &mut Page, id: &str, accounts: &[AccountOption], removable: bool) {
        if let Some(group) = page.ledger_mut(id) {
            group.set_accounts(accounts);
            group.add_row(removable);
        }
    }

    fn submit(&self, page: &mut Page, cx: &mut Activation) {
        let Some(entity) = cx.require_entity(page) else {
            return;
        };
        let (Some(form), Some(debit), Some(credit)) = (
            page.form_data(META_FORM),
            page.ledger_group(DEBIT),
            page.ledger_group(CREDIT),
        ) else {
            return;
        };
        let draft = Draft {
            date: form.value("date"),
            vendor: form.value("vendor"),
            description: form.value("description"),
        };
        let entry = match compose(self.variant, &entity, &draft, debit, credit) {
            Ok(entry) => entry,
            Err(e) => {
                cx.alert(e.to_string());
                return;
            }
        };
        match endpoints::post_journal(&entry) {
            Ok(request) => cx.request(POST, request),
            Err(e) => page.set_message(&e.to_string()),
        }
    }
}

impl View for ComposerView {
    fn markup(&self) -> Page {
        let (title, vendor_label) = match self.variant {
            Variant::Full => ("new journal entry", "Vendor (optional)"),
            Variant::Simple => ("simple expense entry", "Vendor"),
        };
        let today = chrono::Local::now().format("%Y-%m-%d").to_string();
        let (debit, credit) = self.groups();
        Page::new(title)
            .form(
                META_FORM,
                Form::new(vec![
                    FormField::text("date", "Date (YYYY-MM-DD)", &today),
                    FormField::text("vendor", vendor_label, ""),
                    FormField::text("description", "Description", ""),
                ]),
            )
            .ledger(DEBIT, debit)
            .ledger(CREDIT, credit)
            .button(BTN_SUBMIT, "Submit", true)
    }

    fn section(&self) -> Section {
        Section::Journal
    }

    fn activate(&mut self, page: &mut Page, cx: &mut Activation) {
        let Some(entity) = cx.require_entity(page) else {
            return;
        };
        match self.variant {
            Variant::Full => cx.request(ACCOUNTS, endpoints::list_of_accounts(&entity, None)),
            Variant::Simple => {
                cx.request(
                    EXPENSE_ACCOUNTS,
                    endpoints::list_of_accounts(&entity, Some("EXPENSE")),
                );
                cx.request(ASSET_ACCOUNTS, endpoints::master_list(&entity, "ASSET_SHORT"));
            }
        }
    }

    fn on_response(&mut self, tag: Tag, outcome: Outcome, page: &mut Page, cx: &mut Activation) {
        match tag {
            ACCOUNTS => on_success(outcome, page, |body, page| {
                if let Some(accounts) = decoded(page, endpoints::read_accounts(body)) {
                    Self::fill(page, DEBIT, &accounts, true);
                    Self::fill(page, CREDIT, &accounts, true);
                }
            }),
            EXPENSE_ACCOUNTS => on_success(outcome, page, |body, page| {
                if let Some(accounts) = decoded(page, endpoints::read_accounts(body)) {
                    Self::fill(page, DEBIT, &accounts, true);
                }
            }),
            ASSET_ACCOUNTS => on_success(outcome, page, |body, page| {
                if let Some(assets) = decoded(page, endpoints::read_accounts(body)) {
                    self.assets = Some(assets);
                    if let Some(entity) = cx.current_entity.clone() {
                        cx.request(
                            LIABILITY_ACCOUNTS,
                            endpoints::master_list(&entity, "LIABILITY_SHORT"),
                        );
                    }
                }
            }),
            LIABILITY_ACCOUNTS => on_success(outcome, page, |body, page| {
                if let Some(liabilities) = decoded(page, endpoints::read_accounts(body)) {
                    let mut payment = self.assets.take().unwrap_or_default();
                    payment.extend(liabilities);
                    Self::fill(page, CREDIT, &payment, false);
                }
            }),
            POST => on_success(outcome, page, |_, _| {
                cx.reload_with_message("Journal entry successfully added.");
            }),
            _ => {}
        }
    }

    fn on_event(&mut self, event: PageEvent, page: &mut Page, cx: &mut Activation) {
        match event {
            PageEvent::Click(BTN_SUBMIT) | PageEvent::Submit(META_FORM) => self.submit(page, cx),
            _ => {}
        }
    }
}

use crate::api::Outcome;
use crate::endpoints::{self, MASTER_TYPE_KEYS};
use crate::fmt::money;
use crate::models::AccountTreeNode;
use crate::page::{Form, FormField, Page, PageEvent, SelectOption};
use crate::table::{flatten_tree, Row, TableData};
use crate::view::{on_success, Activation, Section, Tag, View};

use super::decoded;

const TREE: Tag = "account-tree";
const AMOUNTS: Tag = "account-amounts";

const KEYS_FORM: &str = "form-keys";
const BTN_SHOW: &str = "btn-show";
const TITLE: &str = "header-title";
const TREE_TABLE: &str = "tree-table";

/// One master account type as an indented tree with balances.
#[derive(Default)]
pub struct TreeView {
    /// Tree waiting for its amounts.
    tree: Option<AccountTreeNode>,
    /// A tree/amounts exchange is outstanding.
    loading: bool,
    /// Show was pressed while loading; fetch again once it settles.
    queued: bool,
}

impl TreeView {
    /// One exchange at a time, so the tree on screen always belongs to the
    /// last key asked for.
    fn fetch(&mut self, page: &mut Page, cx: &mut Activation) {
        if self.loading {
            self.queued = true;
            return;
        }
        let Some(entity) = cx.require_entity(page) else {
            return;
        };
        let key = page
            .form_data(KEYS_FORM)
            .map(|f| f.value("master_type_key"))
            .unwrap_or_default();
        cx.request(TREE, endpoints::account_tree(&entity, &key));
        self.loading = true;
    }

    /// Ends the current exchange. Returns true when a newer Show took over.
    fn settle(&mut self, page: &mut Page, cx: &mut Activation) -> bool {
        self.loading = false;
        if !std::mem::take(&mut self.queued) {
            return false;
        }
        self.tree = None;
        self.fetch(page, cx);
        true
    }

    fn render(&mut self, outcome: Outcome, page: &mut Page) {
        on_success(outcome, page, |body, page| {
            let Some(amounts) = decoded(page, endpoints::read_amounts(body)) else {
                return;
            };
            let Some(tree) = self.tree.take() else {
                return;
            };
            let root_amount = amounts.get(&tree.id).copied().unwrap_or(0.0);
            page.set_text(TITLE, &format!("{}, {}", tree.name, money(root_amount)));
            if let Some(table) = page.table_mut(TREE_TABLE) {
                table.rows = flatten_tree(&tree.children, &amounts)
                    .into_iter()
                    .map(Row::from)
                    .collect();
                table.selected = 0;
            }
        });
    }
}

impl View for TreeView {
    fn markup(&self) -> Page {
        let options = MASTER_TYPE_KEYS
            .iter()
            .map(|(key, label)| SelectOption::new(key, label))
            .collect();
        let mut table = TableData::new(&["account", "amount"]);
        table.numeric = vec![false, true];
        Page::new("accounts")
            .form(
                KEYS_FORM,
                Form::new(vec![FormField::selector("master_type_key", "Master type", options)]),
            )
            .button(BTN_SHOW, "Show", true)
            .heading(TITLE, "")
            .table(TREE_TABLE, table)
    }

    fn section(&self) -> Section {
        Section::Accounts
    }

    fn activate(&mut self, page: &mut Page, cx: &mut Activation) {
        self.fetch(page, cx);
    }

    fn on_response(&mut self, tag: Tag, outcome: Outcome, page: &mut Page, cx: &mut Activation) {
        match tag {
            TREE => {
                if self.settle(page, cx) {
                    return;
                }
                let mut waiting = false;
                on_success(outcome, page, |body, page| {
                    if let Some(tree) = decoded(page, endpoints::read_tree(body)) {
                        tracing::debug!(accounts = tree.node_count(), "account tree loaded");
                        if let Some(entity) = cx.current_entity.clone() {
                            self.tree = Some(tree);
                            cx.request(AMOUNTS, endpoints::account_amounts(&entity));
                            waiting = true;
                        }
                    }
                });
                self.loading = waiting;
            }
            AMOUNTS => {
                if self.settle(page, cx) {
                    return;
                }
                self.render(outcome, page);
            }
            _ => {}
        }
    }

    fn on_event(&mut self, event: PageEvent, page: &mut Page, cx: &mut Activation) {
        match event {
            PageEvent::Click(BTN_SHOW) | PageEvent::Submit(KEYS_FORM) => self.fetch(page, cx),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::views::testing::{paths, requests, Harness};

    #[test]
    fn test_no_entity_means_no_calls() {
        let mut h = Harness::new(Box::new(TreeView::default()), None);
        assert!(h.activate().is_empty());
        assert!(h.page.message.starts_with("No entity selected"));
    }

    #[test]
    fn test_tree_then_amounts() {
        let mut h = Harness::new(Box::new(TreeView::default()), Some("e1"));
        let effects = h.activate();
        let (_, request) = requests(&effects).remove(0);
        assert_eq!(request.path, "/accounts/master");
        assert_eq!(
            request.query,
            vec![
                ("entity_id".to_string(), "e1".to_string()),
                ("master_type_key".to_string(), "ASSET_LONG".to_string())
            ]
        );

        let effects = h.ok(
            TREE,
            json!({"id": "root", "name": "Assets, Long Term", "children": [
                {"id": "a", "name": "Land", "children": [
                    {"id": "a1", "name": "Lot 1", "children": []}
                ]},
                {"id": "b", "name": "Buildings", "children": []}
            ]}),
        );
        assert_eq!(paths(&effects), vec!["/accounts/amounts"]);

        h.ok(AMOUNTS, json!({"root": 1500, "a": 1000, "a1": "1000"}));
        assert_eq!(h.page.text_of(TITLE), Some("Assets, Long Term, $1,500.00"));
        let table = h.page.table_data(TREE_TABLE).unwrap();
        let names: Vec<&str> = table.rows.iter().map(|r| r.cells[0].as_str()).collect();
        assert_eq!(names, vec!["Land", "Lot 1", "Buildings"]);
        assert_eq!(table.rows[1].class, Some("level-1"));
        assert_eq!(table.rows[2].cells[1], "$0.00");
    }

    #[test]
    fn test_show_while_loading_renders_only_the_latest_key() {
        let mut h = Harness::new(Box::new(TreeView::default()), Some("e1"));
        h.activate();
        h.page
            .form_mut(KEYS_FORM)
            .unwrap()
            .set_value("master_type_key", "INCOME");
        assert!(h.event(PageEvent::Click(BTN_SHOW)).is_empty());

        // The ASSET_LONG tree lands after Show was pressed again.
        let effects = h.ok(TREE, json!({"id": "al", "name": "Assets, Long Term", "children": []}));
        let (tag, request) = requests(&effects).remove(0);
        assert_eq!(tag, TREE);
        assert_eq!(request.query[1].1, "INCOME");

        let effects = h.ok(TREE, json!({"id": "inc", "name": "Income", "children": [
            {"id": "s", "name": "Sales", "children": []}
        ]}));
        assert_eq!(paths(&effects), vec!["/accounts/amounts"]);
        h.ok(AMOUNTS, json!({"inc": 250, "s": 250}));
        assert_eq!(h.page.text_of(TITLE), Some("Income, $250.00"));

        // Settled: the next Show goes straight out.
        assert_eq!(paths(&h.event(PageEvent::Click(BTN_SHOW))), vec!["/accounts/master"]);
    }

    #[test]
    fn test_failed_tree_allows_another_show() {
        let mut h = Harness::new(Box::new(TreeView::default()), Some("e1"));
        h.activate();
        h.respond(TREE, Outcome::Failure("error 500, boom".to_string()));
        assert_eq!(h.page.message, "error 500, boom");
        assert_eq!(paths(&h.event(PageEvent::Click(BTN_SHOW))), vec!["/accounts/master"]);
    }

    #[test]
    fn test_show_uses_selected_key() {
        let mut h = Harness::new(Box::new(TreeView::default()), Some("e1"));
        h.page
            .form_mut(KEYS_FORM)
            .unwrap()
            .set_value("master_type_key", "INCOME");
        let effects = h.event(PageEvent::Click(BTN_SHOW));
        let (_, request) = requests(&effects).remove(0);
        assert_eq!(request.query[1].1, "INCOME");
    }
}

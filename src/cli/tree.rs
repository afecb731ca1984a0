use std::collections::HashMap;

use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use super::Console;
use crate::endpoints::{self, MASTER_TYPE_KEYS};
use crate::error::{DeskError, Result};
use crate::fmt::money;
use crate::models::AccountTreeNode;
use crate::table::flatten_tree;

/// Accepts any case; returns the canonical key.
pub fn master_type_key(key: &str) -> Result<&'static str> {
    let wanted = key.trim().to_uppercase();
    MASTER_TYPE_KEYS
        .iter()
        .find(|(k, _)| *k == wanted)
        .map(|(k, _)| *k)
        .ok_or_else(|| {
            let known: Vec<&str> = MASTER_TYPE_KEYS.iter().map(|(k, _)| *k).collect();
            DeskError::Other(format!(
                "Unknown master type {key}. Expected one of: {}",
                known.join(", ")
            ))
        })
}

pub fn tree_table(tree: &AccountTreeNode, amounts: &HashMap<String, f64>) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Account", "Amount"]);
    for row in flatten_tree(&tree.children, amounts) {
        let name = format!("{}{}", "  ".repeat(row.depth), row.name);
        let name = if row.depth == 0 { name.bold().to_string() } else { name };
        table.add_row(vec![
            Cell::new(name),
            Cell::new(money(row.amount)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub fn run(key: &str) -> Result<()> {
    let key = master_type_key(key)?;
    let console = Console::open()?;
    let (session, entity) = console.entity()?;

    let body = console.fetch(Some(&session.token), &endpoints::account_tree(&entity, key))?;
    let tree = endpoints::read_tree(body)?;
    let body = console.fetch(Some(&session.token), &endpoints::account_amounts(&entity))?;
    let amounts = endpoints::read_amounts(body)?;

    let total = amounts.get(&tree.id).copied().unwrap_or(0.0);
    println!("{}", format!("{}, {}", tree.name, money(total)).bold());
    if tree.children.is_empty() {
        println!("No accounts under {}.", tree.name);
    } else {
        println!("{}", tree_table(&tree, &amounts));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, name: &str, children: Vec<AccountTreeNode>) -> AccountTreeNode {
        AccountTreeNode {
            id: id.into(),
            name: name.into(),
            amount: None,
            children,
        }
    }

    #[test]
    fn test_master_type_key_is_case_insensitive() {
        assert_eq!(master_type_key("expense_cogr").unwrap(), "EXPENSE_COGR");
        let err = master_type_key("ASSETS").unwrap_err().to_string();
        assert!(err.contains("ASSET_LONG"));
    }

    #[test]
    fn test_tree_table_indents_and_formats() {
        let tree = node(
            "root",
            "Assets, Long Term",
            vec![node("land", "Land", vec![node("lot", "Lot 1", vec![])])],
        );
        let amounts = HashMap::from([("lot".to_string(), 1000.0)]);
        let rendered = tree_table(&tree, &amounts).to_string();
        assert!(rendered.contains("  Lot 1"));
        assert!(rendered.contains("$1,000.00"));
        assert!(rendered.contains("$0.00"));
    }
}

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::AccountTreeNode;

/// Display classes for tree rows, indexed by depth.
pub const DEPTH_CLASSES: [&str; 3] = ["level-0", "level-1", "level-2"];

/// Deeper nodes reuse the last class.
pub fn depth_class(depth: usize) -> &'static str {
    DEPTH_CLASSES[depth.min(DEPTH_CLASSES.len() - 1)]
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    /// Identifier the row actions operate on.
    pub key: Option<String>,
    pub cells: Vec<String>,
    pub class: Option<&'static str>,
    pub indent: usize,
}

impl Row {
    pub fn new(cells: Vec<String>) -> Self {
        Self {
            cells,
            ..Self::default()
        }
    }

    pub fn keyed(key: impl Into<String>, cells: Vec<String>) -> Self {
        Self {
            key: Some(key.into()),
            cells,
            ..Self::default()
        }
    }
}

/// One column of a populated table.
pub struct Column<T> {
    pub header: &'static str,
    pub extract: fn(&T) -> String,
    pub numeric: bool,
}

impl<T> Column<T> {
    pub const fn text(header: &'static str, extract: fn(&T) -> String) -> Self {
        Self {
            header,
            extract,
            numeric: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableData {
    pub headers: Vec<String>,
    pub numeric: Vec<bool>,
    pub rows: Vec<Row>,
    pub selected: usize,
    pub sort_column: usize,
    pub sortable: bool,
    /// Labels of the per-row actions; Enter fires the first, Delete the second.
    pub actions: Vec<&'static str>,
}

impl TableData {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            numeric: vec![false; headers.len()],
            ..Self::default()
        }
    }

    pub fn with_columns<T>(columns: &[Column<T>]) -> Self {
        Self {
            headers: columns.iter().map(|c| c.header.to_string()).collect(),
            numeric: columns.iter().map(|c| c.numeric).collect(),
            ..Self::default()
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn actions(mut self, actions: &[&'static str]) -> Self {
        self.actions = actions.to_vec();
        self
    }

    /// Clear the body and append one row per record.
    pub fn populate<T>(&mut self, records: &[T], columns: &[Column<T>], key: fn(&T) -> String) {
        self.rows = records
            .iter()
            .map(|record| Row::keyed(key(record), columns.iter().map(|c| (c.extract)(record)).collect()))
            .collect();
        self.selected = 0;
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.selected = 0;
    }

    pub fn selected_row(&self) -> Option<&Row> {
        self.rows.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.rows.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn next_sort_column(&mut self) {
        if !self.headers.is_empty() {
            self.sort_column = (self.sort_column + 1) % self.headers.len();
        }
    }

    pub fn prev_sort_column(&mut self) {
        if !self.headers.is_empty() {
            self.sort_column = (self.sort_column + self.headers.len() - 1) % self.headers.len();
        }
    }

    pub fn sort(&mut self) -> SortDirection {
        let numeric = self.numeric.get(self.sort_column).copied().unwrap_or(false);
        sort_rows(&mut self.rows, self.sort_column, numeric)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Number(f64),
    Text(String),
}

fn sort_key(row: &Row, column: usize, numeric: bool) -> SortKey {
    let cell = row.cells.get(column).map(String::as_str).unwrap_or("");
    if numeric {
        let trimmed = cell.trim();
        let value = if trimmed.is_empty() {
            0.0
        } else {
            trimmed.parse().unwrap_or(f64::NAN)
        };
        SortKey::Number(value)
    } else {
        SortKey::Text(cell.to_lowercase())
    }
}

impl SortKey {
    /// An unparseable number. It never compares, so it keeps its slot and
    /// nothing moves across it.
    fn is_unordered(&self) -> bool {
        matches!(self, SortKey::Number(v) if v.is_nan())
    }
}

fn compare(a: &SortKey, b: &SortKey) -> Ordering {
    match (a, b) {
        (SortKey::Number(x), SortKey::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (SortKey::Text(x), SortKey::Text(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

/// Stable sort on one column. Sorts ascending; when the rows were already
/// ascending the same call sorts them descending instead. Equal keys keep
/// their relative order. Returns the direction the rows ended up in.
pub fn sort_rows(rows: &mut [Row], column: usize, numeric: bool) -> SortDirection {
    let mut keyed: Vec<(SortKey, Row)> = rows
        .iter_mut()
        .map(|row| (sort_key(row, column, numeric), std::mem::take(row)))
        .collect();

    let ascending = keyed
        .windows(2)
        .all(|pair| compare(&pair[0].0, &pair[1].0) != Ordering::Greater);
    let direction = if ascending {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    };

    for run in keyed.split_mut(|(key, _)| key.is_unordered()) {
        match direction {
            SortDirection::Ascending => run.sort_by(|a, b| compare(&a.0, &b.0)),
            SortDirection::Descending => run.sort_by(|a, b| compare(&b.0, &a.0)),
        }
    }

    for (slot, (_, row)) in rows.iter_mut().zip(keyed) {
        *slot = row;
    }
    direction
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreeRow {
    pub depth: usize,
    pub class: &'static str,
    pub id: String,
    pub name: String,
    pub amount: f64,
}

/// Pre-order walk of `nodes`. Accounts missing from `amounts` show 0.
pub fn flatten_tree(nodes: &[AccountTreeNode], amounts: &HashMap<String, f64>) -> Vec<TreeRow> {
    let mut out = Vec::new();
    for node in nodes {
        visit(node, 0, amounts, &mut out);
    }
    out
}

fn visit(node: &AccountTreeNode, depth: usize, amounts: &HashMap<String, f64>, out: &mut Vec<TreeRow>) {
    out.push(TreeRow {
        depth,
        class: depth_class(depth),
        id: node.id.clone(),
        name: node.name.clone(),
        amount: amounts.get(&node.id).copied().unwrap_or(0.0),
    });
    for child in &node.children {
        visit(child, depth + 1, amounts, out);
    }
}

impl From<TreeRow> for Row {
    fn from(tree_row: TreeRow) -> Self {
        Row {
            key: Some(tree_row.id),
            cells: vec![tree_row.name, crate::fmt::money(tree_row.amount)],
            class: Some(tree_row.class),
            indent: tree_row.depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(values: &[&str]) -> Vec<Row> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Row::keyed(i.to_string(), vec![v.to_string()]))
            .collect()
    }

    fn column(rows: &[Row]) -> Vec<String> {
        rows.iter().map(|r| r.cells[0].clone()).collect()
    }

    fn keys(rows: &[Row]) -> Vec<String> {
        let mut k: Vec<String> = rows.iter().filter_map(|r| r.key.clone()).collect();
        k.sort();
        k
    }

    fn node(id: &str, children: Vec<AccountTreeNode>) -> AccountTreeNode {
        AccountTreeNode {
            id: id.to_string(),
            name: id.to_uppercase(),
            amount: None,
            children,
        }
    }

    #[test]
    fn test_text_sort_toggles() {
        let mut data = rows(&["pear", "Apple", "banana", "cherry"]);
        let before = keys(&data);

        assert_eq!(sort_rows(&mut data, 0, false), SortDirection::Ascending);
        assert_eq!(column(&data), vec!["Apple", "banana", "cherry", "pear"]);

        assert_eq!(sort_rows(&mut data, 0, false), SortDirection::Descending);
        assert_eq!(column(&data), vec!["pear", "cherry", "banana", "Apple"]);

        assert_eq!(sort_rows(&mut data, 0, false), SortDirection::Ascending);
        assert_eq!(column(&data), vec!["Apple", "banana", "cherry", "pear"]);
        assert_eq!(keys(&data), before);
    }

    #[test]
    fn test_numeric_sort_compares_values() {
        let mut data = rows(&["100", "9", "", "25.5"]);
        sort_rows(&mut data, 0, true);
        assert_eq!(column(&data), vec!["", "9", "25.5", "100"]);
    }

    #[test]
    fn test_sort_keeps_every_row() {
        let mut data = rows(&["b", "a", "b", "c", "a", "x", "m"]);
        let before = keys(&data);
        for _ in 0..3 {
            sort_rows(&mut data, 0, false);
            assert_eq!(data.len(), 7);
            assert_eq!(keys(&data), before);
        }
    }

    #[test]
    fn test_unparseable_numbers_never_swap() {
        let mut data = rows(&["abc", "5", "xyz"]);
        sort_rows(&mut data, 0, true);
        assert_eq!(data.len(), 3);
        assert_eq!(keys(&data), vec!["0", "1", "2"]);
    }

    #[test]
    fn test_ties_keep_their_order_both_ways() {
        let mut data = rows(&["b", "a", "B", "a"]);
        sort_rows(&mut data, 0, false);
        let order: Vec<&str> = data.iter().filter_map(|r| r.key.as_deref()).collect();
        assert_eq!(order, vec!["1", "3", "0", "2"]);

        assert_eq!(sort_rows(&mut data, 0, false), SortDirection::Descending);
        let order: Vec<&str> = data.iter().filter_map(|r| r.key.as_deref()).collect();
        assert_eq!(order, vec!["0", "2", "1", "3"]);
    }

    #[test]
    fn test_rows_stay_put_around_unparseable_number() {
        let mut data = rows(&["30", "10", "n/a", "5", "1"]);
        assert_eq!(sort_rows(&mut data, 0, true), SortDirection::Ascending);
        assert_eq!(column(&data), vec!["10", "30", "n/a", "1", "5"]);
    }

    #[test]
    fn test_sorts_a_full_journal_page() {
        let values: Vec<String> = (0..1000).rev().map(|i| format!("entry {i:04}")).collect();
        let refs: Vec<&str> = values.iter().map(String::as_str).collect();
        let mut data = rows(&refs);

        assert_eq!(sort_rows(&mut data, 0, false), SortDirection::Ascending);
        assert_eq!(data[0].cells[0], "entry 0000");
        assert_eq!(data[999].cells[0], "entry 0999");
        assert!(data.windows(2).all(|w| w[0].cells[0] <= w[1].cells[0]));

        assert_eq!(sort_rows(&mut data, 0, false), SortDirection::Descending);
        assert_eq!(data[0].cells[0], "entry 0999");
        assert_eq!(data.len(), 1000);
    }

    #[test]
    fn test_sort_missing_column_is_harmless() {
        let mut data = rows(&["b", "a"]);
        sort_rows(&mut data, 5, false);
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn test_table_sort_uses_selected_column() {
        let mut table = TableData::new(&["Name", "Amount"]).sortable();
        table.numeric[1] = true;
        table.rows = vec![
            Row::new(vec!["a".into(), "30".into()]),
            Row::new(vec!["b".into(), "4".into()]),
        ];
        table.next_sort_column();
        assert_eq!(table.sort(), SortDirection::Ascending);
        assert_eq!(table.rows[0].cells[0], "b");
        table.next_sort_column();
        assert_eq!(table.sort_column, 0);
        table.prev_sort_column();
        assert_eq!(table.sort_column, 1);
    }

    #[test]
    fn test_populate_replaces_rows() {
        struct Rec {
            id: u32,
            name: &'static str,
        }
        let columns = [Column::text("Name", |r: &Rec| r.name.to_string())];
        let mut table = TableData::with_columns(&columns);
        table.rows.push(Row::new(vec!["stale".into()]));
        table.populate(
            &[Rec { id: 1, name: "one" }, Rec { id: 2, name: "two" }],
            &columns,
            |r| r.id.to_string(),
        );
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].key.as_deref(), Some("2"));
        assert_eq!(table.rows[1].cells, vec!["two"]);
    }

    #[test]
    fn test_flatten_tree_preorder_with_depths() {
        let tree = vec![
            node("a", vec![node("a1", vec![node("a1x", vec![node("deep", vec![])])])]),
            node("b", vec![]),
        ];
        let mut amounts = HashMap::new();
        amounts.insert("a1".to_string(), 12.5);

        let flat = flatten_tree(&tree, &amounts);
        let total: usize = tree.iter().map(AccountTreeNode::node_count).sum();
        assert_eq!(flat.len(), total);

        let ids: Vec<&str> = flat.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "a1", "a1x", "deep", "b"]);
        let depths: Vec<usize> = flat.iter().map(|r| r.depth).collect();
        assert_eq!(depths, vec![0, 1, 2, 3, 0]);
        let classes: Vec<&str> = flat.iter().map(|r| r.class).collect();
        assert_eq!(classes, vec!["level-0", "level-1", "level-2", "level-2", "level-0"]);

        assert_eq!(flat[1].amount, 12.5);
        assert_eq!(flat[0].amount, 0.0);
    }

    #[test]
    fn test_tree_row_into_table_row() {
        let row: Row = TreeRow {
            depth: 3,
            class: depth_class(3),
            id: "x".into(),
            name: "Deep".into(),
            amount: 1500.0,
        }
        .into();
        assert_eq!(row.cells, vec!["Deep", "$1,500.00"]);
        assert_eq!(row.indent, 3);
        assert_eq!(row.class, Some("level-2"));
    }
}

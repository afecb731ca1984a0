use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde_json::{Map, Value};

use crate::composer::RowGroup;
use crate::table::TableData;

#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    /// Rendered masked.
    Secret,
    Selector {
        options: Vec<SelectOption>,
        selected: usize,
    },
    /// Checkbox; only submitted when on.
    Toggle(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    /// Submitted value. Selectors and toggles keep it in step with their state.
    pub value: String,
    pub kind: FieldKind,
    pub enabled: bool,
}

impl FormField {
    pub fn text(name: &'static str, label: &'static str, value: &str) -> Self {
        Self {
            name,
            label,
            value: value.to_string(),
            kind: FieldKind::Text,
            enabled: true,
        }
    }

    pub fn secret(name: &'static str, label: &'static str) -> Self {
        Self {
            kind: FieldKind::Secret,
            ..Self::text(name, label, "")
        }
    }

    pub fn selector(name: &'static str, label: &'static str, options: Vec<SelectOption>) -> Self {
        let value = options.first().map(|o| o.value.clone()).unwrap_or_default();
        Self {
            name,
            label,
            value,
            kind: FieldKind::Selector {
                options,
                selected: 0,
            },
            enabled: true,
        }
    }

    pub fn toggle(name: &'static str, label: &'static str, on: bool) -> Self {
        Self {
            name,
            label,
            value: if on { "on".to_string() } else { String::new() },
            kind: FieldKind::Toggle(on),
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// What the field shows on screen.
    pub fn display(&self) -> String {
        match &self.kind {
            FieldKind::Text => self.value.clone(),
            FieldKind::Secret => "*".repeat(self.value.chars().count()),
            FieldKind::Selector { options, selected } => options
                .get(*selected)
                .map(|o| o.label.clone())
                .unwrap_or_default(),
            FieldKind::Toggle(on) => if *on { "[x]" } else { "[ ]" }.to_string(),
        }
    }

    fn cycle(&mut self, forward: bool) {
        match &mut self.kind {
            FieldKind::Selector { options, selected } if !options.is_empty() => {
                *selected = if forward {
                    (*selected + 1) % options.len()
                } else {
                    (*selected + options.len() - 1) % options.len()
                };
                self.value = options[*selected].value.clone();
            }
            FieldKind::Toggle(on) => {
                *on = !*on;
                self.value = if *on { "on".to_string() } else { String::new() };
            }
            _ => {}
        }
    }

    fn set(&mut self, value: &str) {
        match &mut self.kind {
            FieldKind::Text | FieldKind::Secret => self.value = value.to_string(),
            FieldKind::Selector { options, selected } => {
                *selected = options.iter().position(|o| o.value == value).unwrap_or(0);
                self.value = options
                    .get(*selected)
                    .map(|o| o.value.clone())
                    .unwrap_or_default();
            }
            FieldKind::Toggle(on) => {
                *on = matches!(value, "on" | "true");
                self.value = if *on { "on".to_string() } else { String::new() };
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Form {
    pub fields: Vec<FormField>,
}

impl Form {
    pub fn new(fields: Vec<FormField>) -> Self {
        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    pub fn value(&self, name: &str) -> String {
        self.field(name).map(|f| f.value.clone()).unwrap_or_default()
    }

    pub fn set_value(&mut self, name: &str, value: &str) {
        if let Some(field) = self.field_mut(name) {
            field.set(value);
        }
    }

    /// Replace a selector's options, keeping the current value when present.
    pub fn set_options(&mut self, name: &str, new_options: Vec<SelectOption>) {
        if let Some(field) = self.field_mut(name) {
            let current = field.value.clone();
            if let FieldKind::Selector { options, .. } = &mut field.kind {
                *options = new_options;
            }
            field.set(&current);
        }
    }

    pub fn reset(&mut self) {
        for field in &mut self.fields {
            match field.kind {
                FieldKind::Text | FieldKind::Secret => field.value.clear(),
                FieldKind::Selector { .. } => field.set(""),
                FieldKind::Toggle(_) => field.set(""),
            }
        }
    }

    /// Name/value pairs of every enabled field, as a browser form submits them.
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .filter(|f| f.enabled)
            .filter(|f| !matches!(f.kind, FieldKind::Toggle(false)))
            .map(|f| (f.name.to_string(), f.value.clone()))
            .collect()
    }

    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .pairs()
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        Value::Object(map)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Heading(String),
    Text(String),
    Table(TableData),
    Form(Form),
    Ledger(RowGroup),
    Button { label: String, enabled: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: &'static str,
    pub kind: ElementKind,
}

/// A place keyboard focus can rest, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stop {
    Field { element: usize, field: usize },
    LedgerAccount { element: usize, row: usize },
    LedgerAmount { element: usize, row: usize },
    LedgerAdd { element: usize },
    Table { element: usize },
    Button { element: usize },
}

impl Stop {
    pub fn element(self) -> usize {
        match self {
            Stop::Field { element, .. }
            | Stop::LedgerAccount { element, .. }
            | Stop::LedgerAmount { element, .. }
            | Stop::LedgerAdd { element }
            | Stop::Table { element }
            | Stop::Button { element } => element,
        }
    }
}

/// What a keypress meant to the active view.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    None,
    /// The page changed locally; nothing for the view to do.
    Changed,
    Click(&'static str),
    Submit(&'static str),
    RowAction {
        table: &'static str,
        key: String,
        action: usize,
    },
    /// The user accepted a confirmation prompt raised under this tag.
    Confirmed(&'static str),
}

/// The main content container of the current view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    pub title: String,
    /// One-line status area, fed by failures and reload messages.
    pub message: String,
    pub elements: Vec<Element>,
    focus: usize,
}

impl Page {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    fn push(mut self, id: &'static str, kind: ElementKind) -> Self {
        self.elements.push(Element { id, kind });
        self
    }

    pub fn heading(self, id: &'static str, text: &str) -> Self {
        self.push(id, ElementKind::Heading(text.to_string()))
    }

    pub fn text(self, id: &'static str, text: &str) -> Self {
        self.push(id, ElementKind::Text(text.to_string()))
    }

    pub fn table(self, id: &'static str, table: TableData) -> Self {
        self.push(id, ElementKind::Table(table))
    }

    pub fn form(self, id: &'static str, form: Form) -> Self {
        self.push(id, ElementKind::Form(form))
    }

    pub fn ledger(self, id: &'static str, group: RowGroup) -> Self {
        self.push(id, ElementKind::Ledger(group))
    }

    pub fn button(self, id: &'static str, label: &str, enabled: bool) -> Self {
        self.push(
            id,
            ElementKind::Button {
                label: label.to_string(),
                enabled,
            },
        )
    }

    fn element_mut(&mut self, id: &str) -> Option<&mut ElementKind> {
        self.elements
            .iter_mut()
            .find(|e| e.id == id)
            .map(|e| &mut e.kind)
    }

    fn element(&self, id: &str) -> Option<&ElementKind> {
        self.elements.iter().find(|e| e.id == id).map(|e| &e.kind)
    }

    pub fn set_message(&mut self, message: &str) {
        self.message = message.to_string();
    }

    /// Replace the text of a heading or text element.
    pub fn set_text(&mut self, id: &str, text: &str) {
        match self.element_mut(id) {
            Some(ElementKind::Heading(t)) | Some(ElementKind::Text(t)) => *t = text.to_string(),
            _ => {}
        }
    }

    pub fn text_of(&self, id: &str) -> Option<&str> {
        match self.element(id)? {
            ElementKind::Heading(t) | ElementKind::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn table_data(&self, id: &str) -> Option<&TableData> {
        match self.element(id)? {
            ElementKind::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn table_mut(&mut self, id: &str) -> Option<&mut TableData> {
        match self.element_mut(id)? {
            ElementKind::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn form_data(&self, id: &str) -> Option<&Form> {
        match self.element(id)? {
            ElementKind::Form(f) => Some(f),
            _ => None,
        }
    }

    pub fn form_mut(&mut self, id: &str) -> Option<&mut Form> {
        match self.element_mut(id)? {
            ElementKind::Form(f) => Some(f),
            _ => None,
        }
    }

    pub fn ledger_group(&self, id: &str) -> Option<&RowGroup> {
        match self.element(id)? {
            ElementKind::Ledger(g) => Some(g),
            _ => None,
        }
    }

    pub fn ledger_mut(&mut self, id: &str) -> Option<&mut RowGroup> {
        match self.element_mut(id)? {
            ElementKind::Ledger(g) => Some(g),
            _ => None,
        }
    }

    pub fn set_button_enabled(&mut self, id: &str, on: bool) {
        if let Some(ElementKind::Button { enabled, .. }) = self.element_mut(id) {
            *enabled = on;
        }
    }

    pub fn button_enabled(&self, id: &str) -> bool {
        matches!(self.element(id), Some(ElementKind::Button { enabled: true, .. }))
    }

    pub fn stops(&self) -> Vec<Stop> {
        let mut stops = Vec::new();
        for (element, e) in self.elements.iter().enumerate() {
            match &e.kind {
                ElementKind::Form(form) => stops.extend(
                    form.fields
                        .iter()
                        .enumerate()
                        .filter(|(_, f)| f.enabled)
                        .map(|(field, _)| Stop::Field { element, field }),
                ),
                ElementKind::Ledger(group) => {
                    for row in 0..group.rows.len() {
                        stops.push(Stop::LedgerAccount { element, row });
                        stops.push(Stop::LedgerAmount { element, row });
                    }
                    if group.addable {
                        stops.push(Stop::LedgerAdd { element });
                    }
                }
                ElementKind::Table(_) => stops.push(Stop::Table { element }),
                ElementKind::Button { enabled: true, .. } => stops.push(Stop::Button { element }),
                _ => {}
            }
        }
        stops
    }

    pub fn focused(&self) -> Option<Stop> {
        let stops = self.stops();
        if stops.is_empty() {
            return None;
        }
        Some(stops[self.focus.min(stops.len() - 1)])
    }

    /// Move focus by `delta` stops, wrapping. Leaving an amount input formats
    /// it and refreshes its subtotal; entering one strips the formatting.
    pub fn move_focus(&mut self, delta: isize) {
        let stops = self.stops();
        if stops.is_empty() {
            return;
        }
        let current = self.focus.min(stops.len() - 1);
        if let Stop::LedgerAmount { element, row } = stops[current] {
            if let ElementKind::Ledger(group) = &mut self.elements[element].kind {
                group.blur_amount(row);
            }
        }
        let len = stops.len() as isize;
        self.focus = (current as isize + delta).rem_euclid(len) as usize;
        if let Stop::LedgerAmount { element, row } = stops[self.focus] {
            if let ElementKind::Ledger(group) = &mut self.elements[element].kind {
                group.focus_amount(row);
            }
        }
    }

    pub fn focus_element(&mut self, id: &str) {
        if let Some(index) = self
            .stops()
            .iter()
            .position(|s| self.elements[s.element()].id == id)
        {
            self.focus = index;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PageEvent {
        match key.code {
            KeyCode::Tab => {
                self.move_focus(1);
                return PageEvent::None;
            }
            KeyCode::BackTab => {
                self.move_focus(-1);
                return PageEvent::None;
            }
            _ => {}
        }
        let Some(stop) = self.focused() else {
            return PageEvent::None;
        };
        let id = self.elements[stop.element()].id;
        match stop {
            Stop::Field { element, field } => {
                let ElementKind::Form(form) = &mut self.elements[element].kind else {
                    return PageEvent::None;
                };
                let field = &mut form.fields[field];
                let editable = matches!(field.kind, FieldKind::Text | FieldKind::Secret);
                let toggle = matches!(field.kind, FieldKind::Toggle(_));
                match key.code {
                    KeyCode::Enter => PageEvent::Submit(id),
                    KeyCode::Left if !editable => {
                        field.cycle(false);
                        PageEvent::Changed
                    }
                    KeyCode::Right if !editable => {
                        field.cycle(true);
                        PageEvent::Changed
                    }
                    KeyCode::Char(' ') if toggle => {
                        field.cycle(true);
                        PageEvent::Changed
                    }
                    KeyCode::Char(c) if editable && !key.modifiers.contains(KeyModifiers::CONTROL) => {
                        field.value.push(c);
                        PageEvent::Changed
                    }
                    KeyCode::Backspace if editable => {
                        field.value.pop();
                        PageEvent::Changed
                    }
                    KeyCode::Down => {
                        self.move_focus(1);
                        PageEvent::None
                    }
                    KeyCode::Up => {
                        self.move_focus(-1);
                        PageEvent::None
                    }
                    _ => PageEvent::None,
                }
            }
            Stop::LedgerAccount { element, row } | Stop::LedgerAmount { element, row } => {
                let on_amount = matches!(stop, Stop::LedgerAmount { .. });
                let ElementKind::Ledger(group) = &mut self.elements[element].kind else {
                    return PageEvent::None;
                };
                match key.code {
                    KeyCode::Delete => {
                        if group.remove_row(row) {
                            PageEvent::Changed
                        } else {
                            PageEvent::None
                        }
                    }
                    KeyCode::Left if !on_amount => {
                        group.cycle_account(row, false);
                        PageEvent::Changed
                    }
                    KeyCode::Right if !on_amount => {
                        group.cycle_account(row, true);
                        PageEvent::Changed
                    }
                    KeyCode::Char(c) if on_amount && !key.modifiers.contains(KeyModifiers::CONTROL) => {
                        group.rows[row].amount.push(c);
                        PageEvent::Changed
                    }
                    KeyCode::Backspace if on_amount => {
                        group.rows[row].amount.pop();
                        PageEvent::Changed
                    }
                    KeyCode::Enter | KeyCode::Down => {
                        self.move_focus(1);
                        PageEvent::None
                    }
                    KeyCode::Up => {
                        self.move_focus(-1);
                        PageEvent::None
                    }
                    _ => PageEvent::None,
                }
            }
            Stop::LedgerAdd { element } => match key.code {
                KeyCode::Enter => {
                    if let ElementKind::Ledger(group) = &mut self.elements[element].kind {
                        group.add_row(true);
                    }
                    PageEvent::Changed
                }
                KeyCode::Down => {
                    self.move_focus(1);
                    PageEvent::None
                }
                KeyCode::Up => {
                    self.move_focus(-1);
                    PageEvent::None
                }
                _ => PageEvent::None,
            },
            Stop::Table { element } => {
                let ElementKind::Table(table) = &mut self.elements[element].kind else {
                    return PageEvent::None;
                };
                match key.code {
                    KeyCode::Up => {
                        table.select_prev();
                        PageEvent::None
                    }
                    KeyCode::Down => {
                        table.select_next();
                        PageEvent::None
                    }
                    KeyCode::Left if table.sortable => {
                        table.prev_sort_column();
                        PageEvent::Changed
                    }
                    KeyCode::Right if table.sortable => {
                        table.next_sort_column();
                        PageEvent::Changed
                    }
                    KeyCode::Char('s') if table.sortable => {
                        table.sort();
                        PageEvent::Changed
                    }
                    KeyCode::Enter | KeyCode::Delete => {
                        let action = if key.code == KeyCode::Enter { 0 } else { 1 };
                        if action >= table.actions.len() {
                            return PageEvent::None;
                        }
                        match table.selected_row().and_then(|r| r.key.clone()) {
                            Some(key) => PageEvent::RowAction {
                                table: id,
                                key,
                                action,
                            },
                            None => PageEvent::None,
                        }
                    }
                    _ => PageEvent::None,
                }
            }
            Stop::Button { .. } => match key.code {
                KeyCode::Enter => PageEvent::Click(id),
                KeyCode::Down => {
                    self.move_focus(1);
                    PageEvent::None
                }
                KeyCode::Up => {
                    self.move_focus(-1);
                    PageEvent::None
                }
                _ => PageEvent::None,
            },
        }
    }
}

use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState};
use ratatui::Frame;

use crate::app::App;
use crate::composer::RowGroup;
use crate::error::Result;
use crate::fmt::money;
use crate::page::{Element, ElementKind, FieldKind, Form, Page, Stop};
use crate::table::TableData;

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

pub const FOOTER_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const MESSAGE_STYLE: Style = Style::new().fg(Color::Cyan);

pub const AMOUNT_POS_STYLE: Style = Style::new().fg(Color::Rgb(80, 220, 100));
pub const AMOUNT_NEG_STYLE: Style = Style::new().fg(Color::Red);

pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(40, 40, 60))
    .add_modifier(Modifier::BOLD);

const DISABLED_STYLE: Style = Style::new().fg(Color::DarkGray);

const ASIDE_WIDTH: u16 = 26;
const CURSOR: &str = "\u{2588}";

/// Format an amount as a colored Span, red when negative.
pub fn money_span(amount: f64) -> Span<'static> {
    let style = if amount < 0.0 {
        AMOUNT_NEG_STYLE
    } else {
        AMOUNT_POS_STYLE
    };
    Span::styled(money(amount), style)
}

/// Wrap text to a given width. Returns (wrapped_string, line_count).
pub fn wrap_text(text: &str, width: usize) -> (String, u16) {
    if width == 0 {
        return (text.to_string(), 1);
    }
    let wrapped = textwrap::fill(text, width);
    let lines = wrapped.lines().count().max(1) as u16;
    (wrapped, lines)
}

fn focus_style(focused: bool) -> Style {
    if focused {
        SELECTED_STYLE
    } else {
        Style::default()
    }
}

fn depth_style(class: Option<&str>) -> Style {
    match class {
        Some("level-0") => Style::default().add_modifier(Modifier::BOLD),
        Some("level-2") => Style::default().fg(Color::Gray),
        _ => Style::default(),
    }
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

pub fn draw(frame: &mut Frame, app: &App) {
    let [header_area, rule_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_header(frame, app, header_area);
    frame.render_widget(
        Paragraph::new("\u{2501}".repeat(rule_area.width as usize)).style(FOOTER_STYLE),
        rule_area,
    );

    let [aside_area, main_area] =
        Layout::horizontal([Constraint::Length(ASIDE_WIDTH), Constraint::Fill(1)]).areas(body_area);
    draw_aside(frame, app, aside_area);
    draw_page(frame, app.page(), main_area);
    draw_footer(frame, app, footer_area);

    if let Some(message) = app.alert() {
        draw_modal(frame, " Alert ", Color::Red, message, "Enter: dismiss");
    } else if let Some(prompt) = app.confirm_prompt() {
        draw_modal(frame, " Confirm ", Color::Yellow, prompt, "y: yes  n: no");
    } else if let Some(address) = app.address() {
        draw_modal(
            frame,
            " Go to ",
            Color::Cyan,
            &format!("{address}{CURSOR}"),
            "Enter: go  Esc: cancel",
        );
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(" ledgerdesk ", HEADER_STYLE)];
    for (i, link) in crate::nav::SECTIONS.iter().enumerate() {
        let current = link.fragment == app.fragment();
        spans.push(Span::styled(format!(" F{} ", i + 1), FOOTER_STYLE));
        spans.push(Span::styled(link.text, focus_style(current)));
    }
    spans.push(Span::styled(format!("   {}", app.fragment()), FOOTER_STYLE));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_aside(frame: &mut Frame, app: &App, area: Rect) {
    let mut key = crate::nav::SECTIONS.len();
    let mut lines = Vec::new();
    for group in app.aside() {
        lines.push(Line::from(Span::styled(group.heading, HEADER_STYLE)));
        for link in &group.links {
            key += 1;
            let label = if key <= 12 { format!("F{key:<3}") } else { "    ".to_string() };
            lines.push(Line::from(vec![
                Span::styled(format!(" {label}"), FOOTER_STYLE),
                Span::raw(link.text),
            ]));
        }
        lines.push(Line::default());
    }
    let block = Block::default().borders(Borders::RIGHT).border_style(FOOTER_STYLE);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let hints = if app.is_loading() {
        "loading\u{2026}".to_string()
    } else {
        "Tab: next  Enter: activate  \u{2190}/\u{2192}: choose  Del: remove  s: sort  \
         Ctrl+L: go to  Ctrl+R: reload  Ctrl+Q: quit"
            .to_string()
    };
    frame.render_widget(Paragraph::new(hints).style(FOOTER_STYLE), area);
}

fn draw_modal(frame: &mut Frame, title: &str, color: Color, text: &str, keys: &str) {
    let area = frame.area();
    let width = area.width.saturating_sub(4).min(64);
    let (wrapped, line_count) = wrap_text(text, width.saturating_sub(4) as usize);
    let height = (line_count + 4).min(area.height);
    let rect = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(
            Line::from(Span::styled(
                title.to_string(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center),
        );
    let mut lines: Vec<Line> = wrapped.lines().map(|l| Line::from(l.to_string())).collect();
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(keys.to_string(), FOOTER_STYLE)));
    frame.render_widget(Clear, rect);
    frame.render_widget(Paragraph::new(lines).block(block), rect);
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

fn element_height(element: &Element) -> Constraint {
    match &element.kind {
        ElementKind::Table(_) => Constraint::Fill(1),
        ElementKind::Form(form) => Constraint::Length(form.fields.len() as u16),
        ElementKind::Ledger(group) => {
            Constraint::Length(group.rows.len() as u16 + 2 + u16::from(group.addable))
        }
        _ => Constraint::Length(1),
    }
}

fn draw_page(frame: &mut Frame, page: &Page, area: Rect) {
    let area = Rect {
        x: area.x + 1,
        width: area.width.saturating_sub(1),
        ..area
    };
    let mut constraints = vec![Constraint::Length(1), Constraint::Length(1)];
    constraints.extend(page.elements.iter().map(element_height));
    let areas = Layout::vertical(constraints).split(area);

    frame.render_widget(Paragraph::new(page.title.as_str()).style(HEADER_STYLE), areas[0]);
    frame.render_widget(Paragraph::new(page.message.as_str()).style(MESSAGE_STYLE), areas[1]);

    let focus = page.focused();
    for (index, element) in page.elements.iter().enumerate() {
        let target = areas[index + 2];
        let here = focus.filter(|stop| stop.element() == index);
        match &element.kind {
            ElementKind::Heading(text) => frame.render_widget(
                Paragraph::new(text.as_str()).style(Style::default().add_modifier(Modifier::BOLD)),
                target,
            ),
            ElementKind::Text(text) => frame.render_widget(Paragraph::new(text.as_str()), target),
            ElementKind::Button { label, enabled } => {
                let style = if !enabled {
                    DISABLED_STYLE
                } else {
                    focus_style(here.is_some())
                };
                frame.render_widget(Paragraph::new(format!("[ {label} ]")).style(style), target);
            }
            ElementKind::Form(form) => draw_form(frame, form, here, target),
            ElementKind::Ledger(group) => draw_ledger(frame, group, here, target),
            ElementKind::Table(table) => draw_table(frame, table, here.is_some(), target),
        }
    }
}

fn draw_form(frame: &mut Frame, form: &Form, focus: Option<Stop>, area: Rect) {
    let lines: Vec<Line> = form
        .fields
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let focused = matches!(focus, Some(Stop::Field { field: f, .. }) if f == index);
            let mut value = field.display();
            match field.kind {
                FieldKind::Text | FieldKind::Secret if focused => value.push_str(CURSOR),
                FieldKind::Selector { .. } if focused => value = format!("\u{2039} {value} \u{203a}"),
                _ => {}
            }
            let style = if !field.enabled {
                DISABLED_STYLE
            } else {
                focus_style(focused)
            };
            Line::from(vec![
                Span::styled(format!("{:>20}: ", field.label), FOOTER_STYLE),
                Span::styled(value, style),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn draw_ledger(frame: &mut Frame, group: &RowGroup, focus: Option<Stop>, area: Rect) {
    let mut lines = vec![Line::from(Span::styled(
        group.label,
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    for (index, row) in group.rows.iter().enumerate() {
        let on_account = matches!(focus, Some(Stop::LedgerAccount { row: r, .. }) if r == index);
        let on_amount = matches!(focus, Some(Stop::LedgerAmount { row: r, .. }) if r == index);
        let amount = if on_amount {
            format!("{}{CURSOR}", row.amount)
        } else {
            row.amount.clone()
        };
        let mut spans = vec![
            Span::raw("  "),
            Span::styled(format!("{:<32}", group.account_label(index)), focus_style(on_account)),
            Span::raw("  "),
            Span::styled(format!("{amount:>14}"), focus_style(on_amount)),
        ];
        if row.removable {
            spans.push(Span::styled("  Del: remove", FOOTER_STYLE));
        }
        lines.push(Line::from(spans));
    }
    if group.addable {
        let on_add = matches!(focus, Some(Stop::LedgerAdd { .. }));
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled("[ + add row ]", focus_style(on_add)),
        ]));
    }
    lines.push(Line::from(vec![
        Span::styled(format!("{:>36}", "subtotal "), FOOTER_STYLE),
        money_span(group.subtotal),
    ]));
    frame.render_widget(Paragraph::new(lines), area);
}

fn draw_table(frame: &mut Frame, table: &TableData, focused: bool, area: Rect) {
    let mut header: Vec<Cell> = table
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let marker = if table.sortable && i == table.sort_column { " *" } else { "" };
            Cell::from(format!("{h}{marker}"))
        })
        .collect();
    if !table.actions.is_empty() {
        header.push(Cell::from(""));
    }

    let actions = match table.actions.as_slice() {
        [] => String::new(),
        [first] => format!("Enter: {first}"),
        [first, second, ..] => format!("Enter: {first}  Del: {second}"),
    };

    let rows: Vec<Row> = table
        .rows
        .iter()
        .enumerate()
        .map(|(r, row)| {
            let mut cells: Vec<Cell> = row
                .cells
                .iter()
                .enumerate()
                .map(|(c, text)| {
                    let numeric = table.numeric.get(c).copied().unwrap_or(false);
                    if c == 0 && row.indent > 0 {
                        Cell::from(format!("{}{text}", "  ".repeat(row.indent)))
                    } else if numeric {
                        Cell::from(Line::from(text.clone()).alignment(Alignment::Right))
                    } else {
                        Cell::from(text.clone())
                    }
                })
                .collect();
            if !table.actions.is_empty() {
                let hint = if focused && r == table.selected { actions.clone() } else { String::new() };
                cells.push(Cell::from(Span::styled(hint, FOOTER_STYLE)));
            }
            Row::new(cells).style(depth_style(row.class))
        })
        .collect();

    let mut widths: Vec<Constraint> = table
        .numeric
        .iter()
        .map(|&numeric| if numeric { Constraint::Length(16) } else { Constraint::Fill(1) })
        .collect();
    if !table.actions.is_empty() {
        widths.push(Constraint::Length(actions.chars().count() as u16));
    }

    let mut widget = Table::new(rows, widths)
        .header(Row::new(header).style(HEADER_STYLE).bottom_margin(1))
        .column_spacing(1);
    if focused {
        widget = widget.row_highlight_style(SELECTED_STYLE);
    }
    let mut state = TableState::default().with_selected(Some(table.selected));
    frame.render_stateful_widget(widget, area, &mut state);
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Run the terminal UI until the user quits. Sets up the terminal and a panic
/// hook, then restores the terminal on exit.
pub fn run(app: &mut App) -> Result<()> {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        ratatui::restore();
        hook(info);
    }));

    let mut terminal = ratatui::init();

    let result: Result<()> = loop {
        app.pump();
        if let Err(e) = terminal.draw(|frame| draw(frame, app)) {
            break Err(e.into());
        }
        match event::poll(Duration::from_millis(100)) {
            Err(e) => break Err(e.into()),
            Ok(false) => continue,
            Ok(true) => {}
        }
        match event::read() {
            Err(e) => break Err(e.into()),
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => app.handle_key(key),
            _ => {}
        }
        if !app.is_running() {
            break Ok(());
        }
    };

    drop(terminal);
    ratatui::restore();
    result
}

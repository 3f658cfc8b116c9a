use super::app::{App, Focus};
use communityhub_portal::connection::CollectionBackend;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Table, TableState},
};

const HELP_TABLE: &str =
    " ↑/↓ select  Enter edit/save  Ctrl+X cancel  n new  d delete  r reload  q quit ";
const HELP_DRAFT: &str = " Tab next field  Ctrl+S submit  Esc back ";

pub fn draw<B: CollectionBackend>(f: &mut Frame, app: &mut App<B>) {
    let draft_height = if app.screen.allows_create() {
        app.controller.schema().fields.len() as u16 + 2
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Min(5),               // Collection grows
                Constraint::Length(draft_height), // Draft form
                Constraint::Length(3),            // Input line
                Constraint::Length(7),            // Notifications
                Constraint::Length(1),            // Help
            ]
            .as_ref(),
        )
        .split(f.area());

    draw_table(f, app, chunks[0]);
    if draft_height > 0 {
        draw_draft(f, app, chunks[1]);
    }
    f.render_widget(&app.textarea, chunks[2]);

    // Show only the last notifications that fit
    let inner_height = chunks[3].height.saturating_sub(2) as usize;
    let skip_count = app.messages.len().saturating_sub(inner_height);
    let messages: Vec<ListItem> = app
        .messages
        .iter()
        .skip(skip_count)
        .map(|line| ListItem::new(line.clone()))
        .collect();
    let messages_panel = List::new(messages)
        .block(Block::default().borders(Borders::ALL).title(" Notifications "))
        .style(Style::default().fg(Color::White));
    f.render_widget(messages_panel, chunks[3]);

    let help = match app.focus {
        Focus::Table => HELP_TABLE,
        Focus::Draft(_) => HELP_DRAFT,
    };
    f.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        chunks[4],
    );
}

fn draw_table<B: CollectionBackend>(f: &mut Frame, app: &App<B>, area: ratatui::layout::Rect) {
    let schema = app.controller.schema();
    let editor = app.controller.editor();
    let show_action = schema.editable.is_some() || app.screen.allows_delete();

    let mut header: Vec<Cell> = schema
        .columns
        .iter()
        .map(|column| Cell::from(column.label.clone()))
        .collect();
    if show_action {
        header.push(Cell::from("ACTION"));
    }

    let rows: Vec<Row> = app
        .controller
        .records()
        .iter()
        .map(|record| {
            let mut cells: Vec<Cell> = schema
                .columns
                .iter()
                .map(|column| {
                    let cell = editor.cell(record, &column.field);
                    let style = if cell.is_editing() {
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::UNDERLINED)
                    } else {
                        Style::default()
                    };
                    Cell::from(cell.text().to_string()).style(style)
                })
                .collect();
            if show_action {
                let action = if schema.editable.is_some() {
                    editor.action_label(record)
                } else {
                    "Delete"
                };
                cells.push(Cell::from(action));
            }
            Row::new(cells)
        })
        .collect();

    let column_count = header.len().max(1) as u32;
    let widths = vec![Constraint::Ratio(1, column_count); header.len()];

    let table = Table::new(rows, widths)
        .header(Row::new(header).style(Style::default().add_modifier(Modifier::BOLD)))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", app.screen.title())),
        )
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol(">> ");

    let mut state = TableState::default();
    if !app.controller.is_empty() {
        state.select(Some(app.selected));
    }
    f.render_stateful_widget(table, area, &mut state);
}

fn draw_draft<B: CollectionBackend>(f: &mut Frame, app: &App<B>, area: ratatui::layout::Rect) {
    let draft = app.controller.draft();
    let active = match app.focus {
        Focus::Draft(index) => Some(index),
        Focus::Table => None,
    };

    let items: Vec<ListItem> = app
        .controller
        .schema()
        .fields
        .iter()
        .enumerate()
        .map(|(index, spec)| {
            let style = if active == Some(index) {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<18}", spec.label), style.add_modifier(Modifier::BOLD)),
                Span::styled(draft.text(&spec.name), style),
            ]))
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" New entry "));
    f.render_widget(list, area);
}

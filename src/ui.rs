use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Cell, Clear, List, ListItem, Paragraph, Row, Table, Wrap},
};

use crate::document::NodeId;
use crate::domain::Focus;
use crate::model::Model;
use crate::sorter::{ASC_CLASS, SORTED_CLASS};
use crate::table::Table as ResultsTable;

pub const FRIENDS_MAX_HEIGHT: u16 = 8;
pub const COLUMN_WIDTH_MARGIN: u16 = 2;
pub const COLUMN_WIDTH_MAX: u16 = 40;

/// Box of the modal content, centred on `area`. Clicks outside of it hit the
/// modal backdrop.
pub fn modal_area(area: Rect) -> Rect {
    let width = area.width * 3 / 5;
    let height = area.height * 3 / 5;
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Display width of `text`, capped at the widest column.
fn text_width(text: &str) -> u16 {
    text.chars().count().min(COLUMN_WIDTH_MAX as usize) as u16
}

pub struct PageUI {}

impl PageUI {
    pub fn new() -> Self {
        Self {}
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let boxes = model.friend_boxes();
        let friends_height = if boxes.is_empty() {
            0
        } else {
            (boxes.len() as u16).min(FRIENDS_MAX_HEIGHT) + 2
        };
        let [friends_area, note_area, table_area, filter_area, status_area] = Layout::vertical([
            Constraint::Length(friends_height),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        if !boxes.is_empty() {
            self.draw_friends(model, &boxes, frame, friends_area);
        }
        self.draw_note(model, frame, note_area);
        self.draw_table(model, frame, table_area);
        self.draw_filter(model, frame, filter_area);
        self.draw_status(model, frame, status_area);

        if model.modal_open() {
            self.draw_modal(model, frame);
        }
    }

    fn draw_friends(&self, model: &Model, boxes: &[NodeId], frame: &mut Frame, area: Rect) {
        let doc = model.document();
        let focused = model.focus() == Focus::Friends;
        let visible = area.height.saturating_sub(2) as usize;
        let offset = (model.friend_cursor() + 1).saturating_sub(visible);

        let items: Vec<ListItem> = boxes
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible)
            .map(|(idx, &b)| {
                let mark = if doc.checked(b) { "[x]" } else { "[ ]" };
                let label = doc
                    .parent(b)
                    .map(|li| doc.text_content(li))
                    .unwrap_or_default();
                let mut style = Style::default();
                if doc.disabled(b) {
                    style = style.fg(Color::DarkGray);
                }
                if focused && idx == model.friend_cursor() {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                ListItem::new(format!("{mark} {label}")).style(style)
            })
            .collect();

        let selected = boxes.iter().filter(|&&b| doc.checked(b)).count();
        let title = format!(
            " Friends {selected}/{} ",
            model.config().selection_limit
        );
        frame.render_widget(List::new(items).block(Block::bordered().title(title)), area);
    }

    fn draw_note(&self, model: &Model, frame: &mut Frame, area: Rect) {
        let doc = model.document();
        let config = model.config();
        let Some(note) = doc.by_id(&config.limit_note_id) else {
            return;
        };
        if !doc.class_contains(note, &config.hidden_class) {
            frame.render_widget(
                Paragraph::new(doc.text_content(note)).yellow().italic(),
                area,
            );
        }
    }

    fn draw_table(&self, model: &Model, frame: &mut Frame, area: Rect) {
        let doc = model.document();
        let headers = model.headers();
        let rows = model.displayed_rows();
        let header_focus = model.focus() == Focus::Headers;

        let mut widths: Vec<u16> = headers
            .iter()
            .map(|&h| text_width(&doc.text_content(h)) + COLUMN_WIDTH_MARGIN)
            .collect();
        for &r in rows.iter() {
            for (idx, width) in widths.iter_mut().enumerate() {
                let len = text_width(&ResultsTable::cell_text(doc, r, idx));
                *width = (*width).max(len + COLUMN_WIDTH_MARGIN).min(COLUMN_WIDTH_MAX);
            }
        }

        let header_cells: Vec<Cell> = headers
            .iter()
            .enumerate()
            .map(|(idx, &h)| {
                let marker = if !doc.class_contains(h, SORTED_CLASS) {
                    ""
                } else if doc.class_contains(h, ASC_CLASS) {
                    " ▲"
                } else {
                    " ▼"
                };
                let mut style = Style::default().bold();
                if header_focus && idx == model.header_cursor() {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                Cell::from(format!("{}{marker}", doc.text_content(h))).style(style)
            })
            .collect();

        let visible = area.height.saturating_sub(3) as usize;
        let offset = (model.row_cursor() + 1).saturating_sub(visible);
        let body: Vec<Row> = rows
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible)
            .map(|(idx, &r)| {
                let cells: Vec<Cell> = (0..headers.len())
                    .map(|c| Cell::from(ResultsTable::cell_text(doc, r, c)))
                    .collect();
                let row = Row::new(cells);
                if model.focus() == Focus::Table && idx == model.row_cursor() {
                    row.style(Style::default().add_modifier(Modifier::REVERSED))
                } else {
                    row
                }
            })
            .collect();

        let title = Line::from(vec![
            " Results ".bold(),
            Span::from(format!("{} rows ", rows.len())),
        ]);
        let table = Table::new(body, widths.into_iter().map(Constraint::Length))
            .header(Row::new(header_cells))
            .block(Block::bordered().title(title));
        frame.render_widget(table, area);
    }

    fn draw_filter(&self, model: &Model, frame: &mut Frame, area: Rect) {
        let doc = model.document();
        let line = match model.filter_input() {
            Some(input) => {
                let cursor_x = area.x + 8 + input.cursor as u16;
                frame.set_cursor_position((cursor_x, area.y));
                Line::from(vec!["Filter: ".blue().bold(), Span::from(input.text.clone())])
            }
            None => {
                let value = doc
                    .by_id(&model.config().filter_id)
                    .and_then(|f| doc.value(f))
                    .unwrap_or_default()
                    .to_string();
                Line::from(vec!["Filter: ".blue(), Span::from(value)])
            }
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn draw_status(&self, model: &Model, frame: &mut Frame, area: Rect) {
        let sort = model.sort_state();
        let line = Line::from(vec![
            Span::from(model.status_message().to_string()),
            "  sort: ".dark_gray(),
            Span::from(format!("{} {}", sort.key, sort.direction)).dark_gray(),
            "  <?> help <q> quit".dark_gray(),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn draw_modal(&self, model: &Model, frame: &mut Frame) {
        let doc = model.document();
        let Some(modal) = doc.by_id(&model.config().modal_id) else {
            return;
        };
        let area = modal_area(frame.area());
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(doc.text_content(modal))
                .wrap(Wrap { trim: false })
                .block(Block::bordered().title(" Help ".bold())),
            area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modal_area_is_centred() {
        let area = modal_area(Rect::new(0, 0, 100, 40));
        assert_eq!(area, Rect::new(20, 8, 60, 24));
        let tiny = modal_area(Rect::new(0, 0, 1, 1));
        assert_eq!(tiny.width, 0);
    }

    #[test]
    fn text_width_is_capped() {
        assert_eq!(text_width("Dota 2"), 6);
        assert_eq!(text_width(&"x".repeat(70_000)), COLUMN_WIDTH_MAX);
    }
}

use ratatui::{
    Frame,
    layout::{Constraint, Flex, Margin, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{
        Block, Cell, Clear, Paragraph, Row, Scrollbar, ScrollbarOrientation, ScrollbarState,
        Table, Wrap,
    },
};

use crate::domain::ToastKind;
use crate::model::{Model, UIData};

pub const TOAST_HEIGHT: usize = 1;
pub const SEARCHBAR_HEIGHT: usize = 1;
pub const TABLE_HEADER_HEIGHT: usize = 1;
pub const CMDLINE_HEIGH: usize = 1;
pub const SCROLLBAR_WIDTH: usize = 1;
pub const COLUMN_SPACING: usize = 1;
pub const COLUMN_WIDTH_MARGIN: usize = 1;
pub const MIN_NAME_WIDTH: usize = 12;
pub const SEARCH_LABEL: &str = " Search: ";
pub const SEARCH_BUTTON_WIDTH: usize = 10;
pub const FEATURED_BADGE: &str = " Featured";
pub const NO_RESULTS: &str = "No search results found";
const SEARCH_PLACEHOLDER: &str = "Search by college name...";

#[derive(Debug)]
pub struct TableUI {
    show_help_hint: bool,
}

impl Default for TableUI {
    fn default() -> Self {
        Self::new()
    }
}

impl TableUI {
    pub fn new() -> Self {
        Self {
            show_help_hint: true,
        }
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();
        let area = frame.area();

        self.render_toast(uidata, frame, area);
        self.render_searchbar(uidata, frame, area);
        self.render_table(uidata, frame, area);
        self.render_statusline(uidata, frame, area);
        if uidata.show_popup {
            self.show_help_hint = false;
            self.render_popup(uidata, frame, area);
        }
    }

    fn line_rect(area: Rect, x: usize, y: usize, width: usize, height: usize) -> Rect {
        Rect::new(x as u16, y as u16, width as u16, height as u16).intersection(area)
    }

    fn render_toast(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let rect = Self::line_rect(area, 0, uidata.layout.toast_y, uidata.layout.width, TOAST_HEIGHT);
        let line = match &uidata.toast {
            Some(toast) => {
                let style = match toast.kind {
                    ToastKind::Success => Style::new().black().on_green(),
                    ToastKind::Error => Style::new().white().on_red(),
                };
                Line::from(Span::styled(format!(" {} ", toast.message), style.bold()))
            }
            None => Line::from(vec![
                " ct ".bold().reversed(),
                format!(" {} ", uidata.name).into(),
            ]),
        };
        frame.render_widget(Paragraph::new(line), rect);
    }

    fn render_searchbar(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let layout = &uidata.layout;
        let rect = Self::line_rect(area, 0, layout.search_y, layout.input_x, SEARCHBAR_HEIGHT);
        frame.render_widget(Paragraph::new(SEARCH_LABEL.bold()), rect);

        let rect = Self::line_rect(
            area,
            layout.input_x,
            layout.search_y,
            layout.input_width,
            SEARCHBAR_HEIGHT,
        );
        let input = if uidata.active_cmdinput {
            let (text, curser) = &uidata.search_input;
            frame.set_cursor_position((rect.x + *curser as u16, rect.y));
            Span::styled(text.clone(), Style::new().underlined())
        } else if uidata.search_query.is_empty() {
            Span::styled(SEARCH_PLACEHOLDER, Style::new().dark_gray().italic())
        } else {
            Span::raw(uidata.search_query.clone())
        };
        frame.render_widget(Paragraph::new(input), rect);

        let rect = Self::line_rect(
            area,
            layout.button_x,
            layout.search_y,
            SEARCH_BUTTON_WIDTH,
            SEARCHBAR_HEIGHT,
        );
        let button = Line::from(format!("[{}]", uidata.button_label))
            .centered()
            .bold()
            .reversed();
        frame.render_widget(Paragraph::new(button), rect);
    }

    fn render_table(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let layout = &uidata.layout;
        let rect = Self::line_rect(
            area,
            0,
            layout.header_y,
            layout.table_width,
            TABLE_HEADER_HEIGHT + layout.table_height,
        );

        let header = Row::new(uidata.table.iter().enumerate().map(|(idx, column)| {
            let cell = Cell::from(column.name.clone());
            if idx == uidata.selected_column {
                cell.style(Style::new().bold().underlined())
            } else {
                cell.style(Style::new().bold())
            }
        }))
        .style(Style::new().on_dark_gray());

        let nrows = uidata.table.first().map(|c| c.data.len()).unwrap_or(0);
        let rows = (0..nrows).map(|ridx| {
            let featured = uidata.featured.get(ridx).copied().unwrap_or(false);
            let cells = uidata.table.iter().enumerate().map(|(cidx, column)| {
                let value = column.data[ridx].clone();
                if cidx == 0 && uidata.show_badge && featured {
                    Cell::from(Line::from(vec![
                        Span::raw(value),
                        Span::styled(FEATURED_BADGE, Style::new().yellow().bold()),
                    ]))
                } else if !uidata.show_badge && cidx + 1 == uidata.table.len() && value == "Yes" {
                    Cell::from(value.yellow())
                } else {
                    Cell::from(value)
                }
            });
            let row = Row::new(cells);
            if ridx == uidata.selected_row {
                row.style(Style::new().add_modifier(Modifier::REVERSED))
            } else {
                row
            }
        });

        let widths = uidata
            .table
            .iter()
            .map(|c| Constraint::Length(c.width as u16));
        let table = Table::new(rows, widths)
            .header(header)
            .column_spacing(COLUMN_SPACING as u16)
            .flex(Flex::Start);
        frame.render_widget(table, rect);

        let body = Self::line_rect(
            area,
            0,
            layout.table_y,
            layout.table_width,
            layout.table_height,
        );
        if uidata.nrows == 0 {
            let rect = Rect { height: body.height.min(1), ..body };
            frame.render_widget(Paragraph::new(NO_RESULTS.italic()).centered(), rect);
        }

        let rect = Self::line_rect(
            area,
            layout.table_width,
            layout.table_y,
            SCROLLBAR_WIDTH,
            layout.table_height,
        );
        let mut state = ScrollbarState::new(uidata.nrows.saturating_sub(layout.table_height))
            .position(uidata.offset_row);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None),
            rect,
            &mut state,
        );
    }

    fn render_statusline(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let layout = &uidata.layout;
        let rect = Self::line_rect(
            area,
            0,
            layout.statusline_y,
            layout.statusline_width,
            layout.statusline_height,
        );
        let mode = if uidata.active_cmdinput {
            " SEARCH ".black().on_yellow()
        } else {
            " TABLE ".black().on_blue()
        };
        let mut spans = vec![
            mode,
            format!(
                " page {} | row {}/{} of {} matches ({} total) | sort: {} | ",
                uidata.page,
                if uidata.nrows == 0 { 0 } else { uidata.abs_selected_row + 1 },
                uidata.nrows,
                uidata.matches,
                uidata.total,
                uidata.sort_label,
            )
            .into(),
            uidata.status_message.clone().dark_gray(),
        ];
        if self.show_help_hint {
            spans.push("  ? help".dark_gray());
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), rect);
    }

    fn render_popup(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let lines = uidata.popup_message.lines().count() as u16 + 2;
        let width = uidata
            .popup_message
            .lines()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0) as u16
            + 4;
        let horizontal = area.width.saturating_sub(width) / 2;
        let vertical = area.height.saturating_sub(lines) / 2;
        let rect = area.inner(Margin::new(horizontal, vertical));

        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(uidata.popup_message.as_str())
                .wrap(Wrap { trim: false })
                .block(Block::bordered().title(Line::from(" Help ").centered())),
            rect,
        );
    }
}

use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

use crate::college::Dataset;
use crate::domain::{
    CTConfig, CollegeField, ColumnLayout, HELP_TEXT, Message, SearchButton, SortConfig, Toast,
};
use crate::inputter::{InputResult, Inputter};
use crate::ui::{
    CMDLINE_HEIGH, COLUMN_SPACING, COLUMN_WIDTH_MARGIN, FEATURED_BADGE, MIN_NAME_WIDTH,
    SCROLLBAR_WIDTH, SEARCH_BUTTON_WIDTH, SEARCH_LABEL, SEARCHBAR_HEIGHT, TABLE_HEADER_HEIGHT,
    TOAST_HEIGHT,
};
use crate::view::{DerivedView, derive_view, search_toast};

#[derive(Debug, PartialEq)]
pub enum Status {
    EMPTY,
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    SEARCHINPUT,
    POPUP,
}

#[derive(Clone, Debug, Default)]
pub struct ColumnView {
    pub name: String,
    pub width: usize,
    pub data: Vec<String>,
}

struct TableView {
    view: DerivedView,
    columns: Vec<CollegeField>,
    column_widths: Vec<usize>,
    curser_row: usize,
    curser_column: usize,
    offset_row: usize,
    data: Vec<ColumnView>,
    featured: Vec<bool>,
    heigh: usize,
}

impl TableView {
    fn empty(columns: Vec<CollegeField>) -> Self {
        TableView {
            view: DerivedView::default(),
            columns,
            column_widths: Vec::new(),
            curser_row: 0,
            curser_column: 0,
            offset_row: 0,
            data: Vec::new(),
            featured: Vec::new(),
            heigh: 0,
        }
    }

    // Largest scroll offset, the bottom of the scrollable body
    fn max_offset(&self) -> usize {
        self.view.rows.len().saturating_sub(self.heigh)
    }

    fn selected(&self) -> Option<usize> {
        self.view.rows.get(self.offset_row + self.curser_row).copied()
    }

    // Column under the horizontal position x, spacing counts to the column on its left
    fn column_at(&self, x: usize) -> Option<usize> {
        let mut end = 0;
        for (idx, width) in self.column_widths.iter().enumerate() {
            end += width + COLUMN_SPACING;
            if x < end {
                return Some(idx);
            }
        }
        None
    }
}

pub struct UIData {
    pub name: String,
    pub table: Vec<ColumnView>,
    pub featured: Vec<bool>,
    pub show_badge: bool,
    pub nrows: usize, // Loaded rows
    pub matches: usize,
    pub total: usize,
    pub page: usize,
    pub offset_row: usize,
    pub selected_row: usize,
    pub selected_column: usize,
    pub abs_selected_row: usize,
    pub show_popup: bool,
    pub popup_message: String,
    pub layout: UILayout,
    pub toast: Option<Toast>,
    pub search_query: String,
    pub search_input: (String, usize),
    pub active_cmdinput: bool,
    pub button_label: String,
    pub sort_label: String,
    pub status_message: String,
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            name: String::new(),
            table: Vec::new(),
            featured: Vec::new(),
            show_badge: false,
            nrows: 0,
            matches: 0,
            total: 0,
            page: 1,
            offset_row: 0,
            selected_row: 0,
            selected_column: 0,
            abs_selected_row: 0,
            show_popup: false,
            popup_message: String::new(),
            layout: UILayout::default(),
            toast: None,
            search_query: String::new(),
            search_input: (String::new(), 0),
            active_cmdinput: false,
            button_label: String::new(),
            sort_label: String::new(),
            status_message: String::new(),
        }
    }
}

/// Screen positions of all parts of the ui, shared by rendering and mouse hit testing.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct UILayout {
    pub width: usize,
    pub height: usize,
    pub toast_y: usize,
    pub search_y: usize,
    pub input_x: usize,
    pub input_width: usize,
    pub button_x: usize,
    pub header_y: usize,
    pub table_y: usize,
    pub table_width: usize,
    pub table_height: usize,
    pub statusline_y: usize,
    pub statusline_width: usize,
    pub statusline_height: usize,
}

impl UILayout {
    pub fn from_values(ui_width: usize, ui_height: usize) -> Self {
        let toast_y = 0;
        let search_y = toast_y + TOAST_HEIGHT;
        let header_y = search_y + SEARCHBAR_HEIGHT;
        let table_y = header_y + TABLE_HEADER_HEIGHT;
        let table_height = ui_height.saturating_sub(table_y + CMDLINE_HEIGH);

        let input_x = SEARCH_LABEL.chars().count();
        let button_x = ui_width.saturating_sub(SEARCH_BUTTON_WIDTH);

        let layout = UILayout {
            width: ui_width,
            height: ui_height,
            toast_y,
            search_y,
            input_x,
            input_width: button_x.saturating_sub(input_x + 1),
            button_x,
            header_y,
            table_y,
            table_width: ui_width.saturating_sub(SCROLLBAR_WIDTH),
            table_height,
            statusline_y: table_y + table_height,
            statusline_width: ui_width,
            statusline_height: CMDLINE_HEIGH,
        };
        trace!("Build UILayout: {:?}", layout);
        layout
    }
}

pub struct Model {
    config: CTConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    dataset: Dataset,
    search_query: String,
    sort_config: SortConfig,
    page: usize,
    table: TableView,
    toast: Option<Toast>,
    toast_shown: Instant,
    uilayout: UILayout,
    uidata: UIData,
    input: Inputter,
    last_input: InputResult,
    active_cmdinput: bool,
    status_message: String,
}

impl Model {
    pub fn init(config: &CTConfig, ui_width: usize, ui_height: usize) -> Self {
        let columns = Self::columns_for(config.layout);
        let mut model = Self {
            config: config.clone(),
            status: Status::EMPTY,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            dataset: Dataset::default(),
            search_query: String::new(),
            sort_config: SortConfig::default(),
            page: 1,
            table: TableView::empty(columns),
            toast: None,
            toast_shown: Instant::now(),
            uilayout: UILayout::from_values(ui_width, ui_height),
            uidata: UIData::empty(),
            input: Inputter::default(),
            last_input: InputResult::default(),
            active_cmdinput: false,
            status_message: "Started ct!".to_string(),
        };
        model.input.set_width(model.uilayout.input_width);
        model.layout_columns();
        model.recompute(true);
        model
    }

    fn columns_for(layout: ColumnLayout) -> Vec<CollegeField> {
        let last = match layout {
            ColumnLayout::Featured => CollegeField::Featured,
            ColumnLayout::Ranked => CollegeField::Ranking,
        };
        vec![
            CollegeField::Name,
            CollegeField::CollegeduniaRating,
            CollegeField::Fees,
            CollegeField::UserReviewRating,
            last,
        ]
    }

    /// Replace the source collection. The view is derived from scratch.
    pub fn load_dataset(&mut self, dataset: Dataset) {
        info!("Showing dataset {} with {} records", dataset.name(), dataset.len());
        self.status = if dataset.is_empty() {
            Status::EMPTY
        } else {
            Status::READY
        };
        self.set_status_message(format!("Loaded {} colleges", dataset.len()));
        self.dataset = dataset;
        self.page = 1;
        self.table.offset_row = 0;
        self.table.curser_row = 0;
        self.layout_columns();
        self.recompute(true);
    }

    fn show_badge(&self) -> bool {
        self.config.layout == ColumnLayout::Ranked
    }

    // Widths are based on the whole dataset so they do not jump while scrolling or searching
    fn layout_columns(&mut self) {
        let records = self.dataset.records();
        let badge_width = if self.show_badge() {
            FEATURED_BADGE.chars().count()
        } else {
            0
        };
        let mut widths: Vec<usize> = self
            .table
            .columns
            .iter()
            .map(|&field| {
                let header = field.label().chars().count() + if field.is_sortable() { 2 } else { 0 };
                let content = records
                    .iter()
                    .map(|c| {
                        let badge = if field == CollegeField::Name && c.is_featured() {
                            badge_width
                        } else {
                            0
                        };
                        c.cell(field).chars().count() + badge
                    })
                    .max()
                    .unwrap_or(0);
                std::cmp::max(header, content) + COLUMN_WIDTH_MARGIN
            })
            .collect();

        if let Some(name_width) = widths.first_mut() {
            *name_width = std::cmp::min(*name_width, self.config.max_column_width);
        }

        // Shrink the name column if the table does not fit on screen
        let total: usize = widths.iter().map(|w| w + COLUMN_SPACING).sum();
        if total > self.uilayout.table_width
            && let Some(name_width) = widths.first_mut()
        {
            let overflow = total - self.uilayout.table_width;
            *name_width = std::cmp::max(MIN_NAME_WIDTH, name_width.saturating_sub(overflow));
        }
        trace!("Column widths {:?}", widths);
        self.table.column_widths = widths;
    }

    /// Filter, sort and paginate again, then refresh the visible window.
    /// The search toast only follows changes of the query, the page or the dataset.
    fn recompute(&mut self, refresh_toast: bool) {
        let start_time = Instant::now();
        let view = derive_view(
            self.dataset.records(),
            &self.search_query,
            &self.sort_config,
            self.page,
            self.config.items_per_page,
        );
        if refresh_toast
            && let Some(toast) = search_toast(&self.search_query, view.matches)
        {
            self.toast = Some(toast);
            self.toast_shown = Instant::now();
        }
        debug!(
            "Recomputed view in {}ms: {} of {} matches on page {}",
            start_time.elapsed().as_millis(),
            view.rows.len(),
            view.matches,
            self.page
        );
        self.table.view = view;
        self.update_table_data();
    }

    fn update_table_data(&mut self) {
        let show_badge = self.show_badge();
        let table = &mut self.table;
        table.heigh = self.uilayout.table_height;

        // The number of rows can shrink, keep curser and offset inside the table
        if table.view.rows.is_empty() {
            table.offset_row = 0;
            table.curser_row = 0;
        } else {
            let last = table.view.rows.len() - 1;
            let abs = std::cmp::min(table.offset_row + table.curser_row, last);
            table.offset_row = std::cmp::min(table.offset_row, table.max_offset());
            if abs < table.offset_row {
                table.offset_row = abs;
            }
            table.curser_row = abs - table.offset_row;
        }
        table.curser_column = std::cmp::min(
            table.curser_column,
            table.columns.len().saturating_sub(1),
        );

        let rbegin = table.offset_row;
        let rend = std::cmp::min(rbegin + table.heigh, table.view.rows.len());
        let records = self.dataset.records();

        table.featured = table.view.rows[rbegin..rend]
            .iter()
            .map(|&ridx| records[ridx].is_featured())
            .collect();

        table.data = table
            .columns
            .iter()
            .zip(table.column_widths.iter())
            .map(|(&field, &width)| {
                let data = table.view.rows[rbegin..rend]
                    .iter()
                    .map(|&ridx| {
                        let college = &records[ridx];
                        let mut cell_width = width.saturating_sub(COLUMN_WIDTH_MARGIN);
                        if show_badge && field == CollegeField::Name && college.is_featured() {
                            cell_width = cell_width.saturating_sub(FEATURED_BADGE.chars().count());
                        }
                        Self::get_visible_name(college.cell(field), cell_width)
                    })
                    .collect();
                let name = if field.is_sortable() {
                    format!("{}{}", field.label(), self.sort_config.indicator(field))
                } else {
                    field.label().to_string()
                };
                ColumnView { name, width, data }
            })
            .collect();

        trace!(
            "Table: Cr {}, Cc {}, Or {}, Rb {}, Re {}, th: {}, rows: {}",
            table.curser_row,
            table.curser_column,
            table.offset_row,
            rbegin,
            rend,
            table.heigh,
            table.view.rows.len()
        );
        self.update_uidata_for_table();
    }

    fn get_visible_name(name: String, width: usize) -> String {
        if name.chars().count() <= width {
            return name;
        }
        if width < 3 {
            return name.chars().take(width).collect();
        }
        let mut reduced_name = name.chars().take(width - 3).collect::<String>();
        reduced_name.push_str("...");
        reduced_name
    }

    fn button_label(&self) -> &'static str {
        match self.config.search_button {
            SearchButton::Clear if !self.search_query.is_empty() => "Clear",
            _ => "Search",
        }
    }

    fn sort_label(&self) -> String {
        match self.sort_config.key {
            Some(key) => format!("{}{}", key.label(), self.sort_config.indicator(key)),
            None => "unsorted".to_string(),
        }
    }

    fn update_uidata_for_table(&mut self) {
        let table = &self.table;
        self.uidata = UIData {
            name: self.dataset.name().to_string(),
            table: table.data.clone(),
            featured: table.featured.clone(),
            show_badge: self.show_badge(),
            nrows: table.view.rows.len(),
            matches: table.view.matches,
            total: self.dataset.len(),
            page: self.page,
            offset_row: table.offset_row,
            selected_row: table.curser_row,
            selected_column: table.curser_column,
            abs_selected_row: table.offset_row + table.curser_row,
            show_popup: self.modus == Modus::POPUP,
            popup_message: HELP_TEXT.to_string(),
            layout: self.uilayout.clone(),
            toast: self.toast.clone(),
            search_query: self.search_query.clone(),
            search_input: self.input.visible(),
            active_cmdinput: self.active_cmdinput,
            button_label: self.button_label().to_string(),
            sort_label: self.sort_label(),
            status_message: self.status_message.clone(),
        }
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.uidata.status_message = self.status_message.clone();
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    pub fn raw_keyevents(&self) -> bool {
        self.active_cmdinput
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.uilayout.width, width, self.uilayout.height, height
        );
        self.uilayout = UILayout::from_values(width, height);
        self.input.set_width(self.uilayout.input_width);
        self.layout_columns();
        self.update_table_data();
    }

    fn expire_toast(&mut self) {
        if let Some(timeout) = self.config.toast_timeout
            && self.toast.is_some()
            && self.toast_shown.elapsed() >= Duration::from_millis(timeout)
        {
            trace!("Toast timed out");
            self.toast = None;
            self.update_uidata_for_table();
        }
    }

    pub fn update(&mut self, message: Option<Message>) {
        self.expire_toast();

        if let Some(msg) = message {
            match self.modus {
                Modus::TABLE => match msg {
                    Message::Quit => self.quit(),
                    Message::MoveDown => self.move_table_selection_down(1),
                    Message::MoveUp => self.move_table_selection_up(1),
                    Message::MoveLeft => self.move_table_selection_left(),
                    Message::MoveRight => self.move_table_selection_right(),
                    Message::MovePageUp => self.move_table_selection_up(self.table.heigh.max(1)),
                    Message::MovePageDown => {
                        self.move_table_selection_down(self.table.heigh.max(1))
                    }
                    Message::MoveBeginning => self.move_table_selection_beginning(),
                    Message::MoveEnd => self.move_table_selection_end(),
                    Message::ScrollUp(lines) => self.scroll_up(lines),
                    Message::ScrollDown(lines) => self.scroll_down(lines),
                    Message::Click(x, y) => self.click(x as usize, y as usize),
                    Message::SortCurrentColumn => self.sort_by_column(self.table.curser_column),
                    Message::SortColumn(idx) => self.sort_by_column(idx),
                    Message::Search => self.enter_search_mode(),
                    Message::SearchButton => self.press_search_button(),
                    Message::CopyCell => self.copy_table_cell(),
                    Message::CopyRow => self.copy_table_row(),
                    Message::Help => self.show_help(),
                    Message::Exit => self.exit(),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    Message::RawKey(_) => (),
                },
                Modus::SEARCHINPUT => match msg {
                    Message::RawKey(key) => self.raw_input(key),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    Message::ScrollUp(lines) => self.scroll_up(lines),
                    Message::ScrollDown(lines) => self.scroll_down(lines),
                    Message::Click(x, y) => {
                        self.leave_search_mode();
                        self.click(x as usize, y as usize);
                    }
                    _ => (),
                },
                Modus::POPUP => match msg {
                    Message::Quit => self.quit(),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    Message::Exit | Message::Help | Message::Click(_, _) => self.exit(),
                    _ => (),
                },
            }
        }
    }

    // -------------------- Control handling functions ---------------------- //

    fn exit(&mut self) {
        match self.modus {
            Modus::TABLE => {
                // Nothing to leave, only dismiss the notification
                self.toast = None;
            }
            Modus::POPUP => {
                trace!("Close popup ...");
                self.modus = self.previous_modus;
                self.previous_modus = Modus::POPUP;
            }
            Modus::SEARCHINPUT => self.leave_search_mode(),
        }
        self.update_uidata_for_table();
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
        self.update_uidata_for_table();
    }

    fn click(&mut self, x: usize, y: usize) {
        let layout = self.uilayout.clone();
        trace!("Click at {x}:{y}");
        if y == layout.toast_y {
            self.toast = None;
            self.update_uidata_for_table();
        } else if y == layout.search_y {
            if x >= layout.button_x {
                self.press_search_button();
            } else {
                self.enter_search_mode();
            }
        } else if y == layout.header_y {
            if let Some(column) = self.table.column_at(x) {
                self.sort_by_column(column);
            }
        } else if y >= layout.table_y && y < layout.table_y + layout.table_height {
            let row = self.table.offset_row + (y - layout.table_y);
            if row < self.table.view.rows.len() {
                if let Some(column) = self.table.column_at(x) {
                    self.table.curser_column = column;
                }
                self.select_row(row);
            }
        }
    }

    fn enter_search_mode(&mut self) {
        trace!("Entering search input ...");
        self.previous_modus = self.modus;
        self.modus = Modus::SEARCHINPUT;
        self.active_cmdinput = true;
        self.input.set(&self.search_query);
        self.last_input = self.input.get();
        self.update_uidata_for_table();
    }

    fn leave_search_mode(&mut self) {
        trace!("Leaving search input ...");
        self.active_cmdinput = false;
        self.modus = Modus::TABLE;
        self.previous_modus = Modus::SEARCHINPUT;
        self.update_uidata_for_table();
    }

    fn raw_input(&mut self, key: KeyEvent) {
        self.last_input = self.input.read(key);
        if self.last_input.input != self.search_query {
            // The query is live, every edit derives the view again
            self.search_query = self.last_input.input.clone();
            self.recompute(true);
        }
        if self.last_input.finished {
            self.leave_search_mode();
            if !self.last_input.canceled {
                self.apply_search();
            }
        } else {
            self.update_uidata_for_table();
        }
    }

    fn press_search_button(&mut self) {
        match self.config.search_button {
            SearchButton::Clear if !self.search_query.is_empty() => self.clear_search(),
            _ => self.apply_search(),
        }
    }

    fn apply_search(&mut self) {
        debug!("Apply search \"{}\"", self.search_query);
        self.page = 1;
        self.table.offset_row = 0;
        self.table.curser_row = 0;
        self.recompute(true);
        let message = format!("{} matches", self.table.view.matches);
        self.set_status_message(message);
    }

    fn clear_search(&mut self) {
        debug!("Clear search \"{}\"", self.search_query);
        self.search_query.clear();
        self.input.clear();
        self.page = 1;
        self.table.offset_row = 0;
        self.table.curser_row = 0;
        self.recompute(true);
        self.set_status_message("Search cleared");
    }

    fn sort_by_column(&mut self, column: usize) {
        let Some(&field) = self.table.columns.get(column) else {
            return;
        };
        self.table.curser_column = column;
        if !field.is_sortable() {
            self.set_status_message(format!("Column {} can not be sorted", field.label()));
            self.update_table_data();
            return;
        }
        self.sort_config = self.sort_config.toggled(field);
        debug!("Sort by {:?}", self.sort_config);
        self.recompute(false);
        let message = format!("Sorted by {}", self.sort_label());
        self.set_status_message(message);
    }

    /// Load one more page if not everything is visible yet.
    fn next_page(&mut self) -> bool {
        if !self.table.view.has_more() {
            trace!("All {} matches visible", self.table.view.matches);
            return false;
        }
        self.page += 1;
        debug!("Reached the bottom, loading page {}", self.page);
        self.recompute(true);
        true
    }

    fn scroll_down(&mut self, lines: usize) {
        let table = &mut self.table;
        let max_offset = table.max_offset();
        let abs = table.offset_row + table.curser_row;
        table.offset_row = std::cmp::min(table.offset_row + lines, max_offset);
        // Keep the selected record if it is still on screen
        if abs >= table.offset_row {
            table.curser_row = abs - table.offset_row;
        } else {
            table.curser_row = 0;
        }
        if table.offset_row == max_offset {
            self.next_page();
        }
        self.update_table_data();
    }

    fn scroll_up(&mut self, lines: usize) {
        let table = &mut self.table;
        let abs = table.offset_row + table.curser_row;
        table.offset_row = table.offset_row.saturating_sub(lines);
        table.curser_row = abs - table.offset_row;
        self.update_table_data();
    }

    fn select_row(&mut self, row: usize) {
        let table = &mut self.table;
        let heigh = table.heigh.max(1);
        trace!("Select row {}", row);
        if row >= table.offset_row && row < table.offset_row + heigh {
            table.curser_row = row - table.offset_row;
        } else if row < table.offset_row {
            table.offset_row = row;
            table.curser_row = 0;
        } else {
            table.offset_row = row + 1 - heigh;
            table.curser_row = heigh - 1;
        }
        self.update_table_data();
    }

    fn is_on_last_row(&self) -> bool {
        self.table.offset_row + self.table.curser_row + 1 >= self.table.view.rows.len()
    }

    fn move_table_selection_beginning(&mut self) {
        self.table.curser_row = 0;
        self.table.offset_row = 0;
        self.update_table_data();
    }

    fn move_table_selection_end(&mut self) {
        if self.is_on_last_row() {
            self.next_page();
        }
        if !self.table.view.rows.is_empty() {
            self.select_row(self.table.view.rows.len() - 1);
        }
    }

    fn move_table_selection_up(&mut self, size: usize) {
        let abs = self.table.offset_row + self.table.curser_row;
        self.select_row(abs.saturating_sub(size));
    }

    fn move_table_selection_down(&mut self, size: usize) {
        if self.table.view.rows.is_empty() {
            return;
        }
        if self.is_on_last_row() {
            self.next_page();
        }
        let abs = self.table.offset_row + self.table.curser_row;
        self.select_row(std::cmp::min(abs + size, self.table.view.rows.len() - 1));
    }

    fn move_table_selection_left(&mut self) {
        self.table.curser_column = self.table.curser_column.saturating_sub(1);
        self.update_table_data();
    }

    fn move_table_selection_right(&mut self) {
        if self.table.curser_column + 1 < self.table.columns.len() {
            self.table.curser_column += 1;
        }
        self.update_table_data();
    }

    fn copy_to_clipboard(&mut self, content: String) {
        match Clipboard::new().and_then(|mut clipboard| clipboard.set_text(content)) {
            Ok(_) => {
                trace!("Copied content to clipboard.");
                self.set_status_message("Copied to clipboard");
            }
            Err(e) => {
                trace!("Error copying to clipboard: {:?}", e);
                self.set_status_message("Clipboard is not available");
            }
        }
    }

    fn copy_table_cell(&mut self) {
        let Some(ridx) = self.table.selected() else {
            return;
        };
        let field = self.table.columns[self.table.curser_column];
        let cell = self.dataset.records()[ridx].cell(field);
        trace!("Cell content: {}", cell);
        self.copy_to_clipboard(cell);
    }

    fn wrap_cell_content(c: &str) -> String {
        let needs_escaping = c.contains('"');
        let needs_wrapping = c.chars().any(|c| c == ' ' || c == '\t' || c == ',');
        let mut out = String::from(c);

        if needs_escaping {
            out = out.replace('"', "\"\"");
        }
        if needs_wrapping || needs_escaping {
            out = format!("\"{out}\"");
        }
        out
    }

    fn row_as_csv(&self, ridx: usize) -> String {
        let college = &self.dataset.records()[ridx];
        [
            CollegeField::Name,
            CollegeField::CollegeduniaRating,
            CollegeField::Fees,
            CollegeField::UserReviewRating,
            CollegeField::Ranking,
            CollegeField::Featured,
        ]
        .iter()
        .map(|&field| Self::wrap_cell_content(&college.cell(field)))
        .collect::<Vec<String>>()
        .join(",")
    }

    fn copy_table_row(&mut self) {
        let Some(ridx) = self.table.selected() else {
            return;
        };
        let row_content = self.row_as_csv(ridx);
        self.copy_to_clipboard(row_content);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::college::College;
    use crate::domain::{SortDirection, ToastKind};
    use crate::view::{NO_SEARCH_RESULT_FOUND, SEARCH_RESULT_FOUND};
    use ratatui::crossterm::event::{KeyCode, KeyModifiers};

    impl Model {
        fn page(&self) -> usize {
            self.page
        }

        fn visible_rows(&self) -> &[usize] {
            &self.table.view.rows
        }

        fn toast(&self) -> Option<&Toast> {
            self.toast.as_ref()
        }

        fn search_query(&self) -> &str {
            &self.search_query
        }

        fn sort_config(&self) -> SortConfig {
            self.sort_config
        }
    }

    // 80x24 leaves 20 rows for the table body
    fn model_with(config: CTConfig, records: Vec<College>) -> Model {
        let mut model = Model::init(&config, 80, 24);
        model.load_dataset(Dataset::from_records("test", records));
        model
    }

    fn numbered(n: usize) -> Vec<College> {
        (0..n)
            .map(|i| College {
                fees: Some((n - i) as f64),
                featured: Some(i % 2 == 0),
                ..College::named(&format!("College {i:02}"))
            })
            .collect()
    }

    fn alpha_beta() -> Vec<College> {
        vec![
            College {
                fees: Some(100.0),
                ..College::named("Alpha")
            },
            College {
                fees: Some(50.0),
                ..College::named("Beta")
            },
        ]
    }

    fn type_query(model: &mut Model, query: &str) {
        model.update(Some(Message::Search));
        for c in query.chars() {
            model.update(Some(Message::RawKey(KeyEvent::new(
                KeyCode::Char(c),
                KeyModifiers::NONE,
            ))));
        }
    }

    fn key(model: &mut Model, code: KeyCode) {
        model.update(Some(Message::RawKey(KeyEvent::new(code, KeyModifiers::NONE))));
    }

    #[test]
    fn starts_with_the_first_page() {
        let model = model_with(CTConfig::default(), numbered(25));
        assert_eq!(model.status, Status::READY);
        assert_eq!(model.page(), 1);
        assert_eq!(model.visible_rows(), (0..10).collect::<Vec<usize>>().as_slice());
        assert_eq!(model.toast(), None);

        let uidata = model.get_uidata();
        assert_eq!(uidata.nrows, 10);
        assert_eq!(uidata.matches, 25);
        assert_eq!(uidata.table.len(), 5);
        assert_eq!(uidata.table[0].data[0], "College 00");
        assert_eq!(uidata.table[4].name, "Featured");
        assert_eq!(uidata.table[4].data[0], "Yes");
        assert_eq!(uidata.button_label, "Search");
    }

    #[test]
    fn empty_dataset() {
        let model = model_with(CTConfig::default(), Vec::new());
        assert_eq!(model.status, Status::EMPTY);
        assert!(model.visible_rows().is_empty());
    }

    #[test]
    fn live_search_with_toast() {
        let mut model = model_with(CTConfig::default(), alpha_beta());
        type_query(&mut model, "al");
        assert!(model.raw_keyevents());
        assert_eq!(model.search_query(), "al");
        assert_eq!(model.visible_rows(), &[0]);
        let toast = model.toast().unwrap();
        assert_eq!(toast.kind, ToastKind::Success);
        assert_eq!(toast.message, SEARCH_RESULT_FOUND);
    }

    #[test]
    fn search_without_results() {
        let mut model = model_with(CTConfig::default(), alpha_beta());
        type_query(&mut model, "zzz");
        key(&mut model, KeyCode::Enter);
        assert!(!model.raw_keyevents());
        assert!(model.visible_rows().is_empty());
        assert_eq!(model.get_uidata().nrows, 0);
        let toast = model.toast().unwrap();
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.message, NO_SEARCH_RESULT_FOUND);
    }

    #[test]
    fn emptying_the_query_keeps_the_toast() {
        let mut model = model_with(CTConfig::default(), alpha_beta());
        type_query(&mut model, "b");
        key(&mut model, KeyCode::Backspace);
        assert_eq!(model.search_query(), "");
        assert_eq!(model.visible_rows(), &[0, 1]);
        assert_eq!(model.toast().unwrap().message, SEARCH_RESULT_FOUND);

        // Escape clears the query as well
        type_query(&mut model, "zzz");
        key(&mut model, KeyCode::Esc);
        assert!(!model.raw_keyevents());
        assert_eq!(model.search_query(), "");
        assert_eq!(model.toast().unwrap().message, NO_SEARCH_RESULT_FOUND);
    }

    #[test]
    fn dismissing_the_toast() {
        let mut model = model_with(CTConfig::default(), alpha_beta());
        type_query(&mut model, "al");
        key(&mut model, KeyCode::Enter);
        model.update(Some(Message::Exit));
        assert_eq!(model.toast(), None);

        type_query(&mut model, "p");
        key(&mut model, KeyCode::Enter);
        assert!(model.toast().is_some());
        model.update(Some(Message::Click(5, 0)));
        assert_eq!(model.toast(), None);
    }

    #[test]
    fn sorting_keeps_a_dismissed_toast_hidden() {
        let mut model = model_with(CTConfig::default(), alpha_beta());
        type_query(&mut model, "al");
        key(&mut model, KeyCode::Enter);
        model.update(Some(Message::Exit));
        assert_eq!(model.toast(), None);

        model.update(Some(Message::SortColumn(2)));
        assert_eq!(model.sort_config().key, Some(CollegeField::Fees));
        assert_eq!(model.toast(), None);

        model.update(Some(Message::SortColumn(2)));
        assert_eq!(model.toast(), None);
        assert!(model.get_uidata().toast.is_none());
    }

    #[test]
    fn toast_timeout() {
        let config = CTConfig::default().with_toast_timeout(0);
        let mut model = model_with(config, alpha_beta());
        type_query(&mut model, "al");
        assert!(model.toast().is_some());
        model.update(None);
        assert_eq!(model.toast(), None);
    }

    #[test]
    fn header_click_sorts_and_toggles() {
        let mut model = model_with(CTConfig::default(), alpha_beta());
        let fees_x = model.table.column_widths[..2]
            .iter()
            .map(|w| w + COLUMN_SPACING)
            .sum::<usize>();
        let header_y = model.get_uidata().layout.header_y as u16;

        model.update(Some(Message::Click(fees_x as u16, header_y)));
        assert_eq!(model.sort_config().key, Some(CollegeField::Fees));
        assert_eq!(model.sort_config().direction, SortDirection::Ascending);
        assert_eq!(model.visible_rows(), &[1, 0]);
        assert_eq!(model.get_uidata().table[2].name, "Fees ▲");

        model.update(Some(Message::Click(fees_x as u16, header_y)));
        assert_eq!(model.sort_config().direction, SortDirection::Descending);
        assert_eq!(model.visible_rows(), &[0, 1]);
        assert_eq!(model.get_uidata().table[2].name, "Fees ▼");

        model.update(Some(Message::SortColumn(0)));
        assert_eq!(model.sort_config().key, Some(CollegeField::Name));
        assert_eq!(model.sort_config().direction, SortDirection::Ascending);
        assert_eq!(model.get_uidata().table[2].name, "Fees ▲");
    }

    #[test]
    fn featured_column_is_not_sortable() {
        let mut model = model_with(CTConfig::default(), alpha_beta());
        model.update(Some(Message::SortColumn(4)));
        assert_eq!(model.sort_config(), SortConfig::default());
        assert_eq!(model.visible_rows(), &[0, 1]);
    }

    #[test]
    fn sort_stays_within_the_search() {
        let mut model = model_with(CTConfig::default(), numbered(30));
        type_query(&mut model, "college 2");
        key(&mut model, KeyCode::Enter);
        model.update(Some(Message::SortColumn(2)));
        assert_eq!(model.search_query(), "college 2");
        assert_eq!(
            model.visible_rows(),
            (20..30).rev().collect::<Vec<usize>>().as_slice()
        );
    }

    #[test]
    fn scrolling_at_the_bottom_loads_the_next_page() {
        let mut model = model_with(CTConfig::default(), numbered(25));
        model.update(Some(Message::ScrollDown(3)));
        assert_eq!(model.page(), 2);
        assert_eq!(model.visible_rows().len(), 20);

        model.update(Some(Message::ScrollDown(3)));
        assert_eq!(model.page(), 3);
        assert_eq!(model.visible_rows().len(), 25);

        // Everything is loaded, nothing changes
        model.update(Some(Message::ScrollDown(3)));
        assert_eq!(model.page(), 3);
        assert_eq!(model.visible_rows().len(), 25);
    }

    #[test]
    fn scrolling_in_the_middle_keeps_the_page() {
        // 10 body rows and 20 rows per page
        let config = CTConfig::default().with_items_per_page(20);
        let mut model = Model::init(&config, 80, 14);
        model.load_dataset(Dataset::from_records("test", numbered(50)));
        assert_eq!(model.table.heigh, 10);

        model.update(Some(Message::ScrollDown(3)));
        assert_eq!(model.page(), 1);
        assert_eq!(model.get_uidata().offset_row, 3);

        model.update(Some(Message::ScrollDown(100)));
        assert_eq!(model.page(), 2);
        assert_eq!(model.visible_rows().len(), 40);
        assert_eq!(model.get_uidata().offset_row, 10);

        model.update(Some(Message::ScrollUp(4)));
        assert_eq!(model.get_uidata().offset_row, 6);
    }

    #[test]
    fn moving_past_the_last_row_loads_the_next_page() {
        let mut model = model_with(CTConfig::default(), numbered(25));
        model.update(Some(Message::MoveEnd));
        assert_eq!(model.page(), 1);
        assert_eq!(model.get_uidata().abs_selected_row, 9);

        model.update(Some(Message::MoveDown));
        assert_eq!(model.page(), 2);
        assert_eq!(model.get_uidata().abs_selected_row, 10);
    }

    #[test]
    fn visible_rows_never_exceed_the_page() {
        let mut model = model_with(CTConfig::default(), numbered(42));
        for _ in 0..10 {
            model.update(Some(Message::MovePageDown));
            let expected = std::cmp::min(42, model.page() * 10);
            assert_eq!(model.visible_rows().len(), expected);
        }
        assert_eq!(model.page(), 5);
    }

    #[test]
    fn search_button_resets_the_page() {
        let mut model = model_with(CTConfig::default(), numbered(25));
        model.update(Some(Message::ScrollDown(1)));
        assert_eq!(model.page(), 2);

        type_query(&mut model, "college");
        assert_eq!(model.page(), 2);
        key(&mut model, KeyCode::Enter);
        assert_eq!(model.page(), 1);
        assert_eq!(model.visible_rows().len(), 10);

        model.update(Some(Message::ScrollDown(1)));
        model.update(Some(Message::SearchButton));
        assert_eq!(model.page(), 1);
        assert_eq!(model.search_query(), "college");
    }

    #[test]
    fn clear_button() {
        let config = CTConfig::default().with_search_button(SearchButton::Clear);
        let mut model = model_with(config, numbered(25));
        assert_eq!(model.get_uidata().button_label, "Search");

        type_query(&mut model, "college 1");
        key(&mut model, KeyCode::Enter);
        assert_eq!(model.get_uidata().button_label, "Clear");
        assert_eq!(model.visible_rows().len(), 10);

        let layout = model.get_uidata().layout.clone();
        model.update(Some(Message::Click(layout.button_x as u16, layout.search_y as u16)));
        assert_eq!(model.search_query(), "");
        assert_eq!(model.page(), 1);
        assert_eq!(model.visible_rows(), (0..10).collect::<Vec<usize>>().as_slice());
        assert_eq!(model.get_uidata().button_label, "Search");
    }

    #[test]
    fn click_on_search_field_starts_input() {
        let mut model = model_with(CTConfig::default(), alpha_beta());
        let layout = model.get_uidata().layout.clone();
        model.update(Some(Message::Click(layout.input_x as u16, layout.search_y as u16)));
        assert!(model.raw_keyevents());

        // Clicking the table leaves the input again
        model.update(Some(Message::Click(1, layout.table_y as u16 + 1)));
        assert!(!model.raw_keyevents());
        assert_eq!(model.get_uidata().abs_selected_row, 1);
    }

    #[test]
    fn ranked_layout_shows_ranking_and_badge() {
        let config = CTConfig::default().with_layout(ColumnLayout::Ranked);
        let mut records = alpha_beta();
        records[0].ranking = Some(2.0);
        records[0].featured = Some(true);
        let model = model_with(config, records);
        let uidata = model.get_uidata();
        assert!(uidata.show_badge);
        assert_eq!(uidata.table[4].name, "Ranking ▲");
        assert_eq!(uidata.table[4].data, vec!["2".to_string(), String::new()]);
        assert_eq!(uidata.featured, vec![true, false]);
    }

    #[test]
    fn long_names_are_truncated() {
        let config = CTConfig::default().with_max_column_width(12);
        let model = model_with(config, vec![College::named("A very long college name")]);
        let name = &model.get_uidata().table[0];
        assert_eq!(name.width, 12);
        assert_eq!(name.data[0], "A very l...");
    }

    #[test]
    fn resize_changes_the_body() {
        let mut model = model_with(CTConfig::default(), numbered(25));
        model.update(Some(Message::Resize(80, 8)));
        assert_eq!(model.get_uidata().layout.table_height, 4);
        assert_eq!(model.get_uidata().table[0].data.len(), 4);
    }

    #[test]
    fn help_popup() {
        let mut model = model_with(CTConfig::default(), alpha_beta());
        model.update(Some(Message::Help));
        assert!(model.get_uidata().show_popup);
        model.update(Some(Message::MoveDown));
        assert_eq!(model.get_uidata().abs_selected_row, 0);
        model.update(Some(Message::Exit));
        assert!(!model.get_uidata().show_popup);
    }

    #[test]
    fn rows_as_csv() {
        let mut records = alpha_beta();
        records[0].name = Some("Alpha, \"The\" Institute".into());
        let model = model_with(CTConfig::default(), records);
        assert_eq!(
            model.row_as_csv(0),
            "\"Alpha, \"\"The\"\" Institute\",,100,,,No"
        );
        assert_eq!(model.row_as_csv(1), "Beta,,50,,,No");
    }
}

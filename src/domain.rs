use std::io::Error;

use clap::ValueEnum;
use derive_setters::Setters;
use ratatui::crossterm::event::KeyEvent;

pub const HELP_TEXT: &str = "\
Navigation
  ↑/k ↓/j          move row up / down
  ←/h →/l          move column left / right
  PgUp PgDown      move a screen up / down
  Home/g End/G     jump to first / last loaded row
  mouse wheel      scroll, loads the next page at the bottom

Search & sort
  /                edit the search query (live)
  Enter            (while searching) apply the search, back to page 1
  Esc              (while searching) clear the query
  b                press the search / clear button
  s Enter          sort by the selected column
  1-5              sort by column N
  click header     sort by that column

Other
  y / Y            copy cell / row to clipboard
  Esc              dismiss notification, close popup
  ?                this help
  q                quit";

// Errors that can happen while setting up the table. Once running, nothing fails.
#[derive(Debug)]
pub enum CTError {
    IoError(Error),
    JsonError(serde_json::Error),
    LoadingFailed(String),
    FileNotFound,
    PermissionDenied,
    UnknownFileType,
}

impl From<Error> for CTError {
    fn from(err: Error) -> Self {
        CTError::IoError(err)
    }
}

impl From<serde_json::Error> for CTError {
    fn from(err: serde_json::Error) -> Self {
        CTError::JsonError(err)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    MovePageUp,
    MovePageDown,
    MoveBeginning,
    MoveEnd,
    ScrollUp(usize),
    ScrollDown(usize),
    Click(u16, u16),
    SortCurrentColumn,
    SortColumn(usize),
    Search,
    SearchButton,
    CopyCell,
    CopyRow,
    Help,
    Exit,
    Resize(usize, usize),
    RawKey(KeyEvent),
}

/// Which columns the table shows next to name, rating, fees and user review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColumnLayout {
    /// A Yes/No "Featured" column
    #[default]
    Featured,
    /// A "Ranking" column, featured colleges get an inline badge
    Ranked,
}

/// Behaviour of the button next to the search input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SearchButton {
    /// Applies the query and jumps back to the first page
    #[default]
    Search,
    /// Clears a non empty query
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollegeField {
    Name,
    CollegeduniaRating,
    Fees,
    UserReviewRating,
    Ranking,
    Featured,
}

impl CollegeField {
    pub fn label(&self) -> &'static str {
        match self {
            CollegeField::Name => "College Name",
            CollegeField::CollegeduniaRating => "Rating",
            CollegeField::Fees => "Fees",
            CollegeField::UserReviewRating => "User Review",
            CollegeField::Ranking => "Ranking",
            CollegeField::Featured => "Featured",
        }
    }

    pub fn is_sortable(&self) -> bool {
        !matches!(self, CollegeField::Featured)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortConfig {
    pub key: Option<CollegeField>,
    pub direction: SortDirection,
}

impl SortConfig {
    /// Sort config after a click on the header of `key`.
    /// The same key flips ascending to descending, everything else starts ascending.
    pub fn toggled(&self, key: CollegeField) -> SortConfig {
        let direction = if self.key == Some(key) && self.direction == SortDirection::Ascending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        SortConfig {
            key: Some(key),
            direction,
        }
    }

    pub fn indicator(&self, key: CollegeField) -> &'static str {
        match (self.key == Some(key), self.direction) {
            (true, SortDirection::Descending) => " ▼",
            _ => " ▲",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Toast {
            message: message.into(),
            kind: ToastKind::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Toast {
            message: message.into(),
            kind: ToastKind::Error,
        }
    }
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct CTConfig {
    pub event_poll_time: u64,
    pub items_per_page: usize,
    pub max_column_width: usize,
    pub layout: ColumnLayout,
    pub search_button: SearchButton,
    // Auto dismiss of notifications in ms, never if None
    #[setters(strip_option)]
    pub toast_timeout: Option<u64>,
}

impl Default for CTConfig {
    fn default() -> Self {
        CTConfig {
            event_poll_time: 100,
            items_per_page: 10,
            max_column_width: 40,
            layout: ColumnLayout::default(),
            search_button: SearchButton::default(),
            toast_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_same_key_flips_direction() {
        let sort = SortConfig::default().toggled(CollegeField::Fees);
        assert_eq!(sort.key, Some(CollegeField::Fees));
        assert_eq!(sort.direction, SortDirection::Ascending);

        let sort = sort.toggled(CollegeField::Fees);
        assert_eq!(sort.direction, SortDirection::Descending);

        let sort = sort.toggled(CollegeField::Fees);
        assert_eq!(sort.direction, SortDirection::Ascending);
    }

    #[test]
    fn toggling_new_key_resets_to_ascending() {
        let sort = SortConfig::default()
            .toggled(CollegeField::Fees)
            .toggled(CollegeField::Fees);
        assert_eq!(sort.direction, SortDirection::Descending);

        let sort = sort.toggled(CollegeField::Name);
        assert_eq!(sort.key, Some(CollegeField::Name));
        assert_eq!(sort.direction, SortDirection::Ascending);
    }

    #[test]
    fn indicator_defaults_to_up_arrow() {
        let sort = SortConfig::default();
        assert_eq!(sort.indicator(CollegeField::Fees), " ▲");

        let sort = sort.toggled(CollegeField::Fees).toggled(CollegeField::Fees);
        assert_eq!(sort.indicator(CollegeField::Fees), " ▼");
        assert_eq!(sort.indicator(CollegeField::Name), " ▲");
    }

    #[test]
    fn config_setters() {
        let cfg = CTConfig::default()
            .with_items_per_page(20)
            .with_toast_timeout(1500);
        assert_eq!(cfg.items_per_page, 20);
        assert_eq!(cfg.toast_timeout, Some(1500));
        assert_eq!(cfg.event_poll_time, 100);
    }
}

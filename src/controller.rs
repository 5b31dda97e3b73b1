use std::time::Duration;
use tracing::trace;

use crate::domain::{CTConfig, CTError, Message};
use crate::model::Model;
use ratatui::crossterm::event::{
    self, Event, KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

// Lines moved by one step of the mouse wheel
const SCROLL_LINES: usize = 3;

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &CTConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, CTError> {
        if event::poll(Duration::from_millis(self.event_poll_time))? {
            return Ok(self.map_event(model, event::read()?));
        }
        Ok(None)
    }

    fn map_event(&self, model: &Model, event: Event) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
                    trace!("Mapped: {key:?} => Quit");
                    Some(Message::Quit)
                } else if model.raw_keyevents() {
                    Some(Message::RawKey(key))
                } else {
                    self.handle_key(key)
                }
            }
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => Some(Message::Resize(width as usize, height as usize)),
            _ => None,
        }
    }

    fn handle_key(&self, key: event::KeyEvent) -> Option<Message> {
        let message = match (key.code, key.modifiers) {
            (KeyCode::Char('q'), _) => Some(Message::Quit),
            (KeyCode::Down | KeyCode::Char('j'), _) => Some(Message::MoveDown),
            (KeyCode::Up | KeyCode::Char('k'), _) => Some(Message::MoveUp),
            (KeyCode::Left | KeyCode::Char('h'), _) => Some(Message::MoveLeft),
            (KeyCode::Right | KeyCode::Char('l'), _) => Some(Message::MoveRight),
            (KeyCode::PageDown, _) => Some(Message::MovePageDown),
            (KeyCode::PageUp, _) => Some(Message::MovePageUp),
            (KeyCode::Home | KeyCode::Char('g'), _) => Some(Message::MoveBeginning),
            (KeyCode::End | KeyCode::Char('G'), _) => Some(Message::MoveEnd),
            (KeyCode::Enter | KeyCode::Char('s'), _) => Some(Message::SortCurrentColumn),
            (KeyCode::Char(c @ '1'..='9'), _) => c
                .to_digit(10)
                .map(|n| Message::SortColumn(n as usize - 1)),
            (KeyCode::Char('/'), _) => Some(Message::Search),
            (KeyCode::Char('b'), _) => Some(Message::SearchButton),
            (KeyCode::Char('y'), _) => Some(Message::CopyCell),
            (KeyCode::Char('Y'), _) => Some(Message::CopyRow),
            (KeyCode::Char('?'), _) => Some(Message::Help),
            (KeyCode::Esc, _) => Some(Message::Exit),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }

    fn handle_mouse(&self, mouse: MouseEvent) -> Option<Message> {
        let message = match mouse.kind {
            MouseEventKind::ScrollDown => Some(Message::ScrollDown(SCROLL_LINES)),
            MouseEventKind::ScrollUp => Some(Message::ScrollUp(SCROLL_LINES)),
            MouseEventKind::Down(MouseButton::Left) => {
                Some(Message::Click(mouse.column, mouse.row))
            }
            _ => None,
        };
        if message.is_some() {
            trace!("Mapped: {mouse:?} => {message:?}");
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::{KeyEvent, KeyEventKind, KeyEventState};

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn setup() -> (Controller, Model) {
        let cfg = CTConfig::default();
        (Controller::new(&cfg), Model::init(&cfg, 80, 24))
    }

    #[test]
    fn keys_in_table_mode() {
        let (controller, model) = setup();
        assert_eq!(controller.map_event(&model, press(KeyCode::Char('q'))), Some(Message::Quit));
        assert_eq!(controller.map_event(&model, press(KeyCode::Char('j'))), Some(Message::MoveDown));
        assert_eq!(controller.map_event(&model, press(KeyCode::Char('/'))), Some(Message::Search));
        assert_eq!(
            controller.map_event(&model, press(KeyCode::Char('3'))),
            Some(Message::SortColumn(2))
        );
        assert_eq!(controller.map_event(&model, press(KeyCode::Char('x'))), None);
    }

    #[test]
    fn key_releases_are_ignored() {
        let (controller, model) = setup();
        let release = Event::Key(KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });
        assert_eq!(controller.map_event(&model, release), None);
    }

    #[test]
    fn keys_are_passed_raw_while_searching() {
        let (controller, mut model) = setup();
        model.update(Some(Message::Search));
        let key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(
            controller.map_event(&model, Event::Key(key)),
            Some(Message::RawKey(key))
        );
    }

    #[test]
    fn ctrl_c_quits_while_searching() {
        let (controller, mut model) = setup();
        model.update(Some(Message::Search));
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(controller.map_event(&model, ctrl_c.clone()), Some(Message::Quit));

        model.update(Some(Message::Exit));
        assert!(!model.raw_keyevents());
        assert_eq!(controller.map_event(&model, ctrl_c), Some(Message::Quit));
    }

    #[test]
    fn mouse_and_resize() {
        let (controller, model) = setup();
        assert_eq!(
            controller.map_event(&model, mouse(MouseEventKind::ScrollDown, 3, 7)),
            Some(Message::ScrollDown(SCROLL_LINES))
        );
        assert_eq!(
            controller.map_event(&model, mouse(MouseEventKind::Down(MouseButton::Left), 3, 7)),
            Some(Message::Click(3, 7))
        );
        assert_eq!(
            controller.map_event(&model, mouse(MouseEventKind::Moved, 3, 7)),
            None
        );
        assert_eq!(
            controller.map_event(&model, Event::Resize(100, 40)),
            Some(Message::Resize(100, 40))
        );
    }
}

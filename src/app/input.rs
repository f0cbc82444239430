use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, Message, Model};

use super::event_loop::ResizeDebouncer;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) => Self::handle_key(*key, model),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Resize(w, h) => {
                resize_debouncer.queue(*w, *h, now_ms);
                None
            }
            _ => None,
        }
    }

    /// Input that counts as user activity for the auto-hide timer.
    pub(super) const fn is_activity(event: &Event) -> bool {
        matches!(
            event,
            Event::Key(_) | Event::Mouse(_) | Event::FocusGained
        )
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c' | 'q'))
        {
            return Some(Message::Quit);
        }

        if model.help_visible {
            return match key.code {
                KeyCode::Char('q') => Some(Message::Quit),
                KeyCode::Char('?') | KeyCode::F(1) | KeyCode::Esc | KeyCode::Enter => {
                    Some(Message::HideHelp)
                }
                _ => None,
            };
        }

        let grid = model.navigator.is_grid();
        match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Esc => Some(Message::Escape),
            KeyCode::Char('?') | KeyCode::F(1) => Some(Message::ToggleHelp),

            KeyCode::Right | KeyCode::Char('l' | 'n') | KeyCode::PageDown => Some(Message::Next),
            KeyCode::Left | KeyCode::Char('h' | 'p') | KeyCode::PageUp | KeyCode::Backspace => {
                Some(Message::Previous)
            }
            KeyCode::Down | KeyCode::Char('j') if grid => Some(Message::GridMove(1)),
            KeyCode::Up | KeyCode::Char('k') if grid => Some(Message::GridMove(-1)),
            KeyCode::Down | KeyCode::Char('j') => Some(Message::Next),
            KeyCode::Up | KeyCode::Char('k') => Some(Message::Previous),
            KeyCode::Char(' ') if !grid => Some(Message::Next),
            KeyCode::Enter | KeyCode::Char(' ') if grid => Some(Message::SelectHighlighted),
            KeyCode::Home => Some(Message::First),
            KeyCode::End => Some(Message::Last),
            KeyCode::Char(c @ '1'..='9') => {
                let index = c.to_digit(10).map_or(0, |d| d as usize - 1);
                Some(if grid {
                    Message::SelectInGrid(index)
                } else {
                    Message::GoTo(index)
                })
            }

            KeyCode::Char('g') | KeyCode::Tab => Some(Message::ToggleGrid),
            KeyCode::Char('t') => Some(Message::CycleTheme),
            KeyCode::Char('a') => Some(Message::ToggleAutoHide),
            KeyCode::Char('r' | 'R') => Some(Message::ForceReload),
            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return match mouse.kind {
                MouseEventKind::Up(MouseButton::Left) => Some(Message::HideHelp),
                _ => None,
            };
        }

        let grid = model.navigator.is_grid();
        match mouse.kind {
            MouseEventKind::ScrollDown if grid => Some(Message::GridMove(1)),
            MouseEventKind::ScrollUp if grid => Some(Message::GridMove(-1)),
            MouseEventKind::ScrollDown => Some(Message::Next),
            MouseEventKind::ScrollUp => Some(Message::Previous),
            MouseEventKind::Up(MouseButton::Left) if grid => {
                let body = crate::ui::body_area(model);
                crate::ui::GridLayout::new(body, model.slides.len(), model.navigator.current())
                    .index_at(mouse.column, mouse.row)
                    .map(Message::SelectInGrid)
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let body = crate::ui::body_area(model);
                let third = body.width / 3;
                if mouse.column < body.x + third {
                    Some(Message::Previous)
                } else if mouse.column >= body.x + body.width.saturating_sub(third) {
                    Some(Message::Next)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

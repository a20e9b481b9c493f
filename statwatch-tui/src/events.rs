use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{Action, App, Screen};

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event. Returns an action when the feed host must act.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return None;
    }

    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return None;
    }

    match app.screen {
        Screen::SessionExpired => match key.code {
            KeyCode::Char('l') | KeyCode::Enter => Some(Action::SignIn),
            KeyCode::Char('q') | KeyCode::Esc => {
                app.quit();
                None
            }
            _ => None,
        },
        Screen::Dashboard => match key.code {
            KeyCode::Char('q') => {
                app.quit();
                None
            }
            KeyCode::Char('p') => Some(Action::TogglePause),
            KeyCode::Char('o') => Some(Action::SignOut),
            KeyCode::Char('?') => {
                app.toggle_help();
                None
            }
            _ => None,
        },
    }
}

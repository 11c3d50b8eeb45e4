//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] actions and sync requests.  Keys are
//! interpreted per [`Mode`]: normal navigation, URL editing, or a pending
//! y/n confirmation.
//!
//! ## For contributors
//!
//! To add a new keybinding:
//!
//! 1. Add a method on [`App`] for the action (if one doesn't exist).
//! 2. Add a `KeyCode` match arm in the handler for the mode it belongs to.
//! 3. Update the help text in [`crate::ui`]'s status bar.
//! 4. Update the keybindings table in `README.md`.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use tokio::sync::mpsc::UnboundedSender;

use crate::app::{App, Mode};
use crate::sync::SyncRequest;

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent, requests: &UnboundedSender<SyncRequest>) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    match app.mode {
        Mode::Normal => handle_normal(app, key, requests),
        Mode::EditingUrl => handle_edit(app, key, requests),
        Mode::ConfirmDelete => handle_confirm_delete(app, key, requests),
        Mode::ConfirmPromote => handle_confirm_promote(app, key, requests),
    }
}

/// The coordinator is gone only during teardown; dropping a request then is
/// harmless.
fn submit(requests: &UnboundedSender<SyncRequest>, request: SyncRequest) {
    let _ = requests.send(request);
}

fn handle_normal(app: &mut App, key: KeyEvent, requests: &UnboundedSender<SyncRequest>) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Tab => app.switch_pane(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Char('r') => {
            app.status = "Refreshing…".into();
            submit(requests, SyncRequest::Refresh);
        }
        KeyCode::Char('s') => app.toggle_sort(),
        KeyCode::Char('a') => app.mode = Mode::EditingUrl,
        KeyCode::Char('d') => {
            if let Some(target) = app.selected_site() {
                app.pending_delete = Some(target);
                app.mode = Mode::ConfirmDelete;
            }
        }
        KeyCode::Char('p') => app.mode = Mode::ConfirmPromote,
        KeyCode::Char('o') => open_selected(app),
        _ => {}
    }
}

fn handle_edit(app: &mut App, key: KeyEvent, requests: &UnboundedSender<SyncRequest>) {
    match key.code {
        // Leave the draft in place: a failed submit can be corrected later.
        KeyCode::Esc => app.mode = Mode::Normal,
        KeyCode::Enter => {
            let url = app.draft.trim().to_string();
            if !url.is_empty() {
                app.status = format!("Adding {url}");
                submit(requests, SyncRequest::AddPending { url });
            }
            app.mode = Mode::Normal;
        }
        KeyCode::Backspace => {
            app.draft.pop();
        }
        KeyCode::Char(c) => app.draft.push(c),
        _ => {}
    }
}

fn handle_confirm_delete(app: &mut App, key: KeyEvent, requests: &UnboundedSender<SyncRequest>) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            if let Some(target) = app.pending_delete.take() {
                app.status = format!("Deleting {}", target.url);
                submit(
                    requests,
                    SyncRequest::Delete {
                        category: target.category,
                        url: target.url,
                    },
                );
            }
            app.mode = Mode::Normal;
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.pending_delete = None;
            app.status = "Delete cancelled".into();
            app.mode = Mode::Normal;
        }
        _ => {}
    }
}

fn handle_confirm_promote(app: &mut App, key: KeyEvent, requests: &UnboundedSender<SyncRequest>) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            app.status = "Promoting all pending sites".into();
            submit(requests, SyncRequest::PromoteAll);
            app.mode = Mode::Normal;
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.status = "Promote cancelled".into();
            app.mode = Mode::Normal;
        }
        _ => {}
    }
}

fn open_selected(app: &mut App) {
    if let Some(target) = app.selected_site() {
        match open::that(&target.url) {
            Ok(()) => app.status = format!("Opened {}", target.url),
            Err(err) => app.status = format!("Could not open {}: {err}", target.url),
        }
    }
}

use std::path::PathBuf;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crate::app::{App, InputMode};
use crate::tui::AppEvent;

const SCROLL_STEP: u16 = 3;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key).await?,
        AppEvent::Paste(text) if app.notice.is_none() => {
            // Single-line input: newlines in pasted text become spaces
            for c in text.chars() {
                insert_char(app, if c == '\n' || c == '\r' { ' ' } else { c });
            }
        }
        AppEvent::Paste(_) => {}
        AppEvent::ScrollUp => app.scroll_up(SCROLL_STEP),
        AppEvent::ScrollDown => app.scroll_down(SCROLL_STEP),
        AppEvent::Tick => {
            app.tick_animation();
            app.poll_solve_task().await;
        }
    }
    Ok(())
}

async fn handle_key(app: &mut App, key: KeyEvent) -> Result<()> {
    // Global keys that work in any mode
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => {
                app.should_quit = true;
                return Ok(());
            }
            KeyCode::Char('l') => {
                app.clear_chat();
                return Ok(());
            }
            KeyCode::Char('o') if app.input_enabled() => {
                app.input_mode = InputMode::ImagePath;
                app.set_input("");
                return Ok(());
            }
            KeyCode::Char('e') => {
                app.input_mode = InputMode::ExportPath;
                let default_path = app.export_path.display().to_string();
                app.set_input(&default_path);
                return Ok(());
            }
            // Unbound chords never reach the input line
            _ => return Ok(()),
        }
    }

    // An open notice swallows keys until it is dismissed
    if app.notice.is_some() {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char(' ')) {
            app.dismiss_notice();
        }
        return Ok(());
    }

    match key.code {
        KeyCode::Esc => {
            if app.input_mode != InputMode::Problem {
                app.input_mode = InputMode::Problem;
                app.set_input("");
            }
        }
        KeyCode::Enter => submit(app).await,
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(app.chat_height.max(1)),
        KeyCode::PageDown => app.scroll_down(app.chat_height.max(1)),
        KeyCode::Backspace => {
            if app.cursor > 0 {
                app.cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.cursor = (app.cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.cursor = 0;
        }
        KeyCode::End => {
            app.cursor = app.input.chars().count();
        }
        KeyCode::Char(c) => insert_char(app, c),
        _ => {}
    }
    Ok(())
}

async fn submit(app: &mut App) {
    match app.input_mode {
        InputMode::Problem => app.submit_problem(),
        InputMode::ImagePath => {
            let path = expand_path(app.take_input().trim());
            app.input_mode = InputMode::Problem;
            if let Some(path) = path {
                app.attach_image(&path).await;
            }
        }
        InputMode::ExportPath => {
            let path = expand_path(app.take_input().trim());
            app.input_mode = InputMode::Problem;
            if let Some(path) = path {
                app.export_chat(&path);
            }
        }
    }
}

fn insert_char(app: &mut App, c: char) {
    // Typing a problem is blocked while the model is working
    if app.input_mode == InputMode::Problem && !app.input_enabled() {
        return;
    }
    let byte_pos = char_to_byte_index(&app.input, app.cursor);
    app.input.insert(byte_pos, c);
    app.cursor += 1;
}

/// Resolve a typed path, expanding a leading `~`.
fn expand_path(raw: &str) -> Option<PathBuf> {
    let raw = raw.trim_matches(|c: char| c == '"' || c == '\'');
    if raw.is_empty() {
        return None;
    }
    if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return Some(home.join(rest));
        }
    }
    Some(PathBuf::from(raw))
}

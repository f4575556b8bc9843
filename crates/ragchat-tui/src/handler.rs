use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{App, FocusPane, InputMode};
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key).await?,
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize | AppEvent::Refresh => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
    }
    Ok(())
}

async fn handle_key(app: &mut App, key: KeyEvent) -> Result<()> {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return Ok(());
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key).await,
    }

    Ok(())
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        KeyCode::Tab => app.toggle_focus(),

        // Start typing in whichever field has focus
        KeyCode::Char('i') | KeyCode::Enter => {
            app.input_mode = InputMode::Editing;
            app.focused_input().end();
        }

        // Half-page scroll (must be before plain 'u' to match first)
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_down(half_page(app));
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_up(half_page(app));
        }

        // Jump straight to the upload field
        KeyCode::Char('u') => {
            app.focus = FocusPane::Upload;
            app.input_mode = InputMode::Editing;
            app.focused_input().end();
        }

        // Transcript scrolling
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(1),
        KeyCode::PageDown => app.scroll_down(half_page(app)),
        KeyCode::PageUp => app.scroll_up(half_page(app)),
        KeyCode::Char('g') => app.scroll_to_top(),
        KeyCode::Char('G') => app.scroll_to_bottom(),

        _ => {}
    }
}

async fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Tab => app.toggle_focus(),
        KeyCode::Enter => match app.focus {
            FocusPane::Query => app.submit_query(),
            FocusPane::Upload => app.submit_upload().await,
        },
        KeyCode::PageDown => app.scroll_down(half_page(app)),
        KeyCode::PageUp => app.scroll_up(half_page(app)),
        KeyCode::Backspace => app.focused_input().backspace(),
        KeyCode::Delete => app.focused_input().delete(),
        KeyCode::Left => app.focused_input().left(),
        KeyCode::Right => app.focused_input().right(),
        KeyCode::Home => app.focused_input().home(),
        KeyCode::End => app.focused_input().end(),
        KeyCode::Char(c) => {
            // Typing a new path dismisses the last complaint about it
            if app.focus == FocusPane::Upload {
                app.notice = None;
            }
            app.focused_input().insert(c);
        }
        _ => {}
    }
}

fn half_page(app: &App) -> u16 {
    (app.chat_height / 2).max(1)
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_down(3),
        MouseEventKind::ScrollUp => app.scroll_up(3),
        _ => {}
    }
}

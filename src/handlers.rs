use crate::app::{App, Focus};
use crate::scan::ScanEvent;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub(crate) fn handle_scan_event(app: &mut App, event: ScanEvent) {
    app.commit_scan(event);
}

pub(crate) fn handle_key_event(app: &mut App, key: KeyEvent) {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
            app.cancel();
            return;
        }
        (KeyCode::Char('s'), KeyModifiers::CONTROL) => {
            app.select();
            return;
        }
        _ => {}
    }

    match app.focus {
        Focus::List => handle_list_key(app, key),
        Focus::Input => handle_input_key(app, key),
    }
    app.process_navigation_events();
}

fn handle_list_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.cancel(),
        KeyCode::Tab | KeyCode::Char('i') => app.focus = app.focus.next(),
        KeyCode::Char('j') | KeyCode::Down => app.engine.highlight_next(),
        KeyCode::Char('k') | KeyCode::Up => app.engine.highlight_prev(),
        KeyCode::Home | KeyCode::Char('g') => app.engine.highlight(0),
        KeyCode::End | KeyCode::Char('G') => {
            let len = app.engine.visible_entries().len();
            if len > 0 {
                app.engine.highlight(len - 1);
            }
        }
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => app.engine.pick_highlighted(),
        KeyCode::Backspace | KeyCode::Char('h') | KeyCode::Left => {
            app.engine.navigate_up();
        }
        KeyCode::Char('.') => {
            app.engine.toggle_hidden();
            let state = if app.engine.options().show_hidden {
                "shown"
            } else {
                "hidden"
            };
            app.log(format!("hidden entries {state}"));
        }
        KeyCode::Char('s') => {
            let sort = !app.engine.options().sort;
            app.engine.set_sort_enabled(sort);
            app.log(format!("sorting {}", if sort { "on" } else { "off" }));
        }
        KeyCode::Char('f') => app.cycle_filter(),
        KeyCode::Char('d') if app.workflow.kind().shows_files() => {
            let show_files = !app.engine.options().show_files;
            app.engine.set_show_files(show_files);
            let view = if show_files { "all entries" } else { "directories only" };
            app.log(format!("showing {view}"));
        }
        _ => {}
    }
}

fn handle_input_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit(),
        KeyCode::Tab => {
            if !app.accept_suggestion() {
                app.focus = app.focus.next();
            }
        }
        KeyCode::Right if app.suggestion().is_some() => {
            app.accept_suggestion();
        }
        KeyCode::Up | KeyCode::Down => app.focus = Focus::List,
        KeyCode::Backspace => app.pop_input(),
        KeyCode::Char(ch)
            if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
        {
            app.push_input(ch);
        }
        _ => {}
    }
}

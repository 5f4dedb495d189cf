use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy)]
pub(crate) enum Action {
    None,
    Quit,
    /// Force a fetch through `provider.refresh`(...)
    ForceRefresh,
}

pub(crate) fn handle_key_event(key: KeyEvent) -> Action {
    use KeyCode::Char;

    // Global quit shortcuts
    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }
    if key.code == Char('q') && key.modifiers.is_empty() {
        return Action::Quit;
    }

    match key.code {
        Char('r') | Char('R') => Action::ForceRefresh,
        _ => Action::None,
    }
}

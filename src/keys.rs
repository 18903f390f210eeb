use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// A named action bound to one or more keys, with the label shown in the help bar.
#[derive(Debug)]
pub struct Binding {
    keys: &'static [(KeyCode, KeyModifiers)],
    pub help_key: &'static str,
    pub help: &'static str,
}

impl Binding {
    pub fn matches(&self, key: &KeyEvent) -> bool {
        self.keys
            .iter()
            .any(|(code, mods)| key.code == *code && key.modifiers.contains(*mods))
    }
}

#[derive(Debug)]
pub struct KeyMap {
    pub quit: Binding,
    pub refresh: Binding,
    pub watch: Binding,
    pub live_filter: Binding,
    pub next: Binding,
    pub previous: Binding,
    pub exit: Binding,
}

pub static KEYS: KeyMap = KeyMap {
    quit: Binding {
        keys: &[
            (KeyCode::Char('q'), KeyModifiers::NONE),
            (KeyCode::Char('c'), KeyModifiers::CONTROL),
        ],
        help_key: "q",
        help: "quit",
    },
    refresh: Binding {
        keys: &[(KeyCode::Char('r'), KeyModifiers::NONE)],
        help_key: "r",
        help: "refresh",
    },
    watch: Binding {
        keys: &[
            (KeyCode::Enter, KeyModifiers::NONE),
            (KeyCode::Char('w'), KeyModifiers::NONE),
        ],
        help_key: "↵/w",
        help: "watch",
    },
    live_filter: Binding {
        keys: &[(KeyCode::Char('f'), KeyModifiers::NONE)],
        help_key: "f",
        help: "live only",
    },
    next: Binding {
        keys: &[
            (KeyCode::Down, KeyModifiers::NONE),
            (KeyCode::Char('j'), KeyModifiers::NONE),
        ],
        help_key: "j",
        help: "down",
    },
    previous: Binding {
        keys: &[
            (KeyCode::Up, KeyModifiers::NONE),
            (KeyCode::Char('k'), KeyModifiers::NONE),
        ],
        help_key: "k",
        help: "up",
    },
    exit: Binding {
        keys: &[(KeyCode::Esc, KeyModifiers::NONE)],
        help_key: "esc",
        help: "back to game list",
    },
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_matches_q_and_ctrl_c() {
        assert!(KEYS.quit.matches(&KeyEvent::from(KeyCode::Char('q'))));
        assert!(KEYS
            .quit
            .matches(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!KEYS.quit.matches(&KeyEvent::from(KeyCode::Char('c'))));
    }

    #[test]
    fn test_watch_matches_enter_and_w() {
        assert!(KEYS.watch.matches(&KeyEvent::from(KeyCode::Enter)));
        assert!(KEYS.watch.matches(&KeyEvent::from(KeyCode::Char('w'))));
        assert!(!KEYS.watch.matches(&KeyEvent::from(KeyCode::Esc)));
    }
}

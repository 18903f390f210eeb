use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tracing::{debug, trace};

use crate::config::Config;
use crate::keys::{Binding, KeyMap};
use crate::message::{Command, Message, Screen, Viewport};
use crate::screens::{feed::Feed, game_list::GameList};

/// Owns the active screen and routes every event.
pub struct App {
    keys: &'static KeyMap,
    screen: Screen,
    viewport: Viewport,
    game_list: GameList,
    feed: Feed,
}

impl App {
    pub fn new(keys: &'static KeyMap, config: &Config) -> Self {
        Self {
            keys,
            screen: Screen::GameList,
            viewport: Viewport::default(),
            game_list: GameList::new(keys, config.league.label(), config.date, config.list_refresh),
            feed: Feed::new(keys, config.feed_refresh),
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Commands to run before the first event arrives.
    pub fn init(&mut self) -> Vec<Command> {
        self.game_list.activate()
    }

    pub fn update(&mut self, msg: Message) -> Vec<Command> {
        match msg {
            Message::Resize { width, height } => {
                self.resize(width, height);
                Vec::new()
            }
            Message::Key(key) if self.keys.quit.matches(&key) => vec![Command::Quit],
            Message::Tick { screen, generation } if screen != self.screen => {
                trace!(?screen, generation, "dropping tick for inactive screen");
                Vec::new()
            }
            msg => {
                let target = msg.owner().unwrap_or(self.screen);
                let cmds = match target {
                    Screen::GameList => self.game_list.handle_event(msg),
                    Screen::Feed => self.feed.handle_event(msg),
                };
                self.resolve(cmds)
            }
        }
    }

    pub fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(self.viewport.height.saturating_sub(1)),
                Constraint::Length(1),
            ])
            .split(f.area());

        match self.screen {
            Screen::GameList => self.game_list.render(f, chunks[0]),
            Screen::Feed => self.feed.render(f, chunks[0]),
        }

        f.render_widget(Paragraph::new(self.help_line()), chunks[1]);
    }

    /// Both screens get the new size so switching never shows stale dimensions.
    fn resize(&mut self, width: u16, height: u16) {
        self.viewport = Viewport { width, height };
        // Last row belongs to the help bar.
        let available = Viewport {
            width,
            height: height.saturating_sub(1),
        };
        self.game_list.set_viewport(available);
        self.feed.set_viewport(available);
    }

    /// Applies the navigation signals screens emit and passes the rest on.
    fn resolve(&mut self, cmds: Vec<Command>) -> Vec<Command> {
        let mut out = Vec::with_capacity(cmds.len());

        for cmd in cmds {
            match cmd {
                Command::Watch(game) => {
                    debug!(game = %game.id, matchup = %game.short_name, "switching to feed");
                    self.screen = Screen::Feed;
                    out.extend(self.feed.set_game(game));
                }
                Command::ExitWatch => {
                    debug!("switching to game list");
                    self.screen = Screen::GameList;
                    out.extend(self.game_list.resume());
                }
                other => out.push(other),
            }
        }

        out
    }

    fn help_line(&self) -> Line<'static> {
        let mut bindings: Vec<&Binding> = vec![&self.keys.quit, &self.keys.refresh];
        match self.screen {
            Screen::GameList => bindings.extend(self.game_list.keybinds()),
            Screen::Feed => bindings.extend(self.feed.keybinds()),
        }

        let key_style = Style::default().fg(Color::Gray);
        let desc_style = Style::default().fg(Color::DarkGray);
        let mut spans = Vec::new();
        for (i, binding) in bindings.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" • ", desc_style));
            }
            spans.push(Span::styled(binding.help_key, key_style));
            spans.push(Span::styled(format!(" {}", binding.help), desc_style));
        }
        Line::from(spans)
    }
}

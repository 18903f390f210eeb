use chrono::NaiveDate;
use crossterm::event::KeyEvent;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};
use tracing::{debug, trace, warn};

use crate::data::GatewayError;
use crate::game::{sort_games, GameState, GameSummary};
use crate::keys::{Binding, KeyMap};
use crate::message::{Command, Message, Screen, Viewport};

use super::Refresher;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Status {
    Loading,
    Ready,
    Failed(String),
}

pub struct GameList {
    keys: &'static KeyMap,
    league: &'static str,
    date: NaiveDate,
    games: Vec<GameSummary>,
    state: ListState,
    filter_live: bool,
    status: Status,
    refresher: Refresher,
    viewport: Viewport,
}

impl GameList {
    pub fn new(
        keys: &'static KeyMap,
        league: &'static str,
        date: NaiveDate,
        refresh: std::time::Duration,
    ) -> Self {
        let mut state = ListState::default();
        state.select(Some(0));

        Self {
            keys,
            league,
            date,
            games: Vec::new(),
            state,
            filter_live: false,
            status: Status::Loading,
            refresher: Refresher::new(Screen::GameList, refresh),
            viewport: Viewport::default(),
        }
    }

    /// Initial load.
    pub fn activate(&mut self) -> Vec<Command> {
        self.refresh()
    }

    /// Picks the tick chain back up after the feed screen was showing.
    pub fn resume(&mut self) -> Vec<Command> {
        if self.refresher.in_flight() {
            // The outstanding fetch re-arms on completion.
            return Vec::new();
        }
        vec![self.refresher.arm()]
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    #[cfg(test)]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn keybinds(&self) -> Vec<&'static Binding> {
        vec![&self.keys.watch, &self.keys.live_filter]
    }

    pub fn handle_event(&mut self, msg: Message) -> Vec<Command> {
        match msg {
            Message::Key(key) => self.on_key(key),
            Message::Tick { generation, .. } => {
                if self.refresher.is_current(generation) {
                    self.refresh()
                } else {
                    trace!(generation, "ignoring superseded game list tick");
                    Vec::new()
                }
            }
            Message::GamesFetched(result) => self.on_games(result),
            Message::Resize { .. } | Message::PlaysFetched { .. } => Vec::new(),
        }
    }

    pub fn selected_game(&self) -> Option<&GameSummary> {
        let idx = self.state.selected()?;
        self.filtered_games().get(idx).copied()
    }

    pub fn title(&self) -> String {
        match &self.status {
            Status::Loading => "Loading games..".to_string(),
            Status::Ready => format!("{} : {}", self.league, self.date.format("%d %b")),
            Status::Failed(err) => format!("Failed to fetch games: {err}"),
        }
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        let area = Rect {
            height: area.height.min(self.viewport.height),
            ..area
        };

        let items: Vec<ListItem> = self
            .filtered_games()
            .iter()
            .map(|game| {
                let status_color = if game.state == GameState::InProgress {
                    Color::Red
                } else {
                    Color::Gray
                };
                let mut lines = vec![
                    Line::from(Span::styled(
                        game.title(),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        game.description(),
                        Style::default().fg(status_color),
                    )),
                ];
                if let Some(situation) = game.situation() {
                    lines.push(Line::from(Span::styled(
                        situation.to_string(),
                        Style::default().add_modifier(Modifier::DIM),
                    )));
                }
                ListItem::new(lines)
            })
            .collect();

        let title = if self.filter_live {
            format!(" {} (live) ", self.title())
        } else {
            format!(" {} ", self.title())
        };

        let games_list = List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_style(
                Style::default()
                    .add_modifier(Modifier::BOLD)
                    .bg(Color::DarkGray)
                    .fg(Color::White),
            );

        f.render_stateful_widget(games_list, area, &mut self.state);
    }

    fn on_key(&mut self, key: KeyEvent) -> Vec<Command> {
        if self.keys.refresh.matches(&key) {
            return self.refresh();
        }
        if self.keys.watch.matches(&key) {
            return self
                .selected_game()
                .map(|game| vec![Command::Watch(game.clone())])
                .unwrap_or_default();
        }

        if self.keys.next.matches(&key) {
            self.next();
        } else if self.keys.previous.matches(&key) {
            self.previous();
        } else if self.keys.live_filter.matches(&key) {
            self.toggle_live_filter();
        }
        Vec::new()
    }

    fn refresh(&mut self) -> Vec<Command> {
        if !self.refresher.begin() {
            trace!("game list refresh already in flight");
            return Vec::new();
        }
        debug!(date = %self.date, "fetching games");
        vec![Command::FetchGames { date: self.date }]
    }

    fn on_games(&mut self, result: Result<Vec<GameSummary>, GatewayError>) -> Vec<Command> {
        self.refresher.complete();

        match result {
            Ok(mut games) => {
                debug!(count = games.len(), "games refreshed");
                sort_games(&mut games);
                self.games = games;
                self.status = Status::Ready;
                self.clamp_selection();
            }
            Err(err) => {
                warn!(error = %err, "failed to fetch games");
                self.status = Status::Failed(err.to_string());
            }
        }

        vec![self.refresher.arm()]
    }

    fn next(&mut self) {
        let len = self.filtered_games().len();
        if len == 0 {
            return;
        }

        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    fn previous(&mut self) {
        let len = self.filtered_games().len();
        if len == 0 {
            return;
        }

        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    fn toggle_live_filter(&mut self) {
        self.filter_live = !self.filter_live;
        self.state.select(Some(0));
    }

    fn clamp_selection(&mut self) {
        let len = self.filtered_games().len();
        if self.state.selected().map_or(true, |i| i >= len) {
            self.state.select(Some(0));
        }
    }

    fn filtered_games(&self) -> Vec<&GameSummary> {
        if !self.filter_live {
            self.games.iter().collect()
        } else {
            self.games
                .iter()
                .filter(|g| g.state == GameState::InProgress)
                .collect()
        }
    }
}

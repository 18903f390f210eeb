use std::time::Duration;

use crossterm::event::KeyEvent;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tracing::{debug, trace, warn};

use crate::data::GatewayError;
use crate::game::{GameSummary, PlayEntry};
use crate::keys::{Binding, KeyMap};
use crate::message::{Command, Message, Screen, Viewport};
use crate::text;

use super::Refresher;

/// Blank line, score line, info line, blank line.
const TITLE_HEIGHT: usize = 4;

pub struct Feed {
    keys: &'static KeyMap,
    game: Option<GameSummary>,
    plays: Vec<PlayEntry>,
    has_initial_data: bool,
    refresher: Refresher,
    viewport: Viewport,
}

impl Feed {
    pub fn new(keys: &'static KeyMap, refresh: Duration) -> Self {
        Self {
            keys,
            game: None,
            plays: Vec::new(),
            has_initial_data: false,
            refresher: Refresher::new(Screen::Feed, refresh),
            viewport: Viewport::default(),
        }
    }

    /// Starts watching `game`, dropping whatever was shown before.
    pub fn set_game(&mut self, game: GameSummary) -> Vec<Command> {
        debug!(game = %game.id, "watching game");
        self.game = Some(game);
        self.plays.clear();
        self.has_initial_data = false;
        self.refresh()
    }

    #[cfg(test)]
    pub fn game(&self) -> Option<&GameSummary> {
        self.game.as_ref()
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    #[cfg(test)]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn keybinds(&self) -> Vec<&'static Binding> {
        vec![&self.keys.exit]
    }

    pub fn handle_event(&mut self, msg: Message) -> Vec<Command> {
        match msg {
            Message::Key(key) => self.on_key(key),
            Message::Tick { generation, .. } => {
                if self.refresher.is_current(generation) {
                    self.refresh()
                } else {
                    trace!(generation, "ignoring superseded feed tick");
                    Vec::new()
                }
            }
            Message::PlaysFetched { game_id, result } => self.on_plays(&game_id, result),
            Message::Resize { .. } | Message::GamesFetched(_) => Vec::new(),
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        f.render_widget(Paragraph::new(self.lines()), area);
    }

    /// The visible text: a title block, then as many of the most recent
    /// plays as fit in the viewport, newest first.
    pub fn lines(&self) -> Vec<Line<'static>> {
        let game = match &self.game {
            Some(game) if self.has_initial_data => game,
            _ => return vec![Line::from("Loading..")],
        };

        let Some(recent) = self.plays.last() else {
            return title_block(
                format!("{} - {}", game.away.abbreviation, game.home.abbreviation),
                format!(
                    "{} at {}, {}",
                    game.away.short_name,
                    game.home.short_name,
                    game.kickoff()
                ),
            );
        };

        let info = if recent.is_end_of_game() {
            "FINAL".to_string()
        } else {
            format!("Q{} | {}", recent.quarter, recent.down_distance())
        };
        let mut lines = title_block(
            format!(
                "{} {} - {} {}",
                game.away.abbreviation, recent.away_score, recent.home_score, game.home.abbreviation
            ),
            info,
        );

        let budget = usize::from(self.viewport.height);
        let mut total = TITLE_HEIGHT;

        for play in self.plays.iter().rev() {
            let play_lines = self.play_lines(play);
            total += play_lines.len();
            if total > budget {
                break;
            }
            lines.extend(play_lines);
        }

        lines
    }

    fn play_lines(&self, play: &PlayEntry) -> Vec<Line<'static>> {
        let stamp = format!("{:0>5} ", play.clock);
        let stamp_width = text::width(&stamp);
        // One cell of right padding after the description.
        let available = usize::from(self.viewport.width).saturating_sub(stamp_width + 1);

        text::wrap(&play.description, available)
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                let prefix = if i == 0 {
                    Span::styled(stamp.clone(), Style::default().add_modifier(Modifier::DIM))
                } else {
                    Span::raw(" ".repeat(stamp_width))
                };
                Line::from(vec![prefix, Span::raw(row)])
            })
            .collect()
    }

    fn on_key(&mut self, key: KeyEvent) -> Vec<Command> {
        if self.keys.refresh.matches(&key) {
            self.refresh()
        } else if self.keys.exit.matches(&key) {
            self.exit()
        } else {
            Vec::new()
        }
    }

    fn refresh(&mut self) -> Vec<Command> {
        let Some(game) = &self.game else {
            return Vec::new();
        };
        if !self.refresher.begin() {
            trace!("feed refresh already in flight");
            return Vec::new();
        }
        debug!(game = %game.id, "fetching plays");
        vec![Command::FetchPlays {
            game_id: game.id.clone(),
        }]
    }

    fn on_plays(
        &mut self,
        game_id: &str,
        result: Result<Vec<PlayEntry>, GatewayError>,
    ) -> Vec<Command> {
        self.refresher.complete();

        let Some(game) = &self.game else {
            trace!(game = game_id, "discarding plays, no game watched");
            return Vec::new();
        };

        if game.id != game_id {
            trace!(game = game_id, watching = %game.id, "discarding plays for previous game");
            if self.has_initial_data {
                return Vec::new();
            }
            return self.refresh();
        }

        match result {
            Ok(plays) => {
                debug!(count = plays.len(), "plays refreshed");
                self.plays = plays;
                self.has_initial_data = true;
            }
            Err(err) => {
                warn!(error = %err, "failed to fetch plays, keeping previous feed");
            }
        }

        vec![self.refresher.arm()]
    }

    fn exit(&mut self) -> Vec<Command> {
        self.game = None;
        self.plays.clear();
        self.has_initial_data = false;
        self.refresher.disarm();

        vec![Command::ExitWatch]
    }
}

fn title_block(score: String, info: String) -> Vec<Line<'static>> {
    vec![
        Line::default(),
        Line::from(Span::styled(
            score,
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .centered(),
        Line::from(info).centered(),
        Line::default(),
    ]
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyCode;
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;
    use crate::game::{TeamSide, END_GAME};
    use crate::keys::KEYS;

    fn feed(width: u16, height: u16) -> Feed {
        let mut feed = Feed::new(&KEYS, Duration::from_secs(600));
        feed.set_viewport(Viewport { width, height });
        feed
    }

    fn game(id: &str) -> GameSummary {
        GameSummary {
            id: id.to_string(),
            away: TeamSide {
                abbreviation: "PIT".to_string(),
                ..Default::default()
            },
            home: TeamSide {
                abbreviation: "ATL".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn play(description: &str) -> PlayEntry {
        PlayEntry {
            description: description.to_string(),
            away_score: 3,
            home_score: 7,
            quarter: 2,
            clock: "4:12".to_string(),
            end_down_distance: "3rd & 5 at PIT 30".to_string(),
            ..Default::default()
        }
    }

    fn fetched(id: &str, plays: Vec<PlayEntry>) -> Message {
        Message::PlaysFetched {
            game_id: id.to_string(),
            result: Ok(plays),
        }
    }

    fn failed(id: &str) -> Message {
        Message::PlaysFetched {
            game_id: id.to_string(),
            result: Err(GatewayError::NoCompetition(id.to_string())),
        }
    }

    fn text(lines: &[Line]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_set_game_fetches_immediately() {
        let mut feed = feed(80, 20);
        assert_eq!(
            feed.set_game(game("1")),
            vec![Command::FetchPlays {
                game_id: "1".to_string()
            }]
        );
        assert_eq!(text(&feed.lines()), vec!["Loading.."]);
    }

    #[test]
    fn test_at_most_one_fetch_in_flight() {
        let mut feed = feed(80, 20);
        feed.set_game(game("1"));
        let r = Message::Key(KeyEvent::from(KeyCode::Char('r')));
        assert!(feed.handle_event(r).is_empty());

        let cmds = feed.handle_event(fetched("1", vec![]));
        assert!(matches!(
            cmds.as_slice(),
            [Command::ScheduleTick { after, screen: Screen::Feed, .. }] if *after == Duration::from_secs(600)
        ));
    }

    #[test]
    fn test_failed_refresh_keeps_previous_plays() {
        let mut feed = feed(80, 20);
        feed.set_game(game("1"));
        feed.handle_event(fetched("1", vec![play("first"), play("second")]));
        let before = text(&feed.lines());

        feed.refresh();
        let cmds = feed.handle_event(failed("1"));

        assert_eq!(feed.plays.len(), 2);
        assert_eq!(text(&feed.lines()), before);
        assert_eq!(cmds.len(), 1);
        assert!(!feed.refresher.in_flight());
    }

    #[test]
    fn test_title_shows_score_and_down_distance() {
        let mut feed = feed(40, 20);
        feed.set_game(game("1"));
        feed.handle_event(fetched("1", vec![play("Kickoff")]));

        let lines = text(&feed.lines());
        assert_eq!(lines[1], "PIT 3 - 7 ATL");
        assert_eq!(lines[2], "Q2 | 3rd & 5 at PIT 30");
        assert_eq!(lines[4], "04:12 Kickoff");
    }

    #[test]
    fn test_title_shows_final_after_end_game() {
        let mut feed = feed(40, 20);
        feed.set_game(game("1"));
        feed.handle_event(fetched("1", vec![play("Kickoff"), play(END_GAME)]));

        let lines = text(&feed.lines());
        assert_eq!(lines[2], "FINAL");
        assert_eq!(lines[4], "04:12 END GAME");
    }

    #[test]
    fn test_no_plays_shows_matchup() {
        let mut watched = game("1");
        watched.away.short_name = "Steelers".to_string();
        watched.home.short_name = "Falcons".to_string();

        let mut feed = feed(40, 20);
        feed.set_game(watched);
        feed.handle_event(fetched("1", vec![]));

        let lines = text(&feed.lines());
        assert_eq!(lines.len(), TITLE_HEIGHT);
        assert_eq!(lines[1], "PIT - ATL");
        assert!(lines[2].starts_with("Steelers at Falcons, "));
    }

    #[test]
    fn test_plays_truncated_to_viewport_newest_first() {
        // 20 wide leaves 13 cells for the description.
        let plays = vec![
            play("oldest"),
            play("one two three four five six seven"), // 3 rows
            play("short"),                       // 1 row
            play("one two three four five"),     // 2 rows
        ];
        let mut feed = feed(20, 8);
        feed.set_game(game("1"));
        feed.handle_event(fetched("1", plays));

        let lines = text(&feed.lines());
        // Title (4) + 2 + 1 fits in 8; the 3-row play would make 10.
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[4], "04:12 one two three");
        assert_eq!(lines[5], "      four five");
        assert_eq!(lines[6], "04:12 short");
    }

    #[test]
    fn test_play_exactly_filling_viewport_is_shown() {
        let mut feed = feed(20, 6);
        feed.set_game(game("1"));
        feed.handle_event(fetched("1", vec![play("a"), play("one two three four five")]));

        assert_eq!(feed.lines().len(), 6);
    }

    #[test]
    fn test_exit_clears_game() {
        let mut feed = feed(40, 20);
        feed.set_game(game("1"));
        feed.handle_event(fetched("1", vec![play("Kickoff")]));

        let cmds = feed.handle_event(Message::Key(KeyEvent::from(KeyCode::Esc)));
        assert_eq!(cmds, vec![Command::ExitWatch]);
        assert!(feed.game().is_none());
        assert!(feed.plays.is_empty());
        assert_eq!(text(&feed.lines()), vec!["Loading.."]);
    }

    #[test]
    fn test_tick_after_exit_is_ignored() {
        let mut feed = feed(40, 20);
        feed.set_game(game("1"));
        let cmds = feed.handle_event(fetched("1", vec![]));
        let Some(Command::ScheduleTick { generation, .. }) = cmds.first() else {
            panic!("expected a tick");
        };
        let generation = *generation;

        feed.handle_event(Message::Key(KeyEvent::from(KeyCode::Esc)));
        let cmds = feed.handle_event(Message::Tick {
            screen: Screen::Feed,
            generation,
        });
        assert!(cmds.is_empty());
    }

    #[test]
    fn test_stale_completion_refetches_for_new_game() {
        let mut feed = feed(40, 20);
        feed.set_game(game("1"));
        feed.handle_event(Message::Key(KeyEvent::from(KeyCode::Esc)));

        // Guard still held by the fetch for game 1.
        assert!(feed.set_game(game("2")).is_empty());

        let cmds = feed.handle_event(fetched("1", vec![play("old")]));
        assert_eq!(
            cmds,
            vec![Command::FetchPlays {
                game_id: "2".to_string()
            }]
        );
        assert!(feed.plays.is_empty());
        assert!(!feed.has_initial_data);
    }

    #[test]
    fn test_render_draws_lines() {
        let mut feed = feed(30, 10);
        feed.set_game(game("1"));
        feed.handle_event(fetched("1", vec![play("Kickoff"), play(END_GAME)]));

        let mut terminal = Terminal::new(TestBackend::new(30, 10)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                feed.render(f, area);
            })
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("FINAL"));
        assert!(text.contains("PIT 3 - 7 ATL"));
    }
}

//! Everything that flows through the event queue, and everything the
//! screens ask the runtime to do in response.

use std::time::Duration;

use chrono::NaiveDate;
use crossterm::event::KeyEvent;

use crate::data::GatewayError;
use crate::game::{GameSummary, PlayEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    GameList,
    Feed,
}

/// Visible terminal area in character cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

#[derive(Debug)]
pub enum Message {
    Key(KeyEvent),
    Resize { width: u16, height: u16 },
    Tick { screen: Screen, generation: u64 },
    GamesFetched(Result<Vec<GameSummary>, GatewayError>),
    PlaysFetched {
        game_id: String,
        result: Result<Vec<PlayEntry>, GatewayError>,
    },
}

impl Message {
    /// Fetch completions name the screen that issued them.
    pub fn owner(&self) -> Option<Screen> {
        match self {
            Message::GamesFetched(_) => Some(Screen::GameList),
            Message::PlaysFetched { .. } => Some(Screen::Feed),
            Message::Key(_) | Message::Resize { .. } | Message::Tick { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    FetchGames { date: NaiveDate },
    FetchPlays { game_id: String },
    ScheduleTick {
        screen: Screen,
        generation: u64,
        after: Duration,
    },
    /// Emitted by the game list; consumed by the coordinator.
    Watch(GameSummary),
    /// Emitted by the feed; consumed by the coordinator.
    ExitWatch,
    Quit,
}

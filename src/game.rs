use chrono::{DateTime, Local, Utc};

/// Description the feed uses for the final play of a game.
pub const END_GAME: &str = "END GAME";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GameState {
    Scheduled,
    InProgress,
    Final,
    #[default]
    Unknown,
}

impl GameState {
    pub fn from_wire(state: &str) -> Self {
        match state {
            "pre" => GameState::Scheduled,
            "in" => GameState::InProgress,
            "post" => GameState::Final,
            _ => GameState::Unknown,
        }
    }

    /// Position in the game list: live games first, finished games last.
    fn rank(self) -> u8 {
        match self {
            GameState::InProgress => 0,
            GameState::Scheduled => 1,
            GameState::Unknown => 2,
            GameState::Final => 3,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamSide {
    pub display_name: String,
    pub short_name: String,
    pub abbreviation: String,
    pub score: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameSummary {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub name: String,
    pub short_name: String,
    pub clock: String,
    pub quarter: u32,
    pub drive: String,
    pub last_play: String,
    pub state: GameState,
    pub home: TeamSide,
    pub away: TeamSide,
}

impl GameSummary {
    /// Kickoff in the viewer's timezone, e.g. `01:25pm`.
    pub fn kickoff(&self) -> String {
        self.start_time
            .with_timezone(&Local)
            .format("%I:%M%P")
            .to_string()
    }

    /// First line of a game list entry.
    pub fn title(&self) -> String {
        if self.name.is_empty() {
            format!("{} at {}", self.away.display_name, self.home.display_name)
        } else {
            self.name.clone()
        }
    }

    /// What is happening on the field right now, if the game is live.
    pub fn situation(&self) -> Option<&str> {
        if self.state != GameState::InProgress {
            return None;
        }
        [&self.last_play, &self.drive]
            .into_iter()
            .find(|text| !text.is_empty())
            .map(String::as_str)
    }

    /// Second line of a game list entry.
    pub fn description(&self) -> String {
        if self.state == GameState::Scheduled {
            return format!("Kickoff @ {}", self.kickoff());
        }

        let time = if self.state == GameState::Final {
            "FINAL   ".to_string()
        } else {
            format!("Q{} {:0>5}", self.quarter, self.clock)
        };

        format!(
            "{} | {:>3} {:>2} - {:<2} {:<3}",
            time, self.away.abbreviation, self.away.score, self.home.score, self.home.abbreviation
        )
    }
}

/// Stable sort by game state. Games sharing a state keep their fetch order.
pub fn sort_games(games: &mut [GameSummary]) {
    games.sort_by_key(|game| game.state.rank());
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayEntry {
    pub description: String,
    pub away_score: u32,
    pub home_score: u32,
    pub quarter: u32,
    pub clock: String,
    pub start_down_distance: String,
    pub end_down_distance: String,
}

impl PlayEntry {
    pub fn is_end_of_game(&self) -> bool {
        self.description == END_GAME
    }

    /// Down and distance after the play. Scoring plays and kickoffs leave
    /// that empty, so fall back to where the play started.
    pub fn down_distance(&self) -> &str {
        if self.end_down_distance.is_empty() {
            &self.start_down_distance
        } else {
            &self.end_down_distance
        }
    }
}

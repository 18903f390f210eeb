pub mod feed;
pub mod game_list;

use std::time::Duration;

use crate::message::{Command, Screen};

/// Per-screen fetch guard and tick chain.
///
/// At most one fetch is in flight at a time. Every armed tick gets a fresh
/// generation, so only the most recently armed tick is acted on and a screen
/// never runs two tick chains at once.
#[derive(Debug)]
pub struct Refresher {
    screen: Screen,
    cadence: Duration,
    in_flight: bool,
    generation: u64,
}

impl Refresher {
    pub fn new(screen: Screen, cadence: Duration) -> Self {
        Self {
            screen,
            cadence,
            in_flight: false,
            generation: 0,
        }
    }

    /// Claims the guard. Returns false if a fetch is already outstanding.
    pub fn begin(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        true
    }

    pub fn complete(&mut self) {
        self.in_flight = false;
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Arms the next tick, superseding any tick still pending.
    pub fn arm(&mut self) -> Command {
        self.generation += 1;
        Command::ScheduleTick {
            screen: self.screen,
            generation: self.generation,
            after: self.cadence,
        }
    }

    /// Orphans any pending tick without arming a new one.
    pub fn disarm(&mut self) {
        self.generation += 1;
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_allows_one_fetch() {
        let mut refresher = Refresher::new(Screen::GameList, Duration::from_secs(60));
        assert!(refresher.begin());
        assert!(!refresher.begin());
        refresher.complete();
        assert!(refresher.begin());
    }

    #[test]
    fn test_arm_supersedes_previous_tick() {
        let mut refresher = Refresher::new(Screen::Feed, Duration::from_secs(600));
        let Command::ScheduleTick { generation: first, .. } = refresher.arm() else {
            panic!("expected a tick");
        };
        assert!(refresher.is_current(first));

        let Command::ScheduleTick {
            generation: second,
            screen,
            after,
        } = refresher.arm()
        else {
            panic!("expected a tick");
        };
        assert!(!refresher.is_current(first));
        assert!(refresher.is_current(second));
        assert_eq!(screen, Screen::Feed);
        assert_eq!(after, Duration::from_secs(600));

        refresher.disarm();
        assert!(!refresher.is_current(second));
    }
}

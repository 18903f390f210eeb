use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::game::{GameState, GameSummary, PlayEntry, TeamSide};
use crate::model::{Competitor, Event, FeedItem, FeedPage, ScoreboardResponse};

/// Items requested per play-feed page.
pub const PAGE_SIZE: u32 = 500;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("event {event} has {count} competitors, expected one home and one away")]
    Competitors { event: String, count: usize },

    #[error("event {0} has no competition")]
    NoCompetition(String),
}

pub struct DataClient {
    client: Client,
    league: String,
}

impl DataClient {
    pub fn new(league: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            league: league.into(),
        })
    }

    pub async fn fetch_scoreboard(&self, date: NaiveDate) -> Result<Vec<GameSummary>, GatewayError> {
        let url = format!(
            "https://site.api.espn.com/apis/site/v2/sports/football/{}/scoreboard?dates={}",
            self.league,
            date.format("%Y%m%d")
        );
        let board: ScoreboardResponse = self.get_json(&url).await?;

        board.events.into_iter().map(summarize).collect()
    }

    pub async fn fetch_plays(&self, game_id: &str) -> Result<Vec<PlayEntry>, GatewayError> {
        collect_feed(|page| self.fetch_feed_page(game_id, page)).await
    }

    pub async fn fetch_feed_page(&self, game_id: &str, page: u32) -> Result<FeedPage, GatewayError> {
        let url = format!(
            "https://sports.core.api.espn.com/v2/sports/football/leagues/{league}/events/{id}/competitions/{id}/plays/?limit={PAGE_SIZE}&page={page}",
            league = self.league,
            id = game_id,
        );
        self.get_json(&url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, GatewayError> {
        debug!(url, "fetching");
        let resp = self.client.get(url).send().await?.error_for_status()?;
        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Walks every page of a play feed in order and flattens the items.
///
/// Pages are requested one at a time so items stay in feed order. Any failed
/// page fails the whole walk; nothing fetched so far is returned.
pub async fn collect_feed<F, Fut>(mut fetch_page: F) -> Result<Vec<PlayEntry>, GatewayError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<FeedPage, GatewayError>>,
{
    let first = fetch_page(1).await?;
    let page_count = first.page_count;
    let mut items = first.items;

    for page in 2..=page_count {
        let next = fetch_page(page).await?;
        items.extend(next.items);
    }

    Ok(items.into_iter().map(play_entry).collect())
}

fn play_entry(item: FeedItem) -> PlayEntry {
    PlayEntry {
        description: item.text,
        away_score: item.away_score,
        home_score: item.home_score,
        quarter: item.period.number,
        clock: item.clock.display_value,
        start_down_distance: item.start.down_distance_text,
        end_down_distance: item.end.down_distance_text,
    }
}

fn summarize(event: Event) -> Result<GameSummary, GatewayError> {
    let Event {
        id,
        date,
        name,
        short_name,
        competitions,
    } = event;

    let comp = competitions
        .into_iter()
        .next()
        .ok_or_else(|| GatewayError::NoCompetition(id.clone()))?;
    let (home, away) = home_away(&id, comp.competitors)?;
    let situation = comp.situation.unwrap_or_default();

    Ok(GameSummary {
        start_time: parse_start(&date),
        name,
        short_name,
        clock: comp.status.display_clock,
        quarter: comp.status.period,
        drive: situation.drive.map(|d| d.description).unwrap_or_default(),
        last_play: situation.last_play.map(|p| p.text).unwrap_or_default(),
        state: GameState::from_wire(&comp.status.type_field.state),
        home: team_side(home),
        away: team_side(away),
        id,
    })
}

/// Splits a competition's competitors into `(home, away)`.
///
/// The scoreboard always lists exactly two competitors; anything else, or a
/// pair without one of each side, is treated as a malformed event.
pub fn home_away(
    event: &str,
    competitors: Vec<Competitor>,
) -> Result<(Competitor, Competitor), GatewayError> {
    let count = competitors.len();
    let bad_pair = || GatewayError::Competitors {
        event: event.to_string(),
        count,
    };

    let [first, second]: [Competitor; 2] = competitors.try_into().map_err(|_| bad_pair())?;
    match (first.home_away.as_str(), second.home_away.as_str()) {
        ("home", "away") => Ok((first, second)),
        ("away", "home") => Ok((second, first)),
        _ => Err(bad_pair()),
    }
}

fn team_side(competitor: Competitor) -> TeamSide {
    TeamSide {
        score: competitor
            .score
            .as_deref()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0),
        display_name: competitor.team.display_name,
        short_name: competitor.team.short_display_name,
        abbreviation: competitor.team.abbreviation,
    }
}

/// Scoreboard dates come as `2024-09-08T17:00Z`; full RFC 3339 is accepted too.
fn parse_start(date: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%MZ")
        .map(|naive| naive.and_utc())
        .or_else(|_| DateTime::parse_from_rfc3339(date).map(|dt| dt.with_timezone(&Utc)))
        .unwrap_or_default()
}

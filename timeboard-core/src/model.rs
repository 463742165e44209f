use serde::{Deserialize, Serialize};

/// One timeline event card. `start`/`end` are the true years, used only to
/// shape the grid; `guess_start`/`guess_end` and `lane` are the player's
/// current placement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub start: i64,
    pub end: i64,
    #[serde(default)]
    pub guess_start: i64,
    #[serde(default = "one")]
    pub guess_end: i64,
    #[serde(default)]
    pub lane: usize,
}

fn one() -> i64 {
    1
}

impl Card {
    /// Guess duration in years, never below one.
    pub fn guess_duration_years(&self) -> i64 {
        (self.guess_end - self.guess_start).max(1)
    }
}

/// Full card set for a round, placed and pooled alike.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    pub cards: Vec<Card>,
}

impl Deck {
    /// Earliest and latest true years across all cards.
    pub fn year_extent(&self) -> Option<(i64, i64)> {
        let mut extent: Option<(i64, i64)> = None;
        for card in &self.cards {
            extent = match extent {
                None => Some((card.start, card.end)),
                Some((lo, hi)) => Some((lo.min(card.start), hi.max(card.end))),
            };
        }
        extent
    }

    pub fn get(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Card> {
        self.cards.iter_mut().find(|c| c.id == id)
    }
}

/// On-disk deck format: board configuration plus the card set. Everything
/// but the axis and the cards has a sensible default so hand-written decks
/// stay short.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckFile {
    pub axis_min: i64,
    pub axis_max: i64,
    #[serde(default = "one_lane")]
    pub lane_count: usize,
    #[serde(default)]
    pub ticks: Vec<i64>,
    /// Ids already placed on the board, in draw order.
    #[serde(default)]
    pub placed: Vec<String>,
    pub cards: Vec<Card>,
}

fn one_lane() -> usize {
    1
}

//! Per-game entry fees and team sizes for the Winter League.
//!
//! A game with no price for a gender is not offered to that gender. Games
//! without an explicit player count are single-player.

use crate::models::Gender;
use rust_decimal::Decimal;
use serde::Serialize;

/// One row of the price table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GamePrice {
    pub name: &'static str,
    pub boys: Option<i64>,
    pub girls: Option<i64>,
    pub boys_players: Option<u32>,
    pub girls_players: Option<u32>,
}

const fn game(
    name: &'static str,
    boys: Option<i64>,
    girls: Option<i64>,
    boys_players: Option<u32>,
    girls_players: Option<u32>,
) -> GamePrice {
    GamePrice {
        name,
        boys,
        girls,
        boys_players,
        girls_players,
    }
}

/// Winter League 2025 price list
pub const GAMES: &[GamePrice] = &[
    game("Cricket", Some(2200), Some(1200), Some(11), Some(5)),
    game("Football", Some(2200), Some(1200), Some(11), Some(6)),
    game("Double Wicket", Some(500), None, Some(2), None),
    game("Badminton Singles", Some(200), Some(200), None, None),
    game("Badminton Doubles", Some(400), Some(200), None, None),
    game("Table Tennis Singles", Some(200), None, None, None),
    game("Table Tennis Doubles", Some(400), Some(400), None, None),
    game("Foosball Doubles", Some(400), Some(400), None, None),
    game("Ludo Singles", Some(150), Some(150), None, None),
    game("Ludo Doubles", Some(300), Some(300), None, None),
    game("Carrom Singles", Some(150), Some(150), None, None),
    game("Carrom Doubles", Some(250), Some(250), None, None),
    game("Darts Singles", Some(150), Some(150), None, None),
    game("Tug of War", Some(1000), Some(600), Some(10), Some(6)),
    game("Jenga", Some(150), Some(150), None, None),
    game("Chess", Some(150), Some(150), None, None),
    game("Arm Wrestling", Some(150), None, None, None),
    game("Pitho Gol Garam", Some(1000), None, Some(6), None),
    game("Uno", Some(100), None, None, None),
    game("Tekken", Some(300), Some(300), None, None),
    game("Fifa", Some(300), Some(300), None, None),
];

impl GamePrice {
    pub fn price_for(&self, gender: Gender) -> Option<Decimal> {
        let price = match gender {
            Gender::Boys => self.boys,
            Gender::Girls => self.girls,
        };
        price.map(|p| Decimal::new(p, 0))
    }

    /// Players per team including the registrant
    pub fn players_for(&self, gender: Gender) -> u32 {
        let players = match gender {
            Gender::Boys => self.boys_players,
            Gender::Girls => self.girls_players,
        };
        players.unwrap_or(1)
    }
}

/// A game as offered to one gender
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOffer {
    pub name: &'static str,
    pub price: Decimal,
    pub players: u32,
}

/// Lookup over a fixed price table
#[derive(Debug, Clone, Copy)]
pub struct PricingCatalog {
    games: &'static [GamePrice],
}

impl Default for PricingCatalog {
    fn default() -> Self {
        Self { games: GAMES }
    }
}

impl PricingCatalog {
    pub fn new(games: &'static [GamePrice]) -> Self {
        Self { games }
    }

    pub fn find(&self, game: &str) -> Option<&GamePrice> {
        self.games.iter().find(|g| g.name == game)
    }

    /// Entry fee for `game`, `None` when the game is not offered to `gender`
    pub fn price_of(&self, game: &str, gender: Gender) -> Option<Decimal> {
        self.find(game).and_then(|g| g.price_for(gender))
    }

    /// Players per team including the registrant; `None` when not offered
    pub fn team_size_of(&self, game: &str, gender: Gender) -> Option<u32> {
        self.find(game)
            .filter(|g| g.price_for(gender).is_some())
            .map(|g| g.players_for(gender))
    }

    pub fn is_team_game(&self, game: &str, gender: Gender) -> bool {
        self.team_size_of(game, gender).is_some_and(|n| n > 1)
    }

    /// Games selectable by `gender`, in table order
    pub fn available_games(&self, gender: Gender) -> Vec<GameOffer> {
        self.games
            .iter()
            .filter_map(|g| {
                g.price_for(gender).map(|price| GameOffer {
                    name: g.name,
                    price,
                    players: g.players_for(gender),
                })
            })
            .collect()
    }

    /// Sum of entry fees, or the first game that is not offered to `gender`
    pub fn total_for<'a, I>(&self, games: I, gender: Gender) -> Result<Decimal, &'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        games.into_iter().try_fold(Decimal::ZERO, |total, game| {
            self.price_of(game, gender)
                .map(|price| total + price)
                .ok_or(game)
        })
    }
}

//! Price table and team-size rules used to accept or reject a submission.

pub mod pricing;
pub mod team;

pub use pricing::{GameOffer, GamePrice, PricingCatalog, GAMES};
pub use team::{TeamCompositionValidator, TeamRequirement};

//! Domain layer: auction value objects and the patience model.

mod board;
mod patience;
mod strategy;

pub use board::{RoundBoard, RoundId, RoundStatus, SharedBoard};
pub use patience::Patience;
pub use strategy::{BidderId, StrategyKind};

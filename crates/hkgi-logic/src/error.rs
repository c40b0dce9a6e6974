//! Errors surfaced to players by game operations.
//!
//! Every operation validates before it mutates, so any of these errors means
//! the stead is exactly as it was before the call.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// A debit asked for more than the stead holds.
    #[error("you can't afford that!")]
    InsufficientFunds,
    /// Out-of-range plot index or a recipe index with no configured recipe.
    #[error("invalid reference: {0}")]
    InvalidReference(String),
    /// The item has no `usable` flag in the manifest.
    #[error("that's not an item you can use!")]
    NotUsable,
    #[error("user not found: {0}")]
    UnknownUser(String),
    #[error("unknown item: {0}")]
    UnknownItem(String),
    #[error("username already taken: {0}")]
    UserExists(String),
    /// The plant has not reached the recipe's minimum level.
    #[error("plant is level {current}, recipe needs level {required}")]
    LevelTooLow { required: u32, current: u32 },
}

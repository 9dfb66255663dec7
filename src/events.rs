//! State-change notifications raised by the core for the UI layer.
//!
//! The core never touches UI widgets; it queues these on the session and the
//! frontend drains them once per frame.

use crate::entities::{Character, ClearStats};

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    /// TITLE → PLAY.
    Started,
    /// Any state → TITLE.
    Restarted,
    CharacterSwapped(Character),
    BossAppeared,
    /// PLAY → WIN, with the stats computed once at the transition.
    Won(ClearStats),
    /// PLAY → LOSE.
    Lost,
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Player roster for track assignment.

use serde::{Deserialize, Serialize};

/// Highest squad number handed out by the default roster. The tracking
/// service draws replacement ids from the same 1..=23 pool.
pub const SQUAD_SIZE: i64 = 23;

/// One assignable player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    pub name: String,
}

impl Player {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A full squad with placeholder names, ids 1 through [`SQUAD_SIZE`].
pub fn default_squad() -> Vec<Player> {
    (1..=SQUAD_SIZE)
        .map(|id| Player::new(id, format!("Player {}", id)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_squad_covers_id_pool() {
        let squad = default_squad();
        assert_eq!(squad.len(), 23);
        assert_eq!(squad.first().map(|p| p.id), Some(1));
        assert_eq!(squad.last().map(|p| p.id), Some(23));
        assert_eq!(squad[9].name, "Player 10");
    }
}

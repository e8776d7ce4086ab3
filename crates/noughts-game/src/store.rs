//! The session store: every game in memory, keyed by id.

use std::collections::HashMap;

use noughts_protocol::{GameId, PlayerId};

use crate::Game;

/// Owns all games and hands out ids.
///
/// Ids are monotonic and never reused, so a stale `gameId` held by a client
/// can't accidentally point at a newer game.
#[derive(Debug)]
pub struct GameStore {
    games: HashMap<GameId, Game>,
    next_id: u64,
}

impl Default for GameStore {
    fn default() -> Self {
        Self {
            games: HashMap::new(),
            next_id: 1,
        }
    }
}

impl GameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the next id.
    pub fn allocate_id(&mut self) -> GameId {
        let id = GameId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn insert(&mut self, game: Game) {
        self.games.insert(game.id(), game);
    }

    pub fn get(&self, id: GameId) -> Option<&Game> {
        self.games.get(&id)
    }

    pub fn get_mut(&mut self, id: GameId) -> Option<&mut Game> {
        self.games.get_mut(&id)
    }

    pub fn remove(&mut self, id: GameId) -> Option<Game> {
        self.games.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Game> {
        self.games.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Game> {
        self.games.values_mut()
    }

    /// The unfinished game `player_id` sits in, if any.
    pub fn active_game_of(&self, player_id: &PlayerId) -> Option<GameId> {
        self.games
            .values()
            .find(|g| g.status().is_active() && g.member(player_id).is_some())
            .map(Game::id)
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use noughts_protocol::Symbol;

    use super::*;
    use crate::Participant;

    #[test]
    fn test_allocate_id_is_monotonic_from_one() {
        let mut store = GameStore::new();
        assert_eq!(store.allocate_id(), GameId(1));
        assert_eq!(store.allocate_id(), GameId(2));
        store.remove(GameId(1));
        assert_eq!(store.allocate_id(), GameId(3));
    }

    #[test]
    fn test_active_game_of_finds_member() {
        let mut store = GameStore::new();
        let id = store.allocate_id();
        let creator = Participant::new(PlayerId::new("a"), Symbol::X, None);
        store.insert(Game::open(id, creator, Instant::now()));

        assert_eq!(store.active_game_of(&PlayerId::new("a")), Some(id));
        assert_eq!(store.active_game_of(&PlayerId::new("b")), None);
        assert_eq!(store.len(), 1);
    }
}

//! The matchmaking queue: a FIFO of players waiting for an opponent.

use std::collections::VecDeque;

use noughts_protocol::PlayerId;
use noughts_transport::ConnectionId;

/// One waiting player and the connection that queued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub player_id: PlayerId,
    pub connection: ConnectionId,
}

/// FIFO of waiting players. Front is oldest.
#[derive(Debug, Default)]
pub struct MatchQueue {
    entries: VecDeque<QueueEntry>,
}

impl MatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_back(&mut self, entry: QueueEntry) {
        self.entries.push_back(entry);
    }

    /// Re-queues an entry ahead of everyone else.
    pub fn push_front(&mut self, entry: QueueEntry) {
        self.entries.push_front(entry);
    }

    pub fn pop_front(&mut self) -> Option<QueueEntry> {
        self.entries.pop_front()
    }

    pub fn contains(&self, player_id: &PlayerId) -> bool {
        self.entries.iter().any(|e| &e.player_id == player_id)
    }

    /// Removes a player's entry. Returns `false` if it wasn't queued.
    pub fn remove_player(&mut self, player_id: &PlayerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| &e.player_id != player_id);
        self.entries.len() != before
    }

    /// Removes every entry queued by `connection` and returns how many.
    pub fn remove_connection(&mut self, connection: ConnectionId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.connection != connection);
        before - self.entries.len()
    }

    /// Keeps only the entries for which `keep` returns `true`, preserving
    /// order. Returns how many were dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(&QueueEntry) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| keep(e));
        before - self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueueEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

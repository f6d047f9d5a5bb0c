use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::api::{BookId, ReaderId};

/// Waitlist of readers asking to be told when a title frees up.
/// A reader waits on at most one title at a time across the whole library.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct BioAlert {
    subscribers: BTreeMap<BookId, VecDeque<ReaderId>>,
}

impl BioAlert {
    pub fn is_subscribed(&self, reader_id: ReaderId) -> bool {
        self.subscribers
            .values()
            .any(|queue| queue.contains(&reader_id))
    }

    /// Queues the reader for `book_id`. Does nothing and returns false when
    /// the reader already waits for any title.
    pub fn subscribe(&mut self, reader_id: ReaderId, book_id: BookId) -> bool {
        if self.is_subscribed(reader_id) {
            return false;
        }
        self.subscribers
            .entry(book_id)
            .or_default()
            .push_back(reader_id);
        true
    }

    pub fn unsubscribe(&mut self, reader_id: ReaderId) -> bool {
        let mut removed = false;
        self.subscribers.retain(|_, queue| {
            let before = queue.len();
            queue.retain(|&id| id != reader_id);
            removed |= before != queue.len();
            !queue.is_empty()
        });
        removed
    }

    pub fn next_subscriber(&mut self, book_id: BookId) -> Option<ReaderId> {
        let queue = self.subscribers.get_mut(&book_id)?;
        let next = queue.pop_front();
        if queue.is_empty() {
            self.subscribers.remove(&book_id);
        }
        next
    }

    pub fn subscribers(&self, book_id: BookId) -> impl Iterator<Item = ReaderId> + '_ {
        self.subscribers
            .get(&book_id)
            .into_iter()
            .flat_map(|queue| queue.iter().copied())
    }
}

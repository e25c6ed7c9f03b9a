// Design:
//
// The cache is searched linearly, in an attempt to improve the performance by
// better using the CPU cache.
//
// To fit more elements in a cache line, we generate a 32 bit hash from the
// SQL query.
//
// A statement is taken out of the cache while in use and put back once it has
// been reset, so a cached statement has at most one execution in flight.

use crate::raw::RawStatement;
use rustc_hash::FxHasher;
use std::{
    collections::VecDeque,
    hash::{Hash, Hasher},
};

#[cfg(test)]
mod tests;

/// Prepared statement cache, keyed by the exact SQL text.
pub(crate) struct StatementCache<S = RawStatement> {
    /// Statement cache.
    ///
    /// Most recently used statements are at the front.
    cache: VecDeque<(S, Box<str>)>,

    /// Stores the hashes for the statement cache sequentially. Speeds up
    /// linear search.
    hash: VecDeque<u32>,

    /// Maximum size of the statement cache.
    capacity: usize,
}

impl<S> StatementCache<S> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            cache: VecDeque::with_capacity(capacity),
            hash: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.cache.len()
    }

    /// Drops every cached statement.
    pub(crate) fn clear(&mut self) {
        self.cache.clear();
        self.hash.clear();
    }

    /// Puts a statement back, evicting the least recently used one if the
    /// cache is full.
    pub(crate) fn insert(&mut self, sql: &str, v: S) {
        if self.capacity == 0 {
            return;
        }

        while self.cache.len() >= self.capacity {
            self.cache.pop_back();
            self.hash.pop_back();
        }

        self.hash.push_front(sql_hash(sql));

        self.cache.push_front((v, sql.into()));
    }

    /// Removes the statement prepared from `sql`, if cached.
    pub(crate) fn take(&mut self, sql: &str) -> Option<S> {
        let sql_hash = sql_hash(sql);

        for (i, (hash, cached)) in self.hash.iter().zip(self.cache.iter()).enumerate() {
            if *hash != sql_hash {
                continue;
            }

            if *sql != *cached.1 {
                continue;
            }

            self.hash.remove(i);
            return self.cache.remove(i).map(|(statement, _)| statement);
        }

        None
    }
}

#[inline]
fn sql_hash(sql: &str) -> u32 {
    let mut hasher = FxHasher::default();
    sql.hash(&mut hasher);
    hasher.finish() as u32
}

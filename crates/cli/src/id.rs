//! Short task id generation
//!
//! Ids are six lowercase alphanumeric characters derived from a SHA-256
//! digest of the task name and a random nonce. The first character is always
//! a letter so ids read as SurrealDB record keys without escaping.

use sha2::{Digest, Sha256};

const ID_LENGTH: usize = 6;

/// Attempts before giving up on finding a free id
pub const MAX_ATTEMPTS: usize = 16;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Yields candidate ids for one task, at most [`MAX_ATTEMPTS`] of them
pub struct IdGenerator {
    seed: String,
    attempts: usize,
}

impl IdGenerator {
    /// Create a generator seeded with the task name
    pub fn new(seed: &str) -> Self {
        Self {
            seed: seed.to_string(),
            attempts: 0,
        }
    }

    /// Next candidate id, or None once attempts are exhausted
    pub fn next_id(&mut self) -> Option<String> {
        if self.attempts >= MAX_ATTEMPTS {
            return None;
        }
        self.attempts += 1;

        let nonce: u64 = rand::random();
        let mut hasher = Sha256::new();
        hasher.update(self.seed.as_bytes());
        hasher.update(nonce.to_le_bytes());
        let digest = hasher.finalize();

        let id = digest
            .iter()
            .take(ID_LENGTH)
            .enumerate()
            .map(|(i, byte)| {
                let alphabet = if i == 0 { LETTERS } else { ALPHANUMERIC };
                alphabet[*byte as usize % alphabet.len()] as char
            })
            .collect();
        Some(id)
    }
}

//! Resource key generation.
//!
//! Keys look like `prefix_suffix`: a 1-4 character prefix starting with a
//! lowercase letter, and a 2-8 character suffix of letters and digits. The
//! characters come from the blake3 output stream of the text and an attempt
//! counter, so the same text against the same set of taken keys always gets
//! the same key. A collision bumps the attempt counter.

use std::collections::HashSet;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const PREFIX_TAIL: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789_";

/// Bytes drawn from a blake3 extendable output.
struct Draw {
    reader: blake3::OutputReader,
}

impl Draw {
    fn new(text: &str, attempt: u64) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(text.as_bytes());
        hasher.update(&attempt.to_le_bytes());
        Self {
            reader: hasher.finalize_xof(),
        }
    }

    fn byte(&mut self) -> u8 {
        let mut byte = [0u8; 1];
        self.reader.fill(&mut byte);
        byte[0]
    }

    fn pick(&mut self, alphabet: &[u8]) -> char {
        alphabet[self.byte() as usize % alphabet.len()] as char
    }

    fn between(&mut self, low: usize, high: usize) -> usize {
        low + self.byte() as usize % (high - low + 1)
    }
}

fn candidate(text: &str, attempt: u64) -> String {
    let mut draw = Draw::new(text, attempt);

    let prefix_len = draw.between(1, 4);
    let mut prefix = String::with_capacity(prefix_len);
    prefix.push(draw.pick(LETTERS));
    for _ in 1..prefix_len {
        let alphabet = if prefix.ends_with('_') {
            &PREFIX_TAIL[..PREFIX_TAIL.len() - 1]
        } else {
            PREFIX_TAIL
        };
        prefix.push(draw.pick(alphabet));
    }
    if prefix.ends_with('_') {
        prefix.pop();
        prefix.push(draw.pick(&PREFIX_TAIL[..PREFIX_TAIL.len() - 1]));
    }

    let suffix_len = draw.between(2, 8);
    let suffix: String = (0..suffix_len)
        .map(|_| {
            if draw.byte() % 2 == 0 {
                draw.pick(LETTERS)
            } else {
                draw.pick(DIGITS)
            }
        })
        .collect();

    format!("{}_{}", prefix, suffix)
}

/// Generates keys that are unique against a set of taken keys.
#[derive(Debug, Clone, Default)]
pub struct KeyGenerator {
    taken: HashSet<String>,
}

impl KeyGenerator {
    pub fn new(taken: HashSet<String>) -> Self {
        Self { taken }
    }

    /// New key for `text`; the key is taken from then on.
    pub fn generate(&mut self, text: &str) -> String {
        let mut attempt = 0u64;
        loop {
            let key = candidate(text, attempt);
            if self.taken.insert(key.clone()) {
                return key;
            }
            tracing::trace!(key = %key, attempt, "key collision");
            attempt += 1;
        }
    }
}

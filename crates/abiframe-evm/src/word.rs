//! Word Stream: a hex payload viewed as 32-byte slots plus a spent mask.
//!
//! The stream borrows the row's hex string; words are handed out as `&str`
//! slices of 64 hex digits so addresses and byte strings keep the exact
//! case they were encoded with. A slot is spent once a decoded value has
//! claimed it, and a spent slot can never be claimed again.

use abiframe_core::error::{FieldError, PayloadError};

/// Hex digits per 32-byte word.
pub const WORD_HEX: usize = 64;
/// Bytes per word.
pub const WORD_BYTES: usize = 32;

#[derive(Debug, Clone)]
pub struct WordStream<'a> {
    hex: &'a str,
    spent: Vec<bool>,
}

/// Saved spent mask, used to roll back a failed field.
#[derive(Debug, Clone)]
pub struct SpentSnapshot(Vec<bool>);

impl<'a> WordStream<'a> {
    /// Split a payload (optionally `0x`-prefixed) into words.
    pub fn from_hex(payload: &'a str) -> Result<Self, PayloadError> {
        let hex = payload.strip_prefix("0x").unwrap_or(payload);
        if let Some(position) = hex.bytes().position(|b| !b.is_ascii_hexdigit()) {
            return Err(PayloadError::InvalidHex { position });
        }
        if hex.len() % WORD_HEX != 0 {
            return Err(PayloadError::NotWordAligned { len: hex.len() });
        }
        Ok(Self {
            hex,
            spent: vec![false; hex.len() / WORD_HEX],
        })
    }

    pub fn len(&self) -> usize {
        self.spent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spent.is_empty()
    }

    /// The 64 hex digits of word `index`.
    pub fn word(&self, index: usize) -> Result<&'a str, FieldError> {
        if index >= self.len() {
            return Err(FieldError::MalformedOffset(format!(
                "word {index} is past the end of a {}-word payload",
                self.len()
            )));
        }
        let hex = self.hex;
        let start = index * WORD_HEX;
        Ok(&hex[start..start + WORD_HEX])
    }

    pub fn is_spent(&self, index: usize) -> bool {
        self.spent.get(index).copied().unwrap_or(false)
    }

    /// Claim word `index` and return it. Fails if the word is out of range
    /// or was already claimed by another value.
    pub fn consume(&mut self, index: usize) -> Result<&'a str, FieldError> {
        let word = self.word(index)?;
        if self.spent[index] {
            return Err(FieldError::MalformedOffset(format!(
                "word {index} is already claimed by another value"
            )));
        }
        self.spent[index] = true;
        Ok(word)
    }

    /// Claim `count` words starting at `start` and return their hex run.
    pub fn consume_run(&mut self, start: usize, count: usize) -> Result<&'a str, FieldError> {
        let end = start
            .checked_add(count)
            .filter(|end| *end <= self.len())
            .ok_or_else(|| {
                FieldError::MalformedOffset(format!(
                    "{count} words at word {start} run past the end of a {}-word payload",
                    self.len()
                ))
            })?;
        if let Some(i) = (start..end).find(|i| self.spent[*i]) {
            return Err(FieldError::MalformedOffset(format!(
                "word {i} is already claimed by another value"
            )));
        }
        self.spent[start..end].iter_mut().for_each(|s| *s = true);
        let hex = self.hex;
        Ok(&hex[start * WORD_HEX..end * WORD_HEX])
    }

    /// Mark words as spent without reading them. Out-of-range indices are ignored.
    pub fn mark_spent(&mut self, start: usize, count: usize) {
        let end = start.saturating_add(count).min(self.len());
        if start < end {
            self.spent[start..end].iter_mut().for_each(|s| *s = true);
        }
    }

    pub fn snapshot(&self) -> SpentSnapshot {
        SpentSnapshot(self.spent.clone())
    }

    pub fn restore(&mut self, snapshot: SpentSnapshot) {
        self.spent = snapshot.0;
    }

    /// Indices of words no value has claimed.
    pub fn unspent(&self) -> impl Iterator<Item = usize> + '_ {
        self.spent
            .iter()
            .enumerate()
            .filter(|(_, s)| !**s)
            .map(|(i, _)| i)
    }
}

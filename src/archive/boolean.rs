use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

const WORD_BITS: usize = u64::BITS as usize;

/// A fixed-length vector of booleans packed 64 to a word.
///
/// Snapshots of management-action state are stored this way, so an archive
/// of thousands of solutions over hundreds of actions stays small.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BooleanArchive {
    words: Vec<u64>,
    len: usize,
}

impl BooleanArchive {
    /// All values start `false`.
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(WORD_BITS)],
            len,
        }
    }

    pub fn from_bools<I: IntoIterator<Item = bool>>(values: I) -> Self {
        let values: Vec<bool> = values.into_iter().collect();
        let mut archive = Self::new(values.len());
        for (index, value) in values.into_iter().enumerate() {
            if value {
                archive.words[index / WORD_BITS] |= 1 << (index % WORD_BITS);
            }
        }
        archive
    }

    /// Number of booleans held.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of `u64` words backing the archive.
    pub fn word_len(&self) -> usize {
        self.words.len()
    }

    pub fn value(&self, index: usize) -> Result<bool> {
        self.check_index(index)?;
        Ok(self.words[index / WORD_BITS] & (1 << (index % WORD_BITS)) != 0)
    }

    pub fn set_value(&mut self, index: usize, value: bool) -> Result<()> {
        self.check_index(index)?;
        let mask = 1 << (index % WORD_BITS);
        let word = &mut self.words[index / WORD_BITS];
        if value {
            *word |= mask;
        } else {
            *word &= !mask;
        }
        Ok(())
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |index| self.words[index / WORD_BITS] & (1 << (index % WORD_BITS)) != 0)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.len {
            Ok(())
        } else {
            Err(Error::InvalidParameter {
                name: "index".into(),
                reason: format!("{index} is outside boolean archive of length {}", self.len),
            })
        }
    }
}

//! Spellcheck pass.
//!
//! Runs independently of the comment cascade: each rendered row is split
//! into maximal ASCII-alphabetic runs and every run missing from the
//! [`Dictionary`] is flagged for underlining.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

/// Case-insensitive word lookup.
pub trait Dictionary: Send + Sync + fmt::Debug {
    fn contains(&self, word: &[u8]) -> bool;
}

/// A dictionary backed by a set of lowercased words.
#[derive(Debug, Default, Clone)]
pub struct WordList {
    words: HashSet<Vec<u8>>,
}

impl WordList {
    /// Build from an iterator of words.
    pub fn from_words<I, W>(words: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: AsRef<[u8]>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim_ascii().to_ascii_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// Load a word list with one word per line.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read.
    pub fn load(path: &Path) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        let list = Self::from_words(bytes.split(|&b| b == b'\n'));
        tracing::debug!(path = %path.display(), words = list.len(), "loaded dictionary");
        Ok(list)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Dictionary for WordList {
    fn contains(&self, word: &[u8]) -> bool {
        self.words.contains(&word.to_ascii_lowercase())
    }
}

/// Mark every rendered byte that belongs to an unknown word.
pub fn spell_mask(render: &[u8], dictionary: &dyn Dictionary) -> Vec<bool> {
    let mut mask = vec![false; render.len()];
    let mut i = 0;
    while i < render.len() {
        if !render[i].is_ascii_alphabetic() {
            i += 1;
            continue;
        }
        let start = i;
        while i < render.len() && render[i].is_ascii_alphabetic() {
            i += 1;
        }
        if !dictionary.contains(&render[start..i]) {
            mask[start..i].fill(true);
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let dict = WordList::from_words(["Hello", "world"]);
        assert!(dict.contains(b"hello"));
        assert!(dict.contains(b"HELLO"));
        assert!(dict.contains(b"World"));
        assert!(!dict.contains(b"worl"));
    }

    #[test]
    fn test_mask_flags_unknown_runs_only() {
        let dict = WordList::from_words(["the", "cat"]);
        let mask = spell_mask(b"the dgo, cat!", &dict);
        assert_eq!(
            mask,
            vec![
                false, false, false, false, true, true, true, false, false, false, false, false,
                false
            ]
        );
    }

    #[test]
    fn test_digits_split_words() {
        let dict = WordList::from_words(["abc", "def"]);
        let mask = spell_mask(b"abc1def", &dict);
        assert!(mask.iter().all(|&bad| !bad));
    }

    #[test]
    fn test_load_skips_blank_lines() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "alpha\r\n\nbeta\n").unwrap();
        let dict = WordList::load(file.path()).unwrap();
        assert_eq!(dict.len(), 2);
        assert!(dict.contains(b"alpha"));
        assert!(dict.contains(b"BETA"));
    }
}

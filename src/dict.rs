//! Sliding string-dictionary window shared by the stream codec.
//!
//! Every cache write occupies the next logical position of a monotonically
//! increasing counter; the backing array is a fixed ring indexed by bitmask,
//! so a position stays resolvable until the counter has advanced a full
//! window past it. Encoder and decoder each own one side of this dictionary
//! per session and advance their counters in lockstep, which is what makes
//! back-reference offsets agree bit-for-bit. Neither side is ever shared
//! between sessions.

use crate::error::{Error, Result};
use crate::{MAX_CACHED_STRING_LEN, STRING_WINDOW_SIZE};
use std::collections::HashMap;

/// Decoder side: the ring of the most recently cached strings.
pub(crate) struct DecodeDict {
    window: Vec<Option<String>>,
    current_id: u64,
}

impl DecodeDict {
    pub fn new() -> Self {
        DecodeDict {
            window: vec![None; STRING_WINDOW_SIZE],
            current_id: 0,
        }
    }

    /// Resolve a back-reference `offset` positions behind the counter,
    /// re-caching the resolved string at the current position to refresh its
    /// recency. Out-of-window and never-populated references are format
    /// errors; stale content must not be substituted silently.
    pub fn resolve(&mut self, offset: u64) -> Result<String> {
        if offset == 0 || offset > self.current_id || offset > STRING_WINDOW_SIZE as u64 {
            return Err(Error::BadBackRef { offset });
        }
        let slot = (self.current_id - offset) as usize & (STRING_WINDOW_SIZE - 1);
        let s = match self.window[slot] {
            Some(ref s) => s.clone(),
            None => return Err(Error::BadBackRef { offset }),
        };
        self.store(s.clone());
        Ok(s)
    }

    /// Cache a freshly decoded literal. Strings of `MAX_CACHED_STRING_LEN`
    /// characters or more are never cached: they would displace useful short
    /// entries and back-references only pay off for frequently repeated
    /// short values.
    pub fn cache(&mut self, s: &str) {
        if s.chars().count() < MAX_CACHED_STRING_LEN {
            self.store(s.to_owned());
        }
    }

    fn store(&mut self, s: String) {
        let slot = self.current_id as usize & (STRING_WINDOW_SIZE - 1);
        self.window[slot] = Some(s);
        self.current_id += 1;
    }
}

/// Encoder side: tracks the last position each short string was cached at,
/// mirroring the decoder's ring so stale entries are dropped as their slot
/// is reclaimed. Memory stays bounded by the window size.
pub(crate) struct EncodeDict {
    last_id: HashMap<String, u64>,
    ring: Vec<Option<String>>,
    current_id: u64,
}

impl EncodeDict {
    pub fn new() -> Self {
        EncodeDict {
            last_id: HashMap::new(),
            ring: vec![None; STRING_WINDOW_SIZE],
            current_id: 0,
        }
    }

    /// Back-reference offset for `s`, if the decoder's window still holds it.
    pub fn offset_of(&self, s: &str) -> Option<u64> {
        let id = *self.last_id.get(s)?;
        let offset = self.current_id - id;
        if offset <= STRING_WINDOW_SIZE as u64 {
            Some(offset)
        } else {
            None
        }
    }

    /// Record that `s` was cached at the current position, exactly as the
    /// decoder will, and advance the counter.
    pub fn touch(&mut self, s: &str) {
        let slot = self.current_id as usize & (STRING_WINDOW_SIZE - 1);
        if let Some(evicted) = self.ring[slot].take() {
            // The slot's previous occupant was cached one full window ago;
            // drop its map entry unless the string was re-cached since.
            let evicted_id = self.current_id - STRING_WINDOW_SIZE as u64;
            if self.last_id.get(&evicted) == Some(&evicted_id) {
                self.last_id.remove(&evicted);
            }
        }
        self.ring[slot] = Some(s.to_owned());
        self.last_id.insert(s.to_owned(), self.current_id);
        self.current_id += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_recent_string() {
        let mut dict = DecodeDict::new();
        dict.cache("first");
        dict.cache("second");
        assert_eq!(dict.resolve(1).unwrap(), "second");
        assert_eq!(dict.resolve(3).unwrap(), "first");
        // The resolve above refreshed "first"; it is now the newest entry.
        assert_eq!(dict.resolve(1).unwrap(), "first");
    }

    #[test]
    fn backref_before_start_is_rejected() {
        let mut dict = DecodeDict::new();
        assert!(matches!(
            dict.resolve(1),
            Err(Error::BadBackRef { offset: 1 })
        ));
        dict.cache("x");
        assert!(dict.resolve(2).is_err());
        assert!(dict.resolve(0).is_err());
    }

    #[test]
    fn backref_past_window_is_rejected() {
        let mut dict = DecodeDict::new();
        for i in 0..2000 {
            dict.cache(&format!("s{}", i));
        }
        assert!(dict.resolve(STRING_WINDOW_SIZE as u64 + 1).is_err());
        assert_eq!(
            dict.resolve(STRING_WINDOW_SIZE as u64).unwrap(),
            format!("s{}", 2000 - STRING_WINDOW_SIZE)
        );
    }

    #[test]
    fn long_strings_are_never_cached() {
        let mut dict = DecodeDict::new();
        let long = "x".repeat(MAX_CACHED_STRING_LEN);
        dict.cache(&long);
        // No position was consumed, so there is nothing to resolve.
        assert!(dict.resolve(1).is_err());

        let just_short = "x".repeat(MAX_CACHED_STRING_LEN - 1);
        dict.cache(&just_short);
        assert_eq!(dict.resolve(1).unwrap(), just_short);
    }

    #[test]
    fn encoder_forgets_evicted_strings() {
        let mut dict = EncodeDict::new();
        dict.touch("early");
        for i in 0..STRING_WINDOW_SIZE {
            dict.touch(&format!("s{}", i));
        }
        assert_eq!(dict.offset_of("early"), None);
        assert_eq!(dict.offset_of("s0"), Some(STRING_WINDOW_SIZE as u64));
        assert_eq!(dict.offset_of("s1023"), Some(1));
    }

    #[test]
    fn encoder_and_decoder_agree_on_offsets() {
        let mut enc = EncodeDict::new();
        let mut dec = DecodeDict::new();
        for s in ["a", "b", "c", "a", "b"] {
            match enc.offset_of(s) {
                Some(offset) => {
                    assert_eq!(dec.resolve(offset).unwrap(), s);
                    enc.touch(s);
                }
                None => {
                    dec.cache(s);
                    enc.touch(s);
                }
            }
        }
    }
}

//! Phonetic keys built on Double Metaphone.
//!
//! Each code produced by [`rphonetic::DoubleMetaphone`] is at most four
//! characters drawn from a fourteen-letter alphabet. Packing one letter per
//! nibble turns a code into a `u16`, so two words that sound alike end up
//! with numerically close keys and the resolver can compare them with a
//! plain subtraction.

use rphonetic::DoubleMetaphone;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Number of code characters that fit in a short key.
pub const SHORT_KEY_LEN: usize = 4;

/// Key assigned to codes containing a letter outside the packing alphabet.
pub const INVALID_KEY: u16 = u16::MAX;

/// Primary and alternate short keys for one word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
pub struct PhoneticKeys {
    /// Key for the most common pronunciation.
    pub primary: u16,
    /// Key for the alternate pronunciation (equals `primary` when there is none).
    pub alternate: u16,
}

impl PhoneticKeys {
    /// Encode `text` into its pair of short keys.
    ///
    /// Non-ASCII characters are dropped first; the metaphone rules only
    /// cover ASCII letters.
    pub fn encode(text: &str) -> Self {
        let ascii: String = text.chars().filter(char::is_ascii).collect();
        let result = DoubleMetaphone::default().double_metaphone(&ascii);
        Self {
            primary: short_key(&result.primary()),
            alternate: short_key(&result.alternate()),
        }
    }

    /// Absolute difference between the primary keys.
    pub const fn primary_distance(&self, other: &Self) -> u16 {
        self.primary.abs_diff(other.primary)
    }
}

/// Pack a metaphone code into a 16-bit key, one nibble per letter.
///
/// Letters past [`SHORT_KEY_LEN`] are ignored and an empty code packs to 0.
pub fn short_key(code: &str) -> u16 {
    let mut key: u16 = 0;
    for ch in code.chars().take(SHORT_KEY_LEN) {
        let Some(nibble) = nibble(ch) else {
            return INVALID_KEY;
        };
        key = (key << 4) | nibble;
    }
    key
}

const fn nibble(ch: char) -> Option<u16> {
    let value = match ch.to_ascii_uppercase() {
        'A' => 0x1,
        'P' => 0x2,
        'S' => 0x3,
        'K' => 0x4,
        'X' => 0x5,
        'J' => 0x6,
        'T' => 0x7,
        'F' => 0x8,
        'N' => 0x9,
        'L' => 0xA,
        'M' => 0xB,
        'R' => 0xC,
        // theta
        '0' => 0xD,
        'H' => 0xE,
        _ => return None,
    };
    Some(value)
}

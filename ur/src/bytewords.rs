//! Bytewords-minimal encoding.
//!
//! Some response URs encode their payload segment not as hex but in the
//! Bytewords alphabet: each byte maps to a four-letter word, and the
//! "minimal" style keeps only the first and last letters, so a byte is a
//! two-letter pair. The encoded body carries a trailing four-byte CRC32
//! checksum over the payload.

use crate::error::DecodeError;
use std::sync::OnceLock;

/// The 256-word Bytewords list, in byte-value order. The (first, last)
/// letter pair of each word is unique across the list.
const WORDS: [&str; 256] = [
    "able", "acid", "also", "apex", "aqua", "arch", "atom", "aunt", "away", "axis",
    "back", "bald", "barn", "belt", "beta", "bias", "blue", "body", "brag", "brew",
    "bulb", "buzz", "calm", "cash", "cats", "chef", "city", "claw", "code", "cola",
    "cook", "cost", "crux", "curl", "cusp", "cyan", "dark", "data", "days", "deli",
    "dice", "diet", "door", "down", "draw", "drop", "drum", "dull", "duty", "each",
    "easy", "echo", "edge", "epic", "even", "exam", "exit", "eyes", "fact", "fair",
    "fern", "figs", "film", "fish", "fizz", "flap", "flew", "flux", "foxy", "free",
    "frog", "fuel", "fund", "gala", "game", "gear", "gems", "gift", "girl", "glow",
    "good", "gray", "grim", "guru", "gush", "gyro", "half", "hang", "hard", "hawk",
    "heat", "help", "high", "hill", "holy", "hope", "horn", "huts", "iced", "idea",
    "idle", "inch", "inky", "into", "iris", "iron", "item", "jade", "jazz", "join",
    "jolt", "jowl", "judo", "jugs", "jump", "junk", "jury", "keep", "keno", "kept",
    "keys", "kick", "kiln", "king", "kite", "kiwi", "knob", "lamb", "lava", "lazy",
    "leaf", "legs", "liar", "limp", "lion", "list", "logo", "loud", "love", "luau",
    "luck", "lung", "main", "many", "math", "maze", "memo", "menu", "meow", "mild",
    "mint", "miss", "monk", "nail", "navy", "need", "news", "next", "noon", "note",
    "numb", "obey", "oboe", "omit", "onyx", "open", "oval", "owls", "paid", "part",
    "peck", "play", "plus", "poem", "pool", "pose", "puff", "puma", "purr", "quad",
    "quiz", "race", "ramp", "real", "redo", "rich", "road", "rock", "roof", "ruby",
    "ruin", "runs", "rust", "safe", "saga", "scar", "sets", "silk", "skew", "slot",
    "soap", "solo", "song", "stub", "surf", "swan", "taco", "task", "taxi", "tent",
    "tied", "time", "tiny", "toil", "tomb", "toys", "trip", "tuna", "twin", "ugly",
    "undo", "unit", "urge", "user", "vast", "very", "veto", "vial", "vibe", "view",
    "visa", "void", "vows", "wall", "wand", "warm", "wasp", "wave", "waxy", "webs",
    "what", "when", "whiz", "wolf", "work", "yank", "yawn", "yell", "yoga", "yurt",
    "zaps", "zero", "zest", "zinc", "zone", "zoom",
];

/// Lookup from (first letter, last letter) to byte value; -1 for pairs that
/// are not in the alphabet.
fn pair_table() -> &'static [i16; 676] {
    static TABLE: OnceLock<[i16; 676]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [-1i16; 676];
        for (value, word) in WORDS.iter().enumerate() {
            let bytes = word.as_bytes();
            let idx = pair_index(bytes[0], bytes[3]);
            table[idx] = value as i16;
        }
        table
    })
}

fn pair_index(first: u8, last: u8) -> usize {
    (first - b'a') as usize * 26 + (last - b'a') as usize
}

/// Decode a Bytewords-minimal string, verifying and stripping the trailing
/// CRC32 checksum.
pub fn decode(s: &str) -> Result<Vec<u8>, DecodeError> {
    if s.len() % 2 != 0 {
        return Err(DecodeError::BadByteword);
    }
    let table = pair_table();
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len() / 2);
    for pair in bytes.chunks_exact(2) {
        let (first, last) = (pair[0].to_ascii_lowercase(), pair[1].to_ascii_lowercase());
        if !first.is_ascii_lowercase() || !last.is_ascii_lowercase() {
            return Err(DecodeError::BadByteword);
        }
        match table[pair_index(first, last)] {
            -1 => return Err(DecodeError::BadByteword),
            value => out.push(value as u8),
        }
    }

    if out.len() < 4 {
        return Err(DecodeError::ChecksumMismatch);
    }
    let body_len = out.len() - 4;
    let expected = u32::from_be_bytes([
        out[body_len],
        out[body_len + 1],
        out[body_len + 2],
        out[body_len + 3],
    ]);
    if crc32(&out[..body_len]) != expected {
        return Err(DecodeError::ChecksumMismatch);
    }
    out.truncate(body_len);
    Ok(out)
}

/// Encode bytes as Bytewords-minimal, appending the CRC32 checksum.
pub fn encode(data: &[u8]) -> String {
    let checksum = crc32(data).to_be_bytes();
    let mut out = String::with_capacity((data.len() + 4) * 2);
    for &b in data.iter().chain(checksum.iter()) {
        let word = WORDS[b as usize].as_bytes();
        out.push(word[0] as char);
        out.push(word[3] as char);
    }
    out
}

/// CRC32 (IEEE 802.3), bitwise.
fn crc32(data: &[u8]) -> u32 {
    let mut crc = u32::MAX;
    for &b in data {
        crc ^= u32::from(b);
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn crc32_check_value() {
        // The standard CRC32 check string.
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn word_list_pairs_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for word in WORDS {
            let b = word.as_bytes();
            assert!(seen.insert((b[0], b[3])), "duplicate pair in {word}");
        }
        assert_eq!(seen.len(), 256);
    }

    #[test]
    fn round_trip_simple() {
        let data = b"hello signed transaction";
        let encoded = encode(data);
        assert_eq!(decode(&encoded).unwrap(), data);
    }

    #[test]
    fn corrupted_checksum_rejected() {
        let mut encoded = encode(b"payload");
        // Swap the final pair for a different valid pair ("zoom" -> "able").
        encoded.truncate(encoded.len() - 2);
        encoded.push_str("ae");
        assert_eq!(decode(&encoded), Err(DecodeError::ChecksumMismatch));
    }

    #[test]
    fn odd_length_rejected() {
        assert_eq!(decode("abc"), Err(DecodeError::BadByteword));
    }

    #[test]
    fn unknown_pair_rejected() {
        // "qq" is not the (first, last) of any word.
        assert_eq!(decode("qqqqqqqqqq"), Err(DecodeError::BadByteword));
    }

    #[test]
    fn too_short_for_checksum_rejected() {
        // "ae" alone decodes to one byte, less than a checksum.
        assert_eq!(decode("aeae"), Err(DecodeError::ChecksumMismatch));
    }

    proptest! {
        #[test]
        fn encode_decode_round_trips(data in proptest::collection::vec(any::<u8>(), 0..600)) {
            prop_assert_eq!(decode(&encode(&data)).unwrap(), data);
        }
    }
}

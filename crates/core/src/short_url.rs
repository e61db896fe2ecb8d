//! Short RSVP link codes.

use rand::Rng;

/// Code alphabet without look-alike characters (0/O, 1/l/I).
const ALPHABET: &[u8] = b"23456789abcdefghijkmnpqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ";

pub const CODE_LENGTH: usize = 8;

/// Attempts at generating a code that is not already taken.
pub const MAX_GENERATION_ATTEMPTS: usize = 5;

pub fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
        .collect()
}

pub fn is_valid_code(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| ALPHABET.contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_valid() {
        for _ in 0..50 {
            let code = generate_code();
            assert!(is_valid_code(&code), "{code} should be valid");
        }
    }

    #[test]
    fn ambiguous_characters_are_invalid() {
        assert!(!is_valid_code("0000000O"));
        assert!(!is_valid_code("abc"));
        assert!(is_valid_code("abcd2345"));
    }
}

//! Activation Code Generation
//!
//! Codes are numeric so they can be read over the phone or typed from a
//! printed receipt. Lengths per card type follow store policy; global
//! uniqueness is enforced by the registry (check, regenerate on collision),
//! not by the code space alone.

use rand::Rng;
use shared::models::CardType;

/// Stamp codes only need uniqueness within one card
pub const STAMP_CODE_LEN: usize = 6;

/// Card code length policy per type
pub fn code_length(card_type: CardType) -> usize {
    match card_type {
        CardType::Reward => 7,
        CardType::Gift => 5,
        CardType::Coins => 6,
    }
}

/// Generate a random numeric code of the given length (leading zeros kept)
pub fn numeric_code(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(b'0' + rng.gen_range(0..10)))
        .collect()
}

/// Generate a card code for the given type
pub fn card_code(card_type: CardType) -> String {
    numeric_code(code_length(card_type))
}

/// Generate `count` stamp codes, unique within the returned set
pub fn stamp_codes(count: usize) -> Vec<String> {
    let mut seen = std::collections::HashSet::with_capacity(count);
    let mut codes = Vec::with_capacity(count);
    while codes.len() < count {
        let code = numeric_code(STAMP_CODE_LEN);
        if seen.insert(code.clone()) {
            codes.push(code);
        }
    }
    codes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_length_policy() {
        assert_eq!(card_code(CardType::Reward).len(), 7);
        assert_eq!(card_code(CardType::Gift).len(), 5);
        assert_eq!(card_code(CardType::Coins).len(), 6);
    }

    #[test]
    fn test_codes_are_numeric() {
        for _ in 0..100 {
            let code = numeric_code(7);
            assert!(code.chars().all(|c| c.is_ascii_digit()), "{code}");
        }
    }

    #[test]
    fn test_stamp_codes_unique_within_set() {
        let codes = stamp_codes(50);
        assert_eq!(codes.len(), 50);
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), 50);
    }

    #[test]
    fn test_stamp_codes_empty() {
        assert!(stamp_codes(0).is_empty());
    }
}

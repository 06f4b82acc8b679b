//! Voucher code generation.

use rand::{Rng, seq::SliceRandom};
use rustc_hash::FxHashSet;

const CODE_LENGTH: usize = 16;
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate `quantity` distinct random codes.
pub(crate) fn generate_codes(quantity: usize) -> Vec<String> {
    let mut rng = rand::thread_rng();
    let mut seen = FxHashSet::default();
    let mut codes = Vec::with_capacity(quantity);

    while codes.len() < quantity {
        let code = random_code(&mut rng);

        if seen.insert(code.clone()) {
            codes.push(code);
        }
    }

    codes
}

fn random_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .filter_map(|_| CODE_ALPHABET.choose(rng).copied().map(char::from))
        .collect()
}

/// Trim explicit codes and drop blanks and repeats, keeping first occurrences.
pub(crate) fn normalize_codes(codes: Vec<String>) -> Vec<String> {
    let mut seen = FxHashSet::default();

    codes
        .into_iter()
        .map(|code| code.trim().to_string())
        .filter(|code| !code.is_empty() && seen.insert(code.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_distinct_and_well_formed() {
        let codes = generate_codes(200);

        assert_eq!(codes.len(), 200);
        assert_eq!(codes.iter().collect::<FxHashSet<_>>().len(), 200);

        for code in &codes {
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(
                code.bytes().all(|b| CODE_ALPHABET.contains(&b)),
                "unexpected character in {code}"
            );
        }
    }

    #[test]
    fn explicit_codes_are_trimmed_and_deduplicated() {
        let codes = normalize_codes(vec![
            " SUMMER ".to_string(),
            "SUMMER".to_string(),
            String::new(),
            "WINTER".to_string(),
        ]);

        assert_eq!(codes, vec!["SUMMER".to_string(), "WINTER".to_string()]);
    }
}

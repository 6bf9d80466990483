use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

// Pre-compiled regex for whitespace normalization (compile once, use many times)
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("Invalid whitespace regex pattern")
});

/// Filler words that carry no dish identity
static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "con", "sin", "para", "por", "del", "las", "los", "una", "unos", "unas", "que", "the",
        "and",
    ]
    .into_iter()
    .collect()
});

/// Domain synonyms folded onto one canonical token
static TOKEN_SYNONYMS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("burger", "hamburguesa"),
        ("hamburguesa", "hamburguesa"),
        ("hamburguesas", "hamburguesa"),
        ("papas", "fritas"),
        ("fries", "fritas"),
        ("pizza", "pizza"),
        ("pizzeta", "pizza"),
        ("gaseosa", "bebida"),
        ("bebida", "bebida"),
        ("soda", "bebida"),
        ("pollo", "pollo"),
        ("chicken", "pollo"),
        ("carne", "carne"),
        ("beef", "carne"),
        ("queso", "queso"),
        ("cheese", "queso"),
        ("vegano", "vegano"),
        ("vegan", "vegano"),
    ]
    .into_iter()
    .collect()
});

/// Combining Diacritical Marks block
fn is_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// Normalize text for comparison: lowercase, fold accents, keep only
/// `[a-z0-9]` separated by single spaces.
///
/// "Café  Clásico!" becomes "cafe clasico".
pub fn normalize_text(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_diacritic(*c))
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { ' ' })
        .collect();

    WHITESPACE_RE.replace_all(&folded, " ").trim().to_string()
}

/// Split text into comparison tokens.
///
/// Tokens of two characters or fewer and stopwords are dropped, and the
/// remaining ones are folded through the synonym table. Order follows the
/// input.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize_text(text)
        .split(' ')
        .filter(|token| token.len() > 2 && !STOPWORDS.contains(token))
        .map(|token| {
            TOKEN_SYNONYMS
                .get(token)
                .copied()
                .unwrap_or(token)
                .to_string()
        })
        .collect()
}

/// Deduplication key for an extracted item
pub fn dedup_key(name: &str, description: &str) -> String {
    format!("{}|{}", normalize_text(name), normalize_text(description))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_accents() {
        assert_eq!(normalize_text("Café"), "cafe");
        assert_eq!(normalize_text("Hamburguesa Clásica"), "hamburguesa clasica");
        assert_eq!(normalize_text("Ñoquis ÁRABES"), "noquis arabes");
    }

    #[test]
    fn test_normalize_punctuation_and_whitespace() {
        assert_eq!(normalize_text("  Pizza -- Muzza!!\n\t(grande)  "), "pizza muzza grande");
        assert_eq!(normalize_text("$5.00"), "5 00");
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text("¡¿!?"), "");
    }

    #[test]
    fn test_normalize_output_alphabet() {
        let inputs = [
            "Crème brûlée — 3×2 «promo»",
            "   leading and trailing   ",
            "emoji 🍔 burger",
            "tabs\tand\nnewlines\r\n",
            "ǅ ß Ø æ",
        ];
        for input in inputs {
            let out = normalize_text(input);
            assert!(out
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == ' '));
            assert!(!out.starts_with(' ') && !out.ends_with(' '));
            assert!(!out.contains("  "), "doubled space in {:?}", out);
        }
    }

    #[test]
    fn test_tokenize_filters_short_and_stopwords() {
        let tokens = tokenize("Pizza con queso y jamón de la casa");
        assert_eq!(tokens, vec!["pizza", "queso", "jamon", "casa"]);
    }

    #[test]
    fn test_tokenize_folds_synonyms() {
        assert_eq!(tokenize("Cheese Burger"), vec!["queso", "hamburguesa"]);
        assert_eq!(tokenize("Hamburguesas"), vec!["hamburguesa"]);
        assert_eq!(tokenize("papas fries"), vec!["fritas", "fritas"]);
        assert_eq!(tokenize("Soda"), vec!["bebida"]);
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("a de la y").is_empty());
    }

    #[test]
    fn test_dedup_key_is_case_and_accent_insensitive() {
        assert_eq!(
            dedup_key("Hamburguesa CLÁSICA", "Con queso"),
            dedup_key("hamburguesa clasica", "con  QUESO")
        );
        assert_ne!(dedup_key("Pizza", "grande"), dedup_key("Pizza", "chica"));
    }
}

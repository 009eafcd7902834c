//! Text normalization for track metadata comparison.
//!
//! Artist, song and album strings are collapsed into comparison keys before
//! any matching happens: lowercase, ASCII-only, punctuation-free,
//! whitespace-free. Keys are only ever compared, never shown to a user.
//!
//! The steps run in a fixed order; the token rules assume the text is already
//! lowered and stripped of the listed punctuation.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

// ============================================================================
// RULE TABLES
// ============================================================================

/// Literal substrings removed after ASCII folding, applied in this order.
/// The `" x "` entry joins collaboration credits ("A x B") before whitespace
/// is collapsed.
const LITERAL_REMOVALS: &[&str] = &["&", "-", "'", ";", ",", ".", " x ", "(", ")"];

/// Whole-word tokens stripped from the lowered, punctuation-free text.
/// `"edition "` carries a trailing space in its pattern: a trailing
/// "edition" at end of string is kept.
static TOKEN_REMOVALS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"\bremaster\b").unwrap(),
        Regex::new(r"\bremastered\b").unwrap(),
        Regex::new(r"\bversion\b").unwrap(),
        Regex::new(r"\bedition \b").unwrap(),
        Regex::new(r"\bfeat\b").unwrap(),
        Regex::new(r"\bft\.\b").unwrap(),
    ]
});

/// Bracketed annotations like "[Mono]" or "[2011 - Remaster]".
static BRACKETED_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*?\]").unwrap());

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Fold Unicode text to ASCII: NFKD decomposition, then drop every character
/// outside the ASCII repertoire (combining marks included).
/// e.g. "Beyoncé" → "Beyonce", "naïve" → "naive"
fn fold_to_ascii(s: &str) -> String {
    s.nfkd().filter(char::is_ascii).collect()
}

/// Normalize a metadata field into its comparison key.
///
/// Lowercase → ASCII fold → literal punctuation removal → whole-word token
/// removal → bracketed-span removal → whitespace removal. Deterministic, and
/// idempotent on its own output.
pub fn normalize(text: &str) -> String {
    let mut result = fold_to_ascii(&text.to_lowercase());

    for literal in LITERAL_REMOVALS {
        result = result.replace(literal, "");
    }

    for token in TOKEN_REMOVALS.iter() {
        result = token.replace_all(&result, "").into_owned();
    }

    result = BRACKETED_SPAN.replace_all(&result, "").into_owned();

    result.split_whitespace().collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_strips_diacritics() {
        assert_eq!(normalize("Café"), normalize("CAFE"));
        assert_eq!(normalize("Björk"), "bjork");
        assert_eq!(normalize("Beyoncé"), "beyonce");
        assert_eq!(normalize("Motörhead"), "motorhead");
    }

    #[test]
    fn removes_listed_punctuation() {
        assert_eq!(normalize("Guns N' Roses"), "gunsnroses");
        assert_eq!(normalize("Run-D.M.C."), "rundmc");
        assert_eq!(normalize("Crosby, Stills; Nash & Young"), "crosbystillsnashyoung");
        assert_eq!(normalize("(Sittin' On) The Dock of the Bay"), "sittinonthedockofthebay");
    }

    #[test]
    fn collaboration_x_is_joined() {
        assert_eq!(normalize("KIDS SEE GHOSTS x Yasiin Bey"), "kidsseeghostsyasiinbey");
    }

    #[test]
    fn strips_stopword_tokens_as_whole_words() {
        assert_eq!(
            normalize("One More Time (2001 Remastered Version)"),
            "onemoretime2001"
        );
        assert_eq!(normalize("Song (feat. Somebody)"), "songsomebody");
    }

    #[test]
    fn token_removal_respects_word_boundaries() {
        // "remastered" glued to the year is not a standalone word
        assert_eq!(normalize("Remastered2020"), "remastered2020");
        assert_eq!(normalize("Versions"), "versions");
    }

    #[test]
    fn edition_only_strips_when_followed_by_a_word() {
        assert_eq!(normalize("Deluxe Edition 2020"), "deluxe2020");
        // trailing "edition" survives
        assert_eq!(normalize("Deluxe Edition"), "deluxeedition");
    }

    #[test]
    fn removes_bracketed_annotations() {
        assert_eq!(normalize("Song [Live at Wembley]"), "song");
        assert_eq!(normalize("[01] Song [Mono]"), "song");
    }

    #[test]
    fn removes_all_whitespace() {
        assert_eq!(normalize("  one\tmore   time "), "onemoretime");
    }

    #[test]
    fn empty_input_normalizes_to_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn normalization_is_idempotent() {
        let samples = [
            "Daft Punk",
            "One More Time - 2001 Remaster",
            "Café Tacvba",
            "Song [Live] (Deluxe Edition 2011)",
            "KIDS SEE GHOSTS x Yasiin Bey",
            "AC/DC",
            "",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }
}

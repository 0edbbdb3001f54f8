use unicode_segmentation::UnicodeSegmentation;

use crate::models::Language;

const ROMAN_GREETINGS: &[&str] = &[
    "namaste",
    "namaskar",
    "pranam",
    "pranaam",
    "ram ram",
    "salaam",
    "salam",
    "adaab",
    "sat sri akaal",
    "satsriakaal",
    "satshriakal",
];

const HINGLISH_MARKERS: &[&str] = &[
    "hai", "kya", "kyu", "kyun", "kab", "kaun", "kaise", "kidhar", "kahan", "se", "tak", "ke",
    "ka", "ki", "hona", "nikalti", "kiraya", "bus", "agla", "shaam", "subah", "rude", "shikayat",
    "complaint", "driver",
];

pub fn is_devanagari(ch: char) -> bool {
    ('\u{0900}'..='\u{097F}').contains(&ch)
}

/// Devanagari script wins outright; otherwise romanized greetings, then a
/// marker-word count decide between Hinglish and the English default.
pub fn detect(text: &str) -> Language {
    if text.chars().any(is_devanagari) {
        return Language::Hi;
    }

    let lower = text.trim().to_lowercase();
    if lower.is_empty() {
        return Language::En;
    }

    if ROMAN_GREETINGS.iter().any(|g| lower.contains(g)) {
        return Language::HiLatn;
    }

    let words: Vec<&str> = lower.unicode_words().collect();
    let score = HINGLISH_MARKERS
        .iter()
        .filter(|marker| words.iter().any(|word| word == *marker))
        .count();

    if score >= 2 {
        Language::HiLatn
    } else {
        Language::En
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn devanagari_wins_over_latin_markers() {
        assert_eq!(detect("bus कब nikalti hai"), Language::Hi);
        assert_eq!(detect("दिल्ली से करनाल"), Language::Hi);
    }

    #[test]
    fn plain_english_stays_english() {
        assert_eq!(detect("please show the schedule"), Language::En);
        assert_eq!(detect(""), Language::En);
    }

    #[test]
    fn romanized_greeting_is_hinglish() {
        assert_eq!(detect("namaste"), Language::HiLatn);
    }

    #[test]
    fn two_markers_make_hinglish() {
        assert_eq!(detect("Delhi se Karnal agla bus"), Language::HiLatn);
        // one marker alone is not enough
        assert_eq!(detect("fare of bus 702"), Language::En);
    }

    #[test]
    fn markers_inside_english_words_do_not_count() {
        assert_eq!(detect("please take a seat"), Language::En);
    }
}

//! Locale-aware comparison of file names.
//!
//! Approximates the root collation browsers use for `localeCompare`, for the
//! Latin scripts photo file names are written in. Strings are compared in three
//! passes, each one only consulted when the previous pass ties:
//!
//! 1. **Primary**: base letters, case and accents ignored. Whitespace sorts
//!    before punctuation, punctuation before digits, digits before letters.
//! 2. **Secondary**: unaccented before accented (`e` < `é`).
//! 3. **Tertiary**: lowercase before uppercase (`a` < `A`).
//!
//! Digits compare character by character, so `img10` sorts before `img2`.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum CharClass {
    Space,
    Punct,
    Digit,
    Letter,
}

#[derive(Debug, Clone, Copy)]
struct Folded {
    class: CharClass,
    base: char,
    accented: bool,
    upper: bool,
}

fn strip_accent(c: char) -> Option<char> {
    let base = match c {
        'à'..='å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'ď' => 'd',
        'è'..='ë' | 'ē' | 'ė' | 'ę' | 'ě' => 'e',
        'ì'..='ï' | 'ī' | 'į' => 'i',
        'ł' | 'ľ' => 'l',
        'ñ' | 'ń' | 'ň' => 'n',
        'ò'..='ö' | 'ø' | 'ō' | 'ő' => 'o',
        'ř' => 'r',
        'ś' | 'š' | 'ş' | 'ß' => 's',
        'ť' => 't',
        'ù'..='ü' | 'ū' | 'ů' | 'ű' => 'u',
        'ý' | 'ÿ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        _ => return None,
    };
    Some(base)
}

fn fold(c: char) -> Folded {
    let upper = c.is_uppercase();
    let lower = c.to_lowercase().next().unwrap_or(c);
    let (base, accented) = match strip_accent(lower) {
        Some(b) => (b, true),
        None => (lower, false),
    };
    let class = if base.is_whitespace() {
        CharClass::Space
    } else if base.is_numeric() {
        CharClass::Digit
    } else if base.is_alphabetic() {
        CharClass::Letter
    } else {
        CharClass::Punct
    };
    Folded {
        class,
        base,
        accented,
        upper,
    }
}

fn compare_level<F, K>(a: &[Folded], b: &[Folded], key: F) -> Ordering
where
    F: Fn(&Folded) -> K,
    K: Ord,
{
    a.iter().map(&key).cmp(b.iter().map(&key))
}

/// Compare two names the way a user expects them sorted in a file list.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let fa: Vec<Folded> = a.chars().map(fold).collect();
    let fb: Vec<Folded> = b.chars().map(fold).collect();

    compare_level(&fa, &fb, |f| (f.class, f.base))
        .then_with(|| compare_level(&fa, &fb, |f| f.accented))
        .then_with(|| compare_level(&fa, &fb, |f| f.upper))
}

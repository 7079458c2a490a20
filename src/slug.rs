//! Deterministic, URL-safe slugs for page titles.
//!
//! Non-ASCII letters go through `deunicode`, the same Unidecode tables the
//! pages already on the CMS were slugged with, so lookups keep matching
//! existing pages. The remote CMS uses the slug as its lookup key.

use deunicode::deunicode_char;

/// Lowercase ASCII slug: letters and digits, runs of anything else collapsed
/// into a single `-`, no leading or trailing separator.
///
/// Apostrophes and the soft and hard signs are dropped rather than treated
/// as separators (`Обʼєкт` and `Обєкт` slug alike). Characters with no
/// transliteration vanish. `slugify(slugify(x)) == slugify(x)` for every
/// input.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;

    for ch in title.chars() {
        if is_apostrophe(ch) || is_silent_sign(ch) {
            continue;
        }
        let mut buf = [0u8; 4];
        let ascii: &str = if ch.is_ascii() {
            ch.encode_utf8(&mut buf)
        } else {
            deunicode_char(ch).unwrap_or("")
        };
        for out in ascii.chars() {
            if out.is_ascii_alphanumeric() {
                if pending_separator && !slug.is_empty() {
                    slug.push('-');
                }
                pending_separator = false;
                slug.push(out.to_ascii_lowercase());
            } else if !matches!(out, '\'' | '"') {
                pending_separator = true;
            }
        }
    }
    slug
}

fn is_apostrophe(ch: char) -> bool {
    matches!(ch, '\'' | '\u{2019}' | '\u{02BC}' | '`' | '\u{2018}')
}

fn is_silent_sign(ch: char) -> bool {
    matches!(ch, 'ь' | 'Ь' | 'ъ' | 'Ъ')
}

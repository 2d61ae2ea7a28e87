use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::config::MatchConfig;
use crate::model::IdentityKey;

/// Canonical spelling of the reprint-list set after alias collapsing.
/// Its reprints encode origin-set-plus-number composite collector numbers.
pub const REPRINT_LIST_SET: &str = "the list reprints";

/// Accent-fold: NFKD decomposition with combining marks dropped, so accented
/// and unaccented spellings collide.
pub fn remove_accents(text: &str) -> String {
    text.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Split a raw name into (base, display suffix). Parenthetical annotations
/// are print-variant noise, not identity; the stripped text is preserved
/// space-prefixed so display names can restore it.
fn split_parenthetical(name: &str) -> (String, String) {
    if !(name.contains('(') && name.contains(')')) {
        return (name.to_string(), String::new());
    }

    let mut base = String::new();
    let mut annotation = String::new();
    let mut depth = 0usize;
    for c in name.chars() {
        match c {
            '(' => {
                depth += 1;
                annotation.push(c);
            }
            ')' if depth > 0 => {
                depth -= 1;
                annotation.push(c);
            }
            _ if depth > 0 => annotation.push(c),
            _ => base.push(c),
        }
    }

    let annotation = annotation.trim();
    let suffix = if annotation.is_empty() {
        String::new()
    } else {
        format!(" {annotation}")
    };
    (base.trim().to_string(), suffix)
}

/// Canonicalize raw item fields into a comparable identity key.
///
/// Returns `None` only for pre-release-only prints, which are out of scope
/// for resolution entirely. All other malformed input degrades to a
/// best-effort key; this never panics.
pub fn normalize_key(
    name: &str,
    set: &str,
    condition: &str,
    number: &str,
    config: &MatchConfig,
) -> Option<IdentityKey> {
    let (name, suffix) = split_parenthetical(name);

    let name = remove_accents(&name);
    // Only the first face of a multi-faced name takes part in identity.
    let name = name.split("//").next().unwrap_or("").trim().to_string();
    let name: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(*c, ' ' | ',' | '\'' | '-'))
        .collect();
    let name = name.trim().to_lowercase();

    // Reference presentation names differ from catalog colloquial names;
    // the alias table bridges them before normalization proper.
    let set = set.trim();
    let set = config
        .set_aliases
        .get(set)
        .map(String::as_str)
        .unwrap_or(set);
    let set = remove_accents(set);
    let set: String = set
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect();
    let mut set = set.trim().to_lowercase();

    if set == "plst" || set == "the list" {
        set = REPRINT_LIST_SET.to_string();
    }

    if set.contains("prerelease cards") {
        return None;
    }

    let mut number = number.trim();
    if set == REPRINT_LIST_SET {
        number = number.rsplit('-').next().unwrap_or("");
    }
    let number: String = number
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect();
    let number = if number.is_empty() { None } else { Some(number) };

    Some(IdentityKey {
        name,
        set,
        number,
        condition: condition.to_lowercase(),
        suffix,
    })
}

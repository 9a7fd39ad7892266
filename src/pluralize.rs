//! English pluralization of resource names.
//!
//! Only used to pick the body key of a rendered list (`child` → `children`).
//! Resource names are often camelCase, so only the last word is inflected
//! (`grandChild` → `grandChildren`), and the original casing of the rest of the
//! name is kept.

/// Turns a singular resource name into the key of its list body.
pub trait Pluralizer: Send + Sync {
    fn plural(&self, word: &str) -> String;
}

const IRREGULAR: &[(&str, &str)] = &[
    ("child", "children"),
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("ox", "oxen"),
    ("index", "indices"),
    ("matrix", "matrices"),
    ("vertex", "vertices"),
    ("criterion", "criteria"),
    ("datum", "data"),
    ("medium", "media"),
    ("analysis", "analyses"),
    ("leaf", "leaves"),
    ("life", "lives"),
    ("knife", "knives"),
    ("wife", "wives"),
    ("half", "halves"),
    ("shelf", "shelves"),
    ("quiz", "quizzes"),
];

const UNCOUNTABLE: &[&str] = &[
    "data",
    "equipment",
    "information",
    "metadata",
    "money",
    "news",
    "series",
    "sheep",
    "species",
    "deer",
    "fish",
    "feedback",
    "software",
];

/// Rule-based English pluralizer with irregular and uncountable words.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishPluralizer;

impl Pluralizer for EnglishPluralizer {
    fn plural(&self, word: &str) -> String {
        let split = last_word_start(word);
        let (head, last) = word.split_at(split);
        if last.is_empty() {
            return word.to_string();
        }
        format!("{head}{}", plural_word(last))
    }
}

/// Byte offset where the last camelCase, `_` or `-` separated word starts.
fn last_word_start(word: &str) -> usize {
    let mut start = 0;
    let mut previous_lower = false;
    for (i, c) in word.char_indices() {
        if c == '_' || c == '-' || c == ' ' {
            start = i + c.len_utf8();
            previous_lower = false;
            continue;
        }
        if c.is_uppercase() && previous_lower {
            start = i;
        }
        previous_lower = c.is_lowercase() || c.is_ascii_digit();
    }
    start
}

fn plural_word(word: &str) -> String {
    let lower = word.to_lowercase();

    if UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == lower) {
        return match_case(word, plural);
    }
    if IRREGULAR.iter().any(|(_, plural)| *plural == lower) {
        return word.to_string();
    }

    let ends_with = |suffix: &str| lower.ends_with(suffix);
    if ends_with("s") || ends_with("x") || ends_with("z") || ends_with("ch") || ends_with("sh") {
        if ends_with("ss") || !ends_with("s") {
            return format!("{word}es");
        }
        // Already plural ("items", "users").
        return word.to_string();
    }
    if ends_with("y") && !ends_vowel_y(&lower) {
        return format!("{}ies", &word[..word.len() - 1]);
    }
    format!("{word}s")
}

fn ends_vowel_y(lower: &str) -> bool {
    let mut chars = lower.chars().rev();
    chars.next();
    matches!(chars.next(), Some('a' | 'e' | 'i' | 'o' | 'u'))
}

/// Apply the capitalization of the first letter of `original` to `plural`.
fn match_case(original: &str, plural: &str) -> String {
    let upper = original.chars().next().is_some_and(char::is_uppercase);
    if upper {
        let mut chars = plural.chars();
        match chars.next() {
            Some(first) => format!("{}{}", first.to_uppercase(), chars.as_str()),
            None => String::new(),
        }
    } else {
        plural.to_string()
    }
}

//! Small vocabulary helpers for reading user commands
//!
//! Shared by the deletion guard and the offline provider.

/// Words that signal the user wants something taken off the list
const REMOVAL_WORDS: &[&str] = &[
    "remove", "removes", "removed", "removing", "delete", "deletes", "deleted", "deleting",
    "clear", "clears", "cleared", "clearing", "erase", "erased", "wipe", "wiped", "purge",
];

/// Removal words that only count as the leading verb ("empty the list", not "is it empty?")
const LEADING_REMOVAL_WORDS: &[&str] = &["drop", "empty"];

/// Politeness tokens skipped when looking for the leading verb
const FILLER_WORDS: &[&str] = &["please", "just", "now", "ok", "okay", "then", "and"];

/// `words` splits "don't" into "don" and "t"
const NEGATIONS: &[&str] = &["don", "dont", "t", "not", "never", "without", "no"];

/// How many tokens before a removal word a negation still applies to
const NEGATION_WINDOW: usize = 3;

/// Lowercased alphanumeric tokens of `text`
pub fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn is_negated(words: &[String], at: usize) -> bool {
    words[at.saturating_sub(NEGATION_WINDOW)..at]
        .iter()
        .any(|w| NEGATIONS.contains(&w.as_str()))
}

/// True when the utterance explicitly asks for removal, deletion or clearing
///
/// Negated requests ("don't delete anything") do not count.
pub fn has_removal_intent(utterance: &str) -> bool {
    let words = words(utterance);
    let leading = words
        .iter()
        .position(|w| !FILLER_WORDS.contains(&w.as_str()));

    let removal_word = words.iter().enumerate().any(|(i, w)| {
        let removal = REMOVAL_WORDS.contains(&w.as_str())
            || (Some(i) == leading && LEADING_REMOVAL_WORDS.contains(&w.as_str()));
        removal && !is_negated(&words, i)
    });

    removal_word
        || words
            .windows(3)
            .enumerate()
            .any(|(i, w)| w[0] == "get" && w[1] == "rid" && w[2] == "of" && !is_negated(&words, i))
}

fn number_word(word: &str) -> Option<usize> {
    match word {
        "one" => Some(1),
        "two" => Some(2),
        "three" => Some(3),
        "four" => Some(4),
        "five" => Some(5),
        _ => word.parse().ok(),
    }
}

/// Resolves ordinal references ("first", "top", "number 2", "last") against a list of `len` items
pub fn ordinal_index(words: &[String], len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }

    let index = words.iter().enumerate().find_map(|(i, word)| match word.as_str() {
        "first" | "top" | "1st" => Some(0),
        "second" | "2nd" => Some(1),
        "third" | "3rd" => Some(2),
        "fourth" | "4th" => Some(3),
        "fifth" | "5th" => Some(4),
        "last" | "bottom" => Some(len - 1),
        "number" => words
            .get(i + 1)
            .and_then(|next| number_word(next))
            .and_then(|n| n.checked_sub(1)),
        _ => None,
    })?;

    (index < len).then_some(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removal_intent() {
        assert!(has_removal_intent("remove the first task"));
        assert!(has_removal_intent("Clear everything"));
        assert!(has_removal_intent("please get rid of the milk one"));
        assert!(has_removal_intent("DELETE it"));
        assert!(!has_removal_intent("add buy milk"));
        assert!(!has_removal_intent("I finished the milk task"));
        assert!(!has_removal_intent("unclear instructions"));
    }

    #[test]
    fn test_removal_words_in_other_senses() {
        assert!(!has_removal_intent("is my list empty?"));
        assert!(!has_removal_intent("add drop off laundry"));
        assert!(has_removal_intent("drop the milk task"));
        assert!(has_removal_intent("please empty my list"));
    }

    #[test]
    fn test_negated_removal() {
        assert!(!has_removal_intent("don't delete anything, just add milk"));
        assert!(!has_removal_intent("do not remove the gym task"));
        assert!(!has_removal_intent("add eggs without clearing the rest"));
        assert!(!has_removal_intent("never get rid of the first one"));
        assert!(has_removal_intent("remove milk but don't touch the rest"));
    }

    #[test]
    fn test_ordinal_index() {
        let w = |s: &str| words(s);
        assert_eq!(ordinal_index(&w("remove the first task"), 3), Some(0));
        assert_eq!(ordinal_index(&w("the top one"), 3), Some(0));
        assert_eq!(ordinal_index(&w("number 1"), 3), Some(0));
        assert_eq!(ordinal_index(&w("number two"), 3), Some(1));
        assert_eq!(ordinal_index(&w("delete the second one"), 3), Some(1));
        assert_eq!(ordinal_index(&w("the last task"), 3), Some(2));
        assert_eq!(ordinal_index(&w("bottom"), 1), Some(0));
        assert_eq!(ordinal_index(&w("the fifth task"), 3), None);
        assert_eq!(ordinal_index(&w("number 0"), 3), None);
        assert_eq!(ordinal_index(&w("first"), 0), None);
        assert_eq!(ordinal_index(&w("buy milk"), 3), None);
    }
}

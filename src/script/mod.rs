//! Script preparation: turning a raw post into text that reads well through TTS
//! and can later be aligned token by token.

/// Characters that open or close a sentence when splitting a post
pub const SENTENCE_PUNCTUATION: [char; 6] = ['.', ';', ':', '!', '?', '"'];

/// Escape sequences flattened to single spaces
const ESCAPE_SEQUENCES: [&str; 4] = ["\n", "\t", "\r", "  "];

/// Abbreviation, replacement and padding, applied in order
pub const ABBREVIATIONS: &[(&str, &str, &str)] = &[
    ("\n", " ", ""),
    ("\t", " ", ""),
    ("\r", " ", ""),
    ("(", "", ""),
    (")", "", ""),
    ("AITA", "Am I the asshole ", " "),
    ("WIBTA", "Would I be the asshole ", " "),
    ("NTA", "Not the asshole ", " "),
    ("YTA", "You're the Asshole", ""),
    ("YWBTA", "You Would Be the Asshole", ""),
    ("YWNBTA", "You Would Not be the Asshole", ""),
    ("ESH", "Everyone Sucks here", ""),
    ("NAH", "No Assholes here", ""),
    ("INFO", "Not Enough Info", ""),
    ("FIL", "father in law ", " "),
    ("BIL", "brother in law ", " "),
    ("MIL", "mother in law ", " "),
    ("SIL", "sister in law ", " "),
    (" BF ", " boyfriend ", ""),
    (" GF ", " girlfriend ", ""),
    (" bf ", " boyfriend ", ""),
    (" gf ", " girlfriend ", ""),
    ("  ", " ", ""),
];

/// Replace `abbreviation + padding`, then `padding + abbreviation`
pub fn replace_abbreviation(text: &str, abbreviation: &str, replacement: &str, padding: &str) -> String {
    text.replace(&format!("{}{}", abbreviation, padding), replacement)
        .replace(&format!("{}{}", padding, abbreviation), replacement)
}

/// Apply the whole abbreviation table
pub fn expand_abbreviations(text: &str) -> String {
    ABBREVIATIONS
        .iter()
        .fold(text.to_string(), |acc, (abbreviation, replacement, padding)| {
            replace_abbreviation(&acc, abbreviation, replacement, padding)
        })
}

pub fn has_alpha_and_digit(word: &str) -> bool {
    word.chars().any(char::is_alphabetic) && word.chars().any(|c| c.is_ascii_digit())
}

/// Insert a space at every letter/digit transition so TTS reads "abc 123"
pub fn split_alpha_and_digit(word: &str) -> String {
    let mut result = String::with_capacity(word.len() + 4);
    let mut alpha = false;
    let mut digit = false;

    for c in word.chars() {
        if c.is_alphabetic() {
            alpha = true;
            if digit {
                result.push(' ');
                digit = false;
            }
        } else if c.is_ascii_digit() {
            digit = true;
            if alpha {
                result.push(' ');
                alpha = false;
            }
        }
        result.push(c);
    }

    result
}

/// Replace escape characters and double spaces with single spaces
pub fn normalize_whitespace(text: &str) -> String {
    ESCAPE_SEQUENCES
        .iter()
        .fold(text.to_string(), |acc, escape| acc.replace(escape, " "))
}

/// Split a post into sentences at punctuation.
///
/// A word starting with punctuation closes the running sentence before it; a
/// word ending with punctuation closes the sentence after it.
pub fn split_sentences(text: &str) -> Vec<String> {
    let normalized = normalize_whitespace(text);
    let mut sentences = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    let mut flush = |current: &mut Vec<&str>| {
        if !current.is_empty() {
            sentences.push(current.join(" "));
            current.clear();
        }
    };

    for word in normalized.split(' ').filter(|w| !w.is_empty()) {
        if word.starts_with(&SENTENCE_PUNCTUATION[..]) {
            flush(&mut current);
        }
        current.push(word);
        if word.ends_with(&SENTENCE_PUNCTUATION[..]) {
            flush(&mut current);
        }
    }
    flush(&mut current);

    sentences
}

/// Transliterate to plain ASCII so typographic quotes and ellipses behave like
/// their keyboard forms
pub fn to_ascii(text: &str) -> String {
    deunicode::deunicode(text)
}

/// Prepare post text for synthesis and later alignment
pub fn prepare_script(text: &str) -> String {
    let sentences = split_sentences(&to_ascii(text)).join(" ");
    let expanded = expand_abbreviations(&sentences);

    let prepared = expanded
        .trim()
        .split(' ')
        .map(|word| {
            if has_alpha_and_digit(word) {
                split_alpha_and_digit(word)
            } else {
                word.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    tracing::debug!(
        "Prepared script with {} words from {} characters",
        prepared.split_whitespace().count(),
        text.len()
    );
    prepared
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_abbreviation() {
        assert_eq!(
            replace_abbreviation("This is an example ABB.", "ABB", "abbreviation", ""),
            "This is an example abbreviation."
        );
        assert_eq!(
            replace_abbreviation("This is an example ABB.", "ABB", "abbreviation", "."),
            "This is an example abbreviation"
        );
        assert_eq!(
            replace_abbreviation("ABB is an ABBbreviation ABB.", "ABB", "abbreviation", ""),
            "abbreviation is an abbreviationbreviation abbreviation."
        );
        assert_eq!(replace_abbreviation("No match here.", "XYZ", "something", ""), "No match here.");
        assert_eq!(replace_abbreviation("", "ABB", "abbreviation", ""), "");
    }

    #[test]
    fn test_expand_abbreviations() {
        assert_eq!(
            expand_abbreviations("AITA for leaving my BF at home?"),
            "Am I the asshole for leaving my boyfriend at home?"
        );
    }

    #[test]
    fn test_has_alpha_and_digit() {
        assert!(has_alpha_and_digit("a1"));
        assert!(has_alpha_and_digit("a@1"));
        assert!(has_alpha_and_digit("A1 "));
        assert!(!has_alpha_and_digit("abc"));
        assert!(!has_alpha_and_digit("1234"));
        assert!(!has_alpha_and_digit(""));
    }

    #[test]
    fn test_split_alpha_and_digit() {
        assert_eq!(split_alpha_and_digit("abc123"), "abc 123");
        assert_eq!(split_alpha_and_digit("a1b2c3"), "a 1 b 2 c 3");
        assert_eq!(split_alpha_and_digit("abcdef"), "abcdef");
        assert_eq!(split_alpha_and_digit("123456"), "123456");
        assert_eq!(split_alpha_and_digit(""), "");
        assert_eq!(split_alpha_and_digit("a1!b2@"), "a 1! b 2@");
        assert_eq!(split_alpha_and_digit("a1 b2\tc3"), "a 1  b 2\t c 3");
        assert_eq!(split_alpha_and_digit("ABC123"), "ABC 123");
    }

    #[test]
    fn test_typographic_punctuation_becomes_ascii() {
        assert_eq!(to_ascii("\u{201c}Hi\u{201d} it\u{2019}s\u{2026}"), "\"Hi\" it's...");
        assert_eq!(
            split_sentences(&to_ascii("\u{201c}Hi\u{201d} there.")),
            vec!["\"Hi\"", "there."]
        );
    }

    #[test]
    fn test_prepare_script_transliterates() {
        assert_eq!(
            prepare_script("\u{201c}Hello\u{201d} she said\u{2026} It\u{2019}s fine."),
            "\"Hello\" she said... It's fine."
        );
        assert!(prepare_script("Caf\u{e9} na\u{ef}ve").is_ascii());
    }

    #[test]
    fn test_split_sentences_with_escape_characters() {
        let sentences = split_sentences("This is a\t test sentence.\nThis is another test sentence.\r");
        assert_eq!(
            sentences,
            vec!["This is a test sentence.", "This is another test sentence."]
        );
    }

    #[test]
    fn test_split_sentences_keeps_unterminated_tail() {
        let sentences = split_sentences("First one! and then  some");
        assert_eq!(sentences, vec!["First one!", "and then some"]);
    }

    #[test]
    fn test_split_sentences_leading_quote() {
        let sentences = split_sentences("He said \"no way");
        assert_eq!(sentences, vec!["He said", "\"no way"]);
    }

    #[test]
    fn test_prepare_script() {
        assert_eq!(
            prepare_script("WIBTA if I sold my 2nd car?\nIt was a 4x4."),
            "Would I be the asshole if I sold my 2 nd car? It was a 4 x 4."
        );
    }
}

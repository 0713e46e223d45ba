//! Lyric text helpers shared by note and header fixes.

/// Applies the apostrophe/quote substitution table:
/// two upright single quotes become a double quote, and grave accent, acute
/// accent, prime symbol and upright apostrophe all become the typographer's
/// apostrophe.
pub fn replace_false_apostrophes(value: &str) -> String {
    value
        .replace("''", "\"")
        .replace('`', "’")
        .replace('´', "’")
        .replace('′', "’")
        .replace('\'', "’")
}

/// Uppercases the first capitalizable character (a letter or the
/// typographer's apostrophe) of `text`, e.g. `'"what time is it?"'` becomes
/// `'"What time is it?"'`. Returns whether the text changed.
pub fn capitalize_first_word(text: &mut String) -> bool {
    for (idx, ch) in text.char_indices() {
        if !ch.is_alphabetic() && ch != '’' {
            continue;
        }
        if !ch.is_lowercase() {
            return false;
        }
        let mut capitalized = String::with_capacity(text.len() + 1);
        capitalized.push_str(&text[..idx]);
        capitalized.extend(ch.to_uppercase());
        capitalized.push_str(&text[idx + ch.len_utf8()..]);
        *text = capitalized;
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_false_apostrophes() {
        assert_eq!(replace_false_apostrophes("can't"), "can’t");
        assert_eq!(replace_false_apostrophes("rock`n´roll"), "rock’n’roll");
        assert_eq!(replace_false_apostrophes("5′ tall"), "5’ tall");
        assert_eq!(replace_false_apostrophes("''quoted''"), "\"quoted\"");
    }

    #[test]
    fn test_replace_false_apostrophes_leaves_plain_text() {
        assert_eq!(replace_false_apostrophes("hello world"), "hello world");
    }

    #[test]
    fn test_capitalize_first_word() {
        let mut text = "hello".to_owned();
        assert!(capitalize_first_word(&mut text));
        assert_eq!(text, "Hello");
    }

    #[test]
    fn test_capitalize_skips_leading_punctuation() {
        let mut text = "\"what time is it?\"".to_owned();
        assert!(capitalize_first_word(&mut text));
        assert_eq!(text, "\"What time is it?\"");
    }

    #[test]
    fn test_capitalize_stops_at_apostrophe() {
        let mut text = "’twas".to_owned();
        assert!(!capitalize_first_word(&mut text));
        assert_eq!(text, "’twas");
    }

    #[test]
    fn test_capitalize_noop_when_already_capitalized() {
        let mut text = "Hello".to_owned();
        assert!(!capitalize_first_word(&mut text));
        assert_eq!(text, "Hello");
    }

    #[test]
    fn test_capitalize_noop_without_letters() {
        let mut text = "123 ~".to_owned();
        assert!(!capitalize_first_word(&mut text));
        assert_eq!(text, "123 ~");
    }
}

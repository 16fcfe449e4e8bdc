// Letter-chain validation (`spec.md` §4.5.2): a submitted word must start
// on the letter the previous word ends on. Soft sign, hard sign and `ы`
// carry no sound of their own in this game's rule, so the *second*-to-last
// letter is used instead when the previous word ends in one of them.

const SKIP_TAIL_LETTERS: [char; 3] = ['ь', 'ъ', 'ы'];

/// The letter the next word must start with, given the previous word.
pub fn required_first_letter(previous_word: &str) -> Option<char> {
    let chars: Vec<char> = previous_word.chars().collect();
    let last = chars.last()?.to_lowercase().next()?;
    if SKIP_TAIL_LETTERS.contains(&last) {
        chars.iter().rev().nth(1).copied().or(Some(last))
    } else {
        Some(last)
    }
}

pub fn starts_with_letter(word: &str, letter: char) -> bool {
    word.chars()
        .next()
        .map(|c| c.to_lowercase().eq(letter.to_lowercase()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_word_uses_last_letter() {
        assert_eq!(required_first_letter("кот"), Some('т'));
    }

    #[test]
    fn soft_sign_tail_falls_back_to_previous_letter() {
        assert_eq!(required_first_letter("медведь"), Some('д'));
    }

    #[test]
    fn hard_sign_tail_falls_back_to_previous_letter() {
        assert_eq!(required_first_letter("подъезд"), Some('д'));
    }

    #[test]
    fn y_tail_falls_back_to_previous_letter() {
        assert_eq!(required_first_letter("игры"), Some('р'));
    }

    #[test]
    fn starts_with_letter_is_case_insensitive() {
        assert!(starts_with_letter("Тигр", 'т'));
        assert!(!starts_with_letter("Ёж", 'т'));
    }
}

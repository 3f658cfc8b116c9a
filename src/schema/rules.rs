//! Text-format rules used by the sign-up screen.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LETTERS_ONLY: Regex = Regex::new(r"^[a-zA-Z]+$").unwrap();
    static ref MOBILE_NUMBER: Regex = Regex::new(r"^[6-9][0-9]{9}$").unwrap();
    static ref HAS_LETTER: Regex = Regex::new(r"[a-zA-Z]").unwrap();
    static ref HAS_DIGIT: Regex = Regex::new(r"[0-9]").unwrap();
}

pub const MIN_PASSWORD_LEN: usize = 5;

pub fn is_letters_only(value: &str) -> bool {
    LETTERS_ONLY.is_match(value)
}

/// Ten digits, first one 6, 7, 8 or 9.
pub fn is_mobile_number(value: &str) -> bool {
    MOBILE_NUMBER.is_match(value)
}

/// At least five characters with one letter and one digit.
pub fn is_acceptable_password(value: &str) -> bool {
    value.chars().count() >= MIN_PASSWORD_LEN && HAS_LETTER.is_match(value) && HAS_DIGIT.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_only() {
        assert!(is_letters_only("Asha"));
        assert!(!is_letters_only("Asha K"));
        assert!(!is_letters_only("r2d2"));
        assert!(!is_letters_only(""));
    }

    #[test]
    fn test_mobile_number() {
        assert!(is_mobile_number("9876543210"));
        assert!(!is_mobile_number("5876543210"));
        assert!(!is_mobile_number("987654321"));
        assert!(!is_mobile_number("98765432101"));
        assert!(!is_mobile_number("9٠١٢٣٤٥٦٧٨"));
    }

    #[test]
    fn test_password_complexity() {
        assert!(is_acceptable_password("abc12"));
        assert!(!is_acceptable_password("ab12"));
        assert!(!is_acceptable_password("abcdef"));
        assert!(!is_acceptable_password("123456"));
        assert!(!is_acceptable_password("abcd٣"));
    }
}

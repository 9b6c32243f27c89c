//! Toy card-number validation.
//!
//! The storefront never talks to a real payment provider; acceptance is
//! decided by arithmetic on the card number. Three checks run in order:
//!
//! 1. the number must be non-empty and all decimal digits, else reject;
//! 2. a number longer than 8 digits annotates the order with the length
//!    error but does not stop the attempt;
//! 3. the number must be even and must not end in 0, else reject.

/// Rejection message for a non-numeric card number.
pub const ERR_DIGITS: &str = "Error: Card number must contain only digits.";
/// Annotation for a card number longer than 8 digits.
pub const ERR_LENGTH: &str = "Error: Card number can't be longer than 8 digits.";
/// Rejection message for an odd number or one ending in 0.
pub const ERR_PARITY: &str = "Error: Card number must be even and may not have 0 at the end.";

/// Maximum card number length before the length annotation fires.
const MAX_CARD_DIGITS: usize = 8;

/// Outcome of validating a card number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardValidation {
    /// Length annotation to write onto the order, set even when the
    /// attempt ultimately succeeds.
    pub length_error: Option<&'static str>,
    /// Final verdict: `Ok` accepts the payment, `Err` carries the
    /// rejection message.
    pub verdict: Result<(), &'static str>,
}

/// Run the three card-number checks.
#[must_use]
pub fn validate_card_number(number: &str) -> CardValidation {
    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return CardValidation {
            length_error: None,
            verdict: Err(ERR_DIGITS),
        };
    }

    let length_error = (number.len() > MAX_CARD_DIGITS).then_some(ERR_LENGTH);

    // Evenness and the trailing-zero rule are both decided by the last
    // digit, which also keeps arbitrarily long numbers out of integer
    // parsing.
    let last = number.as_bytes()[number.len() - 1];
    let verdict = if last % 2 == 0 && last != b'0' {
        Ok(())
    } else {
        Err(ERR_PARITY)
    };

    CardValidation {
        length_error,
        verdict,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_number_not_ending_in_zero_is_accepted() {
        let v = validate_card_number("12345678");
        assert_eq!(v.verdict, Ok(()));
        assert_eq!(v.length_error, None);
    }

    #[test]
    fn test_non_digit_number_is_rejected() {
        let v = validate_card_number("1234567A");
        assert_eq!(v.verdict, Err(ERR_DIGITS));
        assert_eq!(v.length_error, None);
    }

    #[test]
    fn test_odd_number_is_rejected() {
        let v = validate_card_number("12345679");
        assert_eq!(v.verdict, Err(ERR_PARITY));
    }

    #[test]
    fn test_trailing_zero_is_rejected() {
        let v = validate_card_number("12345670");
        assert_eq!(v.verdict, Err(ERR_PARITY));
    }

    #[test]
    fn test_long_number_annotates_but_still_passes() {
        // The length annotation never decides the verdict: a long odd
        // number is still rejected for parity, a long even one accepted.
        let v = validate_card_number("123456781");
        assert_eq!(v.length_error, Some(ERR_LENGTH));
        assert_eq!(v.verdict, Err(ERR_PARITY));

        let v = validate_card_number("123456788");
        assert_eq!(v.length_error, Some(ERR_LENGTH));
        assert_eq!(v.verdict, Ok(()));
    }

    #[test]
    fn test_long_even_number_is_not_rejected_for_parity() {
        let v = validate_card_number("123456782");
        assert_eq!(v.length_error, Some(ERR_LENGTH));
        assert_eq!(v.verdict, Ok(()));
    }

    #[test]
    fn test_empty_number_is_rejected() {
        assert_eq!(validate_card_number("").verdict, Err(ERR_DIGITS));
    }
}

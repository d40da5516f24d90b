//! Donation amount extraction from free text

use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// ASCII digits with at most one decimal point; a bare fraction like `.5` is allowed
static AMOUNT_PATTERN: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"[0-9]+(?:\.[0-9]+)?|\.[0-9]+").expect("amount pattern is valid")
});

/// Why an utterance did not yield a usable amount
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("no number found")]
    Missing,
    #[error("negative amount")]
    Negative,
    #[error("amount out of range")]
    OutOfRange,
}

/// Extract the first numeric run from an utterance.
///
/// No currency symbols, locale formatting or thousands separators are
/// understood. A number written with a leading `-` is rejected rather than
/// read as its absolute value.
pub fn parse_amount(text: &str) -> Result<Decimal, AmountError> {
    let found = AMOUNT_PATTERN.find(text).ok_or(AmountError::Missing)?;

    if text
        .get(..found.start())
        .is_some_and(|prefix| prefix.ends_with('-'))
    {
        return Err(AmountError::Negative);
    }

    let digits = found.as_str();
    let parsed = if digits.starts_with('.') {
        Decimal::from_str(&format!("0{digits}"))
    } else {
        Decimal::from_str(digits)
    };
    parsed.map_err(|_| AmountError::OutOfRange)
}

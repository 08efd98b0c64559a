use std::fmt;

/// Money is represented as integer cents to avoid floating-point drift in balances.
/// 1 unit = 100 cents, so 50.00 = 5000 cents.
pub type Cents = i64;

/// Largest unit amount accepted from the outside world (about 90 trillion).
const MAX_UNITS: f64 = 9.0e13;

/// Largest balance an account may hold, the same 90 trillion in cents.
/// Kept well below `i64::MAX` so credits can never overflow storage.
pub const MAX_BALANCE: Cents = 9_000_000_000_000_000;

/// Format cents as a human-readable amount.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.abs();
    let units = abs_cents / 100;
    let remainder = abs_cents % 100;
    format!("{}{}.{:02}", sign, units, remainder)
}

/// Parse a decimal string into cents.
/// Example: "50.00" -> 5000, "12.5" -> 1250, "100" -> 10000
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    let negative = input.starts_with('-');
    let input = input.trim_start_matches('-');

    let parts: Vec<&str> = input.split('.').collect();
    match parts.len() {
        1 => {
            let units: i64 = parts[0]
                .parse()
                .map_err(|_| ParseCentsError::InvalidFormat)?;
            let cents = units * 100;
            Ok(if negative { -cents } else { cents })
        }
        2 => {
            let units: i64 = if parts[0].is_empty() {
                0
            } else {
                parts[0]
                    .parse()
                    .map_err(|_| ParseCentsError::InvalidFormat)?
            };

            let decimal_str = parts[1];
            let decimal_cents: i64 = match decimal_str.len() {
                0 => 0,
                // "5" after the point means 50 cents
                1 => {
                    decimal_str
                        .parse::<i64>()
                        .map_err(|_| ParseCentsError::InvalidFormat)?
                        * 10
                }
                2 => decimal_str
                    .parse()
                    .map_err(|_| ParseCentsError::InvalidFormat)?,
                _ => decimal_str[..2]
                    .parse()
                    .map_err(|_| ParseCentsError::InvalidFormat)?,
            };

            let cents = units * 100 + decimal_cents;
            Ok(if negative { -cents } else { cents })
        }
        _ => Err(ParseCentsError::InvalidFormat),
    }
}

/// Convert an amount in currency units (as received over JSON) into cents.
/// Rounds to the nearest cent. Returns `None` for NaN, infinities and
/// amounts too large to be represented.
pub fn cents_from_units(units: f64) -> Option<Cents> {
    if !units.is_finite() || units.abs() > MAX_UNITS {
        return None;
    }
    Some((units * 100.0).round() as Cents)
}

/// Convert cents back into currency units.
pub fn units_from_cents(cents: Cents) -> f64 {
    cents as f64 / 100.0
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    InvalidFormat,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::InvalidFormat => write!(f, "invalid money format"),
        }
    }
}

impl std::error::Error for ParseCentsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(5000), "50.00");
        assert_eq!(format_cents(1234), "12.34");
        assert_eq!(format_cents(1), "0.01");
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(-5000), "-50.00");
    }

    #[test]
    fn test_largest_amount_fits_the_balance_ceiling() {
        assert_eq!(cents_from_units(9.0e13), Some(MAX_BALANCE));
        assert_eq!(cents_from_units(9.0e13 + 1.0), None);
        assert_eq!(cents_from_units(0.01), Some(1));
        assert_eq!(cents_from_units(0.004), Some(0));
        assert_eq!(cents_from_units(f64::NAN), None);
    }

    #[test]
    fn test_parse_cents() {
        assert_eq!(parse_cents("1000"), Ok(100000));
        assert_eq!(parse_cents("12.34"), Ok(1234));
        assert_eq!(parse_cents("12.5"), Ok(1250));
        assert_eq!(parse_cents(".50"), Ok(50));
        assert_eq!(parse_cents("100.999"), Ok(10099)); // Truncates
    }

    #[test]
    fn test_parse_cents_invalid() {
        assert!(parse_cents("abc").is_err());
        assert!(parse_cents("12.34.56").is_err());
    }

    #[test]
    fn test_cents_from_units_rounds_to_nearest_cent() {
        assert_eq!(cents_from_units(700.0), Some(70000));
        assert_eq!(cents_from_units(12.5), Some(1250));
        assert_eq!(cents_from_units(0.1 + 0.2), Some(30));
        assert_eq!(cents_from_units(0.004), Some(0));
        assert_eq!(cents_from_units(-3.0), Some(-300));
    }

    #[test]
    fn test_cents_from_units_rejects_non_finite() {
        assert_eq!(cents_from_units(f64::NAN), None);
        assert_eq!(cents_from_units(f64::INFINITY), None);
        assert_eq!(cents_from_units(1.0e20), None);
    }

    #[test]
    fn test_units_from_cents() {
        assert_eq!(units_from_cents(70000), 700.0);
        assert_eq!(units_from_cents(1250), 12.5);
    }
}

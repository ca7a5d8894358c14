//! Numeric token parsing for report text
//!
//! Accepts the spellings that show up in field reports:
//! - thousands separators: "2,420", "1,234,567", "1,234.5"
//! - decimal commas: "1,5", "1.234,5"
//! - fractions and mixed fractions: "5/8", "9 5/8"

/// Why a numeric token was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NumberError {
    #[error("empty numeric token")]
    Empty,
    #[error("ambiguous separators in '{0}'")]
    Separators(String),
    #[error("invalid fraction '{0}'")]
    Fraction(String),
    #[error("'{0}' is not a number")]
    Invalid(String),
}

/// Parse a numeric token into a finite f64.
pub fn parse_number(token: &str) -> Result<f64, NumberError> {
    let token = token.trim().trim_end_matches(['.', ',']);
    if token.is_empty() {
        return Err(NumberError::Empty);
    }

    let (sign, body) = match token.as_bytes()[0] {
        b'-' => (-1.0, &token[1..]),
        b'+' => (1.0, &token[1..]),
        _ => (1.0, token),
    };

    let mut parts = body.split_whitespace();
    let value = match (parts.next(), parts.next(), parts.next()) {
        (Some(whole), Some(frac), None) => {
            if whole.contains('/') || !frac.contains('/') {
                return Err(NumberError::Fraction(token.to_string()));
            }
            parse_plain(whole)? + parse_fraction(frac)?
        }
        (Some(single), None, None) if single.contains('/') => parse_fraction(single)?,
        (Some(single), None, None) => parse_plain(single)?,
        _ => return Err(NumberError::Invalid(token.to_string())),
    };

    let value = sign * value;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(NumberError::Invalid(token.to_string()))
    }
}

fn parse_fraction(token: &str) -> Result<f64, NumberError> {
    let (num, den) = token
        .split_once('/')
        .ok_or_else(|| NumberError::Fraction(token.to_string()))?;
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(num) || !all_digits(den) {
        return Err(NumberError::Fraction(token.to_string()));
    }
    let num: f64 = num.parse().map_err(|_| NumberError::Fraction(token.to_string()))?;
    let den: f64 = den.parse().map_err(|_| NumberError::Fraction(token.to_string()))?;
    if den == 0.0 {
        return Err(NumberError::Fraction(token.to_string()));
    }
    Ok(num / den)
}

/// Every group after the first is exactly three digits, and the leading group
/// has no leading zero ("0,785" is never thousands).
fn is_grouped(groups: &[&str]) -> bool {
    groups
        .first()
        .is_some_and(|g| !g.is_empty() && g.len() <= 3 && !g.starts_with('0'))
        && groups[1..].iter().all(|g| g.len() == 3)
}

fn parse_plain(token: &str) -> Result<f64, NumberError> {
    if !token.bytes().all(|b| b.is_ascii_digit() || b == b'.' || b == b',') {
        return Err(NumberError::Invalid(token.to_string()));
    }

    let commas = token.matches(',').count();
    let dots = token.matches('.').count();
    let separators = || NumberError::Separators(token.to_string());

    let normalized = match (commas, dots) {
        (0, 0) | (0, 1) => token.to_string(),
        (0, _) => return Err(separators()),
        (_, 0) => {
            let groups: Vec<&str> = token.split(',').collect();
            if commas == 1 && (groups[1].len() != 3 || !is_grouped(&groups)) {
                // "1,5", "0,785": decimal comma
                token.replace(',', ".")
            } else if is_grouped(&groups) {
                token.replace(',', "")
            } else {
                return Err(separators());
            }
        }
        _ => {
            let (last_comma, last_dot) = (token.rfind(','), token.rfind('.'));
            if last_dot > last_comma {
                // "1,234.5": commas group thousands
                let (int, _) = token.split_at(token.rfind('.').unwrap_or(token.len()));
                let groups: Vec<&str> = int.split(',').collect();
                if dots != 1 || !is_grouped(&groups) {
                    return Err(separators());
                }
                token.replace(',', "")
            } else {
                // "1.234,5": dots group thousands, comma is decimal
                let (int, _) = token.split_at(token.rfind(',').unwrap_or(token.len()));
                let groups: Vec<&str> = int.split('.').collect();
                if commas != 1 || !is_grouped(&groups) {
                    return Err(separators());
                }
                token.replace('.', "").replace(',', ".")
            }
        }
    };

    normalized
        .parse::<f64>()
        .map_err(|_| NumberError::Invalid(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_numbers() {
        assert_eq!(parse_number("2420"), Ok(2420.0));
        assert_eq!(parse_number("0.78"), Ok(0.78));
        assert_eq!(parse_number("-12.5"), Ok(-12.5));
        assert_eq!(parse_number("2420."), Ok(2420.0));
    }

    #[test]
    fn test_thousands_separator() {
        assert_eq!(parse_number("2,420"), Ok(2420.0));
        assert_eq!(parse_number("1,234,567"), Ok(1_234_567.0));
        assert_eq!(parse_number("1,234.5"), Ok(1234.5));
    }

    #[test]
    fn test_decimal_comma() {
        assert_eq!(parse_number("1,5"), Ok(1.5));
        assert_eq!(parse_number("0,78"), Ok(0.78));
        assert_eq!(parse_number("1.234,5"), Ok(1234.5));
    }

    #[test]
    fn test_leading_zero_group_is_decimal_comma() {
        assert_eq!(parse_number("0,785"), Ok(0.785));
        assert_eq!(parse_number("0,125"), Ok(0.125));
        assert!(matches!(parse_number("0,785,000"), Err(NumberError::Separators(_))));
        assert_eq!(parse_number("10,785"), Ok(10_785.0));
    }

    #[test]
    fn test_fractions() {
        assert_eq!(parse_number("9 5/8"), Ok(9.625));
        assert_eq!(parse_number("5/8"), Ok(0.625));
        assert_eq!(parse_number("4 1/2"), Ok(4.5));
    }

    #[test]
    fn test_malformed_tokens() {
        assert!(matches!(parse_number("1.2.3"), Err(NumberError::Separators(_))));
        assert!(matches!(parse_number("4/0"), Err(NumberError::Fraction(_))));
        assert!(matches!(parse_number("1,23,4"), Err(NumberError::Separators(_))));
        assert!(parse_number("").is_err());
        assert!(parse_number("abc").is_err());
    }
}

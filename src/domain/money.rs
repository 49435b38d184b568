use std::fmt;

/// Money is represented as integer cents to avoid floating-point precision issues.
/// For BRL, 1 real = 100 centavos, so R$ 50,00 = 5000 cents.
pub type Cents = i64;

/// Largest amount a single row can hold: R$ 9.999.999.999.999,99.
/// A full batch at this amount per row still fits in [`Cents`].
pub const MAX_AMOUNT_CENTS: Cents = 999_999_999_999_999;

/// Number of cent digits in [`MAX_AMOUNT_CENTS`].
pub const MAX_AMOUNT_DIGITS: usize = 15;

/// Group the integer part of an amount with periods every three digits.
/// Example: "1234567" -> "1.234.567"
pub(crate) fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Render a string of cent digits as "int,frac" with grouped thousands.
/// The input must contain ASCII digits only.
pub(crate) fn render_cent_digits(digits: &str) -> String {
    let trimmed = digits.trim_start_matches('0');
    let padded = format!("{:0>3}", trimmed);
    let (units, fraction) = padded.split_at(padded.len() - 2);
    format!("{},{}", group_thousands(units), fraction)
}

/// Format cents in Brazilian notation, without currency symbol.
/// Example: 123456 -> "1.234,56", -1 -> "-0,01"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    format!("{}{}", sign, render_cent_digits(&cents.unsigned_abs().to_string()))
}

/// Format cents with the Real symbol, as shown next to the totals.
/// Example: 150000 -> "R$ 1.500,00"
pub fn format_brl(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    format!(
        "{}R$ {}",
        sign,
        render_cent_digits(&cents.unsigned_abs().to_string())
    )
}

/// Render a decimal amount in reais as a localized currency string.
/// The amount is rounded to the nearest cent first.
pub fn format_currency_display(amount: f64) -> String {
    if !amount.is_finite() {
        return format_brl(0);
    }
    format_brl((amount * 100.0).round() as Cents)
}

/// Convert cents to a decimal amount in reais.
pub fn cents_to_amount(cents: Cents) -> f64 {
    cents as f64 / 100.0
}

/// Parse a display string ("12.345,67") into a decimal amount.
///
/// Periods are thousands separators and are dropped, the first comma becomes
/// the decimal point, and the longest numeric prefix is read. Anything that
/// cannot be read yields 0.
pub fn parse_display_to_amount(display: &str) -> f64 {
    let normalized = display.replace('.', "").replacen(',', ".", 1);
    let prefix = numeric_prefix(normalized.trim_start());
    match prefix.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Longest prefix of `s` that reads as a decimal number: optional sign,
/// digits, optional fraction, optional exponent.
fn numeric_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        let frac_digits = frac_end - frac_start;
        if mantissa_digits + frac_digits > 0 {
            mantissa_digits += frac_digits;
            end = frac_end;
        }
    }

    if mantissa_digits == 0 {
        return "";
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }

    &s[..end]
}

/// Parse an amount typed in Brazilian notation into cents.
/// Example: "1.500,00" -> 150000, "12,5" -> 1250, "100" -> 10000
///
/// Unlike [`parse_display_to_amount`] this is strict: it is used for values
/// given on the command line or in batch files, where a typo must be reported.
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    let input = input.strip_prefix("R$").unwrap_or(input).trim();
    if input.is_empty() || input.starts_with('-') {
        return Err(ParseCentsError::InvalidFormat);
    }

    let without_groups = input.replace('.', "");
    let parts: Vec<&str> = without_groups.split(',').collect();
    let cents = match parts.len() {
        1 => {
            // No decimal comma, treat as whole reais
            let units = parse_digits(parts[0])?;
            units
                .checked_mul(100)
                .ok_or(ParseCentsError::InvalidFormat)
        }
        2 => {
            let units = if parts[0].is_empty() {
                0
            } else {
                parse_digits(parts[0])?
            };

            // Pad or truncate the fraction to 2 digits
            let decimal_str = parts[1];
            if !decimal_str.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ParseCentsError::InvalidFormat);
            }
            let decimal_cents = match decimal_str.len() {
                0 => 0,
                1 => parse_digits(decimal_str)? * 10,
                2 => parse_digits(decimal_str)?,
                _ => parse_digits(&decimal_str[..2])?,
            };

            units
                .checked_mul(100)
                .and_then(|c| c.checked_add(decimal_cents))
                .ok_or(ParseCentsError::InvalidFormat)
        }
        _ => Err(ParseCentsError::InvalidFormat),
    }?;

    if cents > MAX_AMOUNT_CENTS {
        return Err(ParseCentsError::OutOfRange);
    }
    Ok(cents)
}

fn parse_digits(s: &str) -> Result<Cents, ParseCentsError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseCentsError::InvalidFormat);
    }
    s.parse().map_err(|_| ParseCentsError::InvalidFormat)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    InvalidFormat,
    OutOfRange,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::InvalidFormat => write!(f, "invalid money format"),
            ParseCentsError::OutOfRange => {
                write!(f, "amount above the limit of {}", format_brl(MAX_AMOUNT_CENTS))
            }
        }
    }
}

impl std::error::Error for ParseCentsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("0"), "0");
        assert_eq!(group_thousands("123"), "123");
        assert_eq!(group_thousands("1234"), "1.234");
        assert_eq!(group_thousands("1234567"), "1.234.567");
    }

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(5000), "50,00");
        assert_eq!(format_cents(123456), "1.234,56");
        assert_eq!(format_cents(1), "0,01");
        assert_eq!(format_cents(0), "0,00");
        assert_eq!(format_cents(-150), "-1,50");
    }

    #[test]
    fn test_format_brl() {
        assert_eq!(format_brl(150000), "R$ 1.500,00");
        assert_eq!(format_brl(0), "R$ 0,00");
        assert_eq!(format_brl(-5), "-R$ 0,05");
    }

    #[test]
    fn test_format_currency_display_rounds_to_cents() {
        assert_eq!(format_currency_display(2000.0), "R$ 2.000,00");
        assert_eq!(format_currency_display(0.1 + 0.2), "R$ 0,30");
        assert_eq!(format_currency_display(f64::NAN), "R$ 0,00");
    }

    #[test]
    fn test_parse_display_to_amount() {
        assert_eq!(parse_display_to_amount("12.345,67"), 12345.67);
        assert_eq!(parse_display_to_amount("0,00"), 0.0);
        assert_eq!(parse_display_to_amount("1,5"), 1.5);
        assert_eq!(parse_display_to_amount("7"), 7.0);
    }

    #[test]
    fn test_parse_display_to_amount_is_permissive() {
        assert_eq!(parse_display_to_amount(""), 0.0);
        assert_eq!(parse_display_to_amount("abc"), 0.0);
        assert_eq!(parse_display_to_amount(","), 0.0);
        assert_eq!(parse_display_to_amount("  12,50 reais"), 12.5);
        assert_eq!(parse_display_to_amount("3,5,7"), 3.5);
    }

    #[test]
    fn test_parse_cents() {
        assert_eq!(parse_cents("1.500,00"), Ok(150000));
        assert_eq!(parse_cents("1500"), Ok(150000));
        assert_eq!(parse_cents("12,34"), Ok(1234));
        assert_eq!(parse_cents("12,5"), Ok(1250));
        assert_eq!(parse_cents(",50"), Ok(50));
        assert_eq!(parse_cents("R$ 10,00"), Ok(1000));
        assert_eq!(parse_cents("100,999"), Ok(10099)); // Truncates
    }

    #[test]
    fn test_parse_cents_invalid() {
        assert!(parse_cents("abc").is_err());
        assert!(parse_cents("").is_err());
        assert!(parse_cents("-5,00").is_err());
        assert!(parse_cents("1,2,3").is_err());
        assert!(parse_cents("99999999999999999999").is_err());
        assert!(parse_cents("1,aé").is_err());
        assert!(parse_cents("1,é").is_err());
        assert!(parse_cents("1,2x").is_err());
    }

    #[test]
    fn test_parse_cents_limit() {
        assert_eq!(
            parse_cents("9.999.999.999.999,99"),
            Ok(MAX_AMOUNT_CENTS)
        );
        assert_eq!(
            parse_cents("10.000.000.000.000,00"),
            Err(ParseCentsError::OutOfRange)
        );
    }
}

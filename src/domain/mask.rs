//! Masked currency input: the "type digits, mask grows" pattern.
//!
//! Every keystroke reformats the whole field from its digits, which are read
//! as cents. Leaving the field normalizes an empty or zero value to `0,00`.

use std::ops::Range;

use super::money::{render_cent_digits, Cents, MAX_AMOUNT_DIGITS};

/// Display value of a field after blur when it holds no amount.
pub const ZERO_DISPLAY: &str = "0,00";

/// Reformat raw field text as a grouped amount with two decimals.
///
/// Non-digit characters are dropped and the remaining digits are cents.
/// Text without any digit yields the minimal `"0"`; the full `"0,00"` only
/// appears after [`on_blur`].
pub fn format_input(raw: &str) -> String {
    let digits = amount_digits(raw);
    if digits.is_empty() {
        return "0".to_string();
    }
    render_cent_digits(&digits)
}

/// Read raw field text as cents, using the same digit rule as [`format_input`].
pub fn cents_from_input(raw: &str) -> Cents {
    let digits = amount_digits(raw);
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        return 0;
    }
    trimmed.parse().unwrap_or_default()
}

/// Cent digits held by the field text. Significant digits past
/// [`MAX_AMOUNT_DIGITS`] are dropped, as a full field ignores keystrokes.
fn amount_digits(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let significant = digits.trim_start_matches('0');
    if significant.len() > MAX_AMOUNT_DIGITS {
        significant[..MAX_AMOUNT_DIGITS].to_string()
    } else {
        digits
    }
}

/// Normalize a field value when it loses focus.
pub fn on_blur(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == "0" || trimmed == ZERO_DISPLAY {
        ZERO_DISPLAY.to_string()
    } else {
        value.to_string()
    }
}

/// Selection applied when a field gains focus: the whole content.
pub fn on_focus(value: &str) -> Range<usize> {
    0..value.len()
}

/// State of one masked amount field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaskedInput {
    value: String,
    selection: Option<Range<usize>>,
}

impl MaskedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// A field already holding a formatted amount.
    pub fn with_cents(cents: Cents) -> Self {
        Self {
            value: render_cent_digits(&cents.max(0).to_string()),
            selection: None,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn selection(&self) -> Option<Range<usize>> {
        self.selection.clone()
    }

    /// Replace the field text as typed and reapply the mask.
    /// Typing over a selection replaces it, so the selection is cleared.
    pub fn input(&mut self, raw: &str) -> &str {
        self.value = format_input(raw);
        self.selection = None;
        &self.value
    }

    pub fn focus(&mut self) {
        self.selection = Some(on_focus(&self.value));
    }

    pub fn blur(&mut self) -> &str {
        self.value = on_blur(&self.value);
        self.selection = None;
        &self.value
    }

    pub fn cents(&self) -> Cents {
        cents_from_input(&self.value)
    }
}

//! Date display patterns and strict text parsing.
//!
//! The picker never hardcodes a display pattern: it asks a
//! [`LocaleFormatter`] for one and parses raw date text against it. Parsing is
//! strict so that half-typed input such as `"02/3"` is rejected rather than
//! guessed at.

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveTime};

use crate::error::PickerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Year,
    Month,
    Day,
    Literal(char),
}

/// A moment-style date display pattern such as `MM/DD/YYYY`.
///
/// Supported tokens are `YYYY`, `MM` and `DD`; every non-letter character is
/// a literal separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePattern {
    source: String,
    tokens: Vec<Token>,
}

impl DatePattern {
    /// Parse a pattern string.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::InvalidPattern`] for unknown letters, partial
    /// tokens (`YY`, `M`), or a pattern missing one of year, month or day.
    pub fn new(pattern: &str) -> Result<Self, PickerError> {
        let chars: Vec<char> = pattern.chars().collect();
        let mut tokens = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let ch = chars[i];
            if !ch.is_ascii_alphabetic() {
                tokens.push(Token::Literal(ch));
                i += 1;
                continue;
            }

            let run = chars[i..].iter().take_while(|&&c| c == ch).count();
            let token = match (ch, run) {
                ('Y', 4) => Token::Year,
                ('M', 2) => Token::Month,
                ('D', 2) => Token::Day,
                _ => {
                    return Err(PickerError::InvalidPattern(format!(
                        "unsupported token '{}' in '{pattern}'",
                        chars[i..i + run].iter().collect::<String>()
                    )));
                }
            };
            tokens.push(token);
            i += run;
        }

        for (required, label) in [(Token::Year, "YYYY"), (Token::Month, "MM"), (Token::Day, "DD")] {
            match tokens.iter().filter(|&&t| t == required).count() {
                1 => {}
                0 => {
                    return Err(PickerError::InvalidPattern(format!(
                        "missing {label} in '{pattern}'"
                    )));
                }
                _ => {
                    return Err(PickerError::InvalidPattern(format!(
                        "duplicate {label} in '{pattern}'"
                    )));
                }
            }
        }

        Ok(Self {
            source: pattern.to_string(),
            tokens,
        })
    }

    /// The ISO calendar-date pattern, `YYYY-MM-DD`.
    pub fn iso() -> Self {
        Self {
            source: "YYYY-MM-DD".to_string(),
            tokens: vec![
                Token::Year,
                Token::Literal('-'),
                Token::Month,
                Token::Literal('-'),
                Token::Day,
            ],
        }
    }

    /// The pattern as written (e.g. `"MM/DD/YYYY"`).
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Strictly parse `text` into a calendar date.
    ///
    /// Returns `None` when the text does not match the pattern digit for digit
    /// or names a date that does not exist.
    pub fn parse(&self, text: &str) -> Option<NaiveDate> {
        let bytes = text.as_bytes();
        let mut pos = 0;
        let (mut year, mut month, mut day) = (None, None, None);

        for token in &self.tokens {
            match token {
                Token::Literal(ch) => {
                    let mut buf = [0u8; 4];
                    let lit = ch.encode_utf8(&mut buf).as_bytes();
                    if !bytes[pos..].starts_with(lit) {
                        return None;
                    }
                    pos += lit.len();
                }
                Token::Year => {
                    year = Some(take_digits(bytes, &mut pos, 4)? as i32);
                }
                Token::Month => {
                    month = Some(take_digits(bytes, &mut pos, 2)?);
                }
                Token::Day => {
                    day = Some(take_digits(bytes, &mut pos, 2)?);
                }
            }
        }

        if pos != bytes.len() {
            return None;
        }

        NaiveDate::from_ymd_opt(year?, month?, day?)
    }

    /// Render `date` in this pattern.
    pub fn format(&self, date: NaiveDate) -> String {
        let mut out = String::with_capacity(self.source.len());
        for token in &self.tokens {
            match token {
                Token::Literal(ch) => out.push(*ch),
                Token::Year => out.push_str(&format!("{:04}", date.year())),
                Token::Month => out.push_str(&format!("{:02}", date.month())),
                Token::Day => out.push_str(&format!("{:02}", date.day())),
            }
        }
        out
    }
}

impl fmt::Display for DatePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Consume exactly `count` ASCII digits starting at `*pos`.
fn take_digits(bytes: &[u8], pos: &mut usize, count: usize) -> Option<u32> {
    let end = pos.checked_add(count)?;
    let digits = bytes.get(*pos..end)?;
    if !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    *pos = end;
    Some(
        digits
            .iter()
            .fold(0u32, |acc, d| acc * 10 + u32::from(d - b'0')),
    )
}

/// Strictly parse time-entry text in `HH:mm` form.
pub fn parse_time_text(text: &str) -> Option<NaiveTime> {
    let bytes = text.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return None;
    }
    let mut pos = 0;
    let hour = take_digits(bytes, &mut pos, 2)?;
    pos += 1;
    let minute = take_digits(bytes, &mut pos, 2)?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Whether `text` is a complete, valid `HH:mm` entry.
pub fn is_valid_time(text: &str) -> bool {
    parse_time_text(text).is_some()
}

// ── Locale formatter service ────────────────────────────────────────────────

/// Supplies the expected date display pattern for a locale.
///
/// Locale tables live outside this crate; callers plug in whatever source of
/// truth their front end already uses.
pub trait LocaleFormatter {
    fn date_pattern(&self, locale: &str) -> DatePattern;
}

/// A formatter that answers every locale with the same pattern.
#[derive(Debug, Clone)]
pub struct FixedFormatter {
    pattern: DatePattern,
}

impl FixedFormatter {
    pub fn new(pattern: DatePattern) -> Self {
        Self { pattern }
    }
}

impl Default for FixedFormatter {
    /// `MM/DD/YYYY`.
    fn default() -> Self {
        Self {
            pattern: DatePattern {
                source: "MM/DD/YYYY".to_string(),
                tokens: vec![
                    Token::Month,
                    Token::Literal('/'),
                    Token::Day,
                    Token::Literal('/'),
                    Token::Year,
                ],
            },
        }
    }
}

impl LocaleFormatter for FixedFormatter {
    fn date_pattern(&self, _locale: &str) -> DatePattern {
        self.pattern.clone()
    }
}

impl<F> LocaleFormatter for F
where
    F: Fn(&str) -> DatePattern,
{
    fn date_pattern(&self, locale: &str) -> DatePattern {
        self(locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn us() -> DatePattern {
        DatePattern::new("MM/DD/YYYY").unwrap()
    }

    // ── DatePattern::new ────────────────────────────────────────────────

    #[test]
    fn test_pattern_accepts_common_layouts() {
        for p in ["MM/DD/YYYY", "DD.MM.YYYY", "YYYY-MM-DD", "DD-MM-YYYY"] {
            assert_eq!(DatePattern::new(p).unwrap().as_str(), p);
        }
    }

    #[test]
    fn test_pattern_rejects_short_year() {
        let err = DatePattern::new("MM/DD/YY").unwrap_err();
        assert!(matches!(err, PickerError::InvalidPattern(_)));
    }

    #[test]
    fn test_pattern_rejects_unknown_letters() {
        assert!(DatePattern::new("MMM DD, YYYY").is_err());
        assert!(DatePattern::new("DD/MM/YYYY hh").is_err());
    }

    #[test]
    fn test_pattern_requires_every_field() {
        assert!(DatePattern::new("MM/YYYY").is_err());
        assert!(DatePattern::new("DD/MM/YYYY/DD").is_err());
    }

    #[test]
    fn test_iso_pattern_matches_parsed() {
        assert_eq!(DatePattern::iso(), DatePattern::new("YYYY-MM-DD").unwrap());
        assert_eq!(FixedFormatter::default().date_pattern("en-US"), us());
    }

    // ── parse / format ──────────────────────────────────────────────────

    #[test]
    fn test_parse_valid_us_date() {
        assert_eq!(
            us().parse("03/10/2024"),
            NaiveDate::from_ymd_opt(2024, 3, 10)
        );
    }

    #[test]
    fn test_parse_rejects_partial_input() {
        assert_eq!(us().parse("02/3"), None);
        assert_eq!(us().parse("2/03/2024"), None);
        assert_eq!(us().parse("02/03/2024 "), None);
        assert_eq!(us().parse(""), None);
    }

    #[test]
    fn test_parse_rejects_nonexistent_date() {
        assert_eq!(us().parse("02/30/2024"), None);
        assert_eq!(us().parse("13/01/2024"), None);
        assert_eq!(us().parse("02/29/2023"), None);
        assert!(us().parse("02/29/2024").is_some());
    }

    #[test]
    fn test_parse_rejects_wrong_separator() {
        assert_eq!(us().parse("03-10-2024"), None);
    }

    #[test]
    fn test_format_pads_fields() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(us().format(date), "03/05/2024");
        assert_eq!(DatePattern::new("DD.MM.YYYY").unwrap().format(date), "05.03.2024");
    }

    // ── time text ───────────────────────────────────────────────────────

    #[test]
    fn test_time_text_strict() {
        assert_eq!(parse_time_text("02:30"), NaiveTime::from_hms_opt(2, 30, 0));
        assert_eq!(parse_time_text("23:59"), NaiveTime::from_hms_opt(23, 59, 0));
        assert!(!is_valid_time("2:30"));
        assert!(!is_valid_time("24:00"));
        assert!(!is_valid_time("12:60"));
        assert!(!is_valid_time("12-30"));
        assert!(!is_valid_time("12:3"));
        assert!(!is_valid_time(""));
    }

    #[test]
    fn test_closure_formatter() {
        let formatter = |locale: &str| {
            if locale.starts_with("de") {
                DatePattern::new("DD.MM.YYYY").unwrap()
            } else {
                DatePattern::iso()
            }
        };
        assert_eq!(formatter.date_pattern("de-DE").as_str(), "DD.MM.YYYY");
        assert_eq!(formatter.date_pattern("sv-SE").as_str(), "YYYY-MM-DD");
    }
}

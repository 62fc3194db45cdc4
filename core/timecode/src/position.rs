use std::fmt;
use std::ops::{Add, Mul};
use std::str::FromStr;

use thiserror::Error;

/// The given text is not a valid time expression.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid time expression: {text:?}")]
pub struct InvalidTime {
    pub text: String,
}

/// Multipliers for the seconds, minutes and hours segments.
const UNITS: [f64; 3] = [1.0, 60.0, 3600.0];

/// A time position inside a sound, expressed as `[[hh:]mm:]ss[.frac]`.
///
/// # Example
/// ```
/// use timecode::Position;
///
/// let position = Position::parse("3:45").unwrap();
/// assert_eq!(position.seconds(), 225.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    seconds: f64,
}

impl Position {
    /// Parse a human time expression into a position.
    pub fn parse(text: &str) -> Result<Self, InvalidTime> {
        text.parse()
    }

    pub fn from_seconds(seconds: f64) -> Self {
        Self { seconds }
    }

    /// The position as a floating-point seconds value.
    pub fn seconds(&self) -> f64 {
        self.seconds
    }
}

/// A whole-number segment (hours, or minutes when present). The leading
/// segment may have any number of digits; interior segments are zero-padded
/// to exactly two.
fn parse_whole(text: &str, leading: bool) -> Option<f64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !leading && text.len() != 2 {
        return None;
    }
    text.parse().ok()
}

/// The trailing seconds segment, `\d{1,2}(\.\d+)?`.
fn parse_seconds(text: &str) -> Option<f64> {
    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (text, None),
    };
    if int_part.is_empty() || int_part.len() > 2 || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if let Some(frac) = frac_part {
        if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }
    text.parse().ok()
}

impl FromStr for Position {
    type Err = InvalidTime;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidTime {
            text: text.to_owned(),
        };

        let raw: Vec<&str> = text.split(':').collect();
        if raw.is_empty() || raw.len() > UNITS.len() {
            return Err(invalid());
        }

        // Seconds-first, matching the unit table.
        let mut segments = Vec::with_capacity(raw.len());
        for (index, segment) in raw.iter().rev().enumerate() {
            let value = if index == 0 {
                parse_seconds(segment)
            } else {
                parse_whole(segment, index + 1 == raw.len())
            };
            segments.push(value.ok_or_else(invalid)?);
        }

        // Seconds and minutes must stay below one unit of the next order.
        // Hours are unbounded.
        if segments.iter().take(2).any(|&segment| segment >= 60.0) {
            return Err(invalid());
        }

        let seconds = segments
            .iter()
            .zip(UNITS)
            .map(|(segment, unit)| segment * unit)
            .sum();
        Ok(Self { seconds })
    }
}

impl From<f64> for Position {
    fn from(seconds: f64) -> Self {
        Self::from_seconds(seconds)
    }
}

impl Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::from_seconds(self.seconds + other.seconds)
    }
}

impl Add<f64> for Position {
    type Output = Self;

    fn add(self, other: f64) -> Self {
        Self::from_seconds(self.seconds + other)
    }
}

impl Mul for Position {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        Self::from_seconds(self.seconds * other.seconds)
    }
}

impl Mul<f64> for Position {
    type Output = Self;

    fn mul(self, other: f64) -> Self {
        Self::from_seconds(self.seconds * other)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_only() {
        assert_eq!(Position::parse("12").unwrap().seconds(), 12.0);
    }

    #[test]
    fn test_minutes_and_seconds() {
        assert_eq!(Position::parse("3:45").unwrap().seconds(), 225.0);
    }

    #[test]
    fn test_hours_minutes_and_seconds() {
        assert_eq!(Position::parse("8:09:10").unwrap().seconds(), 29350.0);
    }

    #[test]
    fn test_fractional_seconds() {
        assert_eq!(Position::parse("1:20.5").unwrap().seconds(), 80.5);
    }

    #[test]
    fn test_interior_minute_segment_requires_two_digits() {
        assert!(Position::parse("8:9:10").is_err());
        assert_eq!(Position::parse("8:09:10").unwrap().seconds(), 29350.0);
    }

    #[test]
    fn test_minute_segment_over_sixty_is_rejected() {
        assert!(Position::parse("123:78:34.45").is_err());
    }

    #[test]
    fn test_second_segment_over_sixty_is_rejected() {
        assert!(Position::parse("75").is_err());
    }

    #[test]
    fn test_malformed_expressions_are_rejected() {
        for text in ["", ":", "1:2:3:4", "abc", "1:-2", "4.", "1:2.5:3"] {
            assert!(Position::parse(text).is_err(), "{text:?} should not parse");
        }
    }

    #[test]
    fn test_add_combines_seek_and_duration() {
        let seek = Position::parse("0.4").unwrap();
        let duration = Position::parse("0.5").unwrap();
        assert_eq!((seek + duration).seconds(), 0.9);
    }

    #[test]
    fn test_multiply_by_numeric() {
        let position = Position::parse("2").unwrap();
        assert_eq!((position * 44100.0).seconds(), 88200.0);
    }
}

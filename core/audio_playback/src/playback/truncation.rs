use timecode::Position;

use crate::error::PlaybackError;

/// A `[start_frame, end_frame)` playback sub-range computed from the seek,
/// duration and end-position options. Resolved once at construction and
/// immutable afterwards; it seeds the stream header and bounds the callback's
/// iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Truncation {
    pub start_frame: usize,
    pub end_frame: usize,
}

impl Truncation {
    /// Resolve the requested options against the sound.
    ///
    /// `duration` takes precedence over `end_position` when both are given;
    /// an end point at or before the seek point is invalid. Frame offsets
    /// truncate toward zero.
    pub fn resolve(
        seek: Option<Position>,
        duration: Option<Position>,
        end_position: Option<Position>,
        sample_rate: u32,
        frame_count: usize,
    ) -> Result<Option<Self>, PlaybackError> {
        if seek.is_none() && duration.is_none() && end_position.is_none() {
            return Ok(None);
        }

        let rate = f64::from(sample_rate);
        let seek_seconds = seek.map_or(0.0, |position| position.seconds());
        let start_frame = (seek_seconds * rate) as usize;

        let end_seconds = match (duration, end_position) {
            (Some(duration), _) => Some(seek_seconds + duration.seconds()),
            (None, Some(end_position)) => Some(end_position.seconds()),
            (None, None) => None,
        };

        let end_frame = match end_seconds {
            Some(end) => {
                if end <= seek_seconds {
                    return Err(PlaybackError::InvalidTruncation {
                        seek: seek_seconds,
                        end,
                    });
                }
                (end * rate) as usize
            }
            None => frame_count,
        };

        Ok(Some(Self {
            start_frame,
            end_frame,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(text: &str) -> Option<Position> {
        Some(Position::parse(text).unwrap())
    }

    #[test]
    fn test_seek_and_duration_resolve_to_frames() {
        let truncation =
            Truncation::resolve(position("0.4"), position("0.5"), None, 44100, 100_000)
                .unwrap()
                .unwrap();

        assert_eq!(truncation.start_frame, 17640);
        assert_eq!(truncation.end_frame, 39690);
    }

    #[test]
    fn test_duration_wins_over_end_position() {
        let truncation = Truncation::resolve(
            position("0.1"),
            position("0.2"),
            position("10"),
            44100,
            1_000_000,
        )
        .unwrap()
        .unwrap();

        assert_eq!(truncation.end_frame, 13230);
    }

    #[test]
    fn test_end_position_before_seek_is_invalid() {
        let result = Truncation::resolve(position("0.7"), None, position("0.6"), 44100, 100_000);
        assert!(matches!(
            result,
            Err(PlaybackError::InvalidTruncation { .. })
        ));
    }

    #[test]
    fn test_zero_duration_is_invalid() {
        let result = Truncation::resolve(position("1"), position("0"), None, 44100, 100_000);
        assert!(matches!(
            result,
            Err(PlaybackError::InvalidTruncation { .. })
        ));
    }

    #[test]
    fn test_seek_alone_runs_to_the_end_of_the_sound() {
        let truncation = Truncation::resolve(position("1"), None, None, 44100, 88200)
            .unwrap()
            .unwrap();

        assert_eq!(truncation.start_frame, 44100);
        assert_eq!(truncation.end_frame, 88200);
    }

    #[test]
    fn test_no_options_means_no_truncation() {
        let truncation = Truncation::resolve(None, None, None, 44100, 100).unwrap();
        assert!(truncation.is_none());
    }
}

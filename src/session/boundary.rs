use std::time::Duration;

use crate::transcript::TranscriptSegment;

/// Cadence of the boundary detector while a session is alive.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Silence allowance after the last transcribed speech before a memory may
/// be cut.
pub const SETTLE_SECONDS: f64 = 15.0;

/// Minimum accumulated word count before a memory may be cut.
pub const MIN_WORDS: usize = 15;

/// Decide whether accumulated speech constitutes a memory.
///
/// `elapsed_secs` is the time since the session's first audio frame. Both
/// gates must hold: the last segment ended more than [`SETTLE_SECONDS`]
/// ago, and the transcript reaches [`MIN_WORDS`] words. The word scan only
/// runs once the time gate holds, and stops as soon as the threshold is
/// reached.
pub fn should_finalize(elapsed_secs: f64, segments: &[TranscriptSegment]) -> bool {
    let Some(last) = segments.last() else {
        return false;
    };
    let Some(end) = last.end else {
        return false;
    };

    if elapsed_secs <= end + SETTLE_SECONDS {
        return false;
    }

    reaches_min_words(segments, MIN_WORDS)
}

fn reaches_min_words(segments: &[TranscriptSegment], target: usize) -> bool {
    let mut total = 0;
    for segment in segments {
        total += segment.word_count();
        if total >= target {
            return true;
        }
    }
    false
}

use super::segment::TranscriptSegment;

/// Segments closer than this to the end of the accumulated sequence are
/// folded into its last entry instead of starting a new one.
pub const MAX_MERGE_GAP_SECS: f64 = 30.0;

/// Coalesce a newly arrived batch into the accumulated segment sequence.
///
/// The batch is first coalesced internally: consecutive entries from the
/// same voice collapse into one, text joined with a single space and `end`
/// carried forward. The head of the coalesced batch is then folded into the
/// last accumulated segment when it is the same voice and the silence gap
/// between them is under [`MAX_MERGE_GAP_SECS`]. Whatever remains is
/// appended. An empty batch leaves the sequence untouched.
pub fn combine_segments(accumulated: &mut Vec<TranscriptSegment>, batch: Vec<TranscriptSegment>) {
    if batch.is_empty() {
        return;
    }

    let mut coalesced: Vec<TranscriptSegment> = Vec::with_capacity(batch.len());
    for segment in batch {
        match coalesced.last_mut() {
            Some(previous) if previous.same_voice(&segment) => {
                previous.text.push(' ');
                previous.text.push_str(&segment.text);
                previous.end = segment.end;
            }
            _ => coalesced.push(segment),
        }
    }

    let mut merged_head = false;
    if let (Some(last), Some(first)) = (accumulated.last_mut(), coalesced.first()) {
        let within_gap = last
            .end
            .map_or(false, |end| first.start - end < MAX_MERGE_GAP_SECS);
        if last.same_voice(first) && within_gap {
            last.text.push(' ');
            last.text.push_str(&first.text);
            last.end = first.end;
            merged_head = true;
        }
    }

    accumulated.extend(coalesced.into_iter().skip(usize::from(merged_head)));
}

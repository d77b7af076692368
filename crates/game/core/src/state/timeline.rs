/// Append-only narrative log, segmented by resolved round.
///
/// A new segment is opened exactly once per resolved round (and once at game
/// start) before any events for that round are recorded; events within a
/// segment keep their recording order. The API deliberately exposes only
/// begin/record, never random-access mutation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timeline {
    segments: Vec<Vec<String>>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the segment that will hold the next round's events.
    pub fn begin_turn(&mut self) {
        self.segments.push(Vec::new());
    }

    /// Appends an event to the most recently opened segment.
    ///
    /// Recording before the first `begin_turn` is a bug in the caller: debug
    /// builds assert, release builds open a segment rather than lose the
    /// event.
    pub fn record(&mut self, text: impl Into<String>) {
        debug_assert!(
            !self.segments.is_empty(),
            "record called before begin_turn"
        );
        if self.segments.is_empty() {
            self.segments.push(Vec::new());
        }
        if let Some(current) = self.segments.last_mut() {
            current.push(text.into());
        }
    }

    pub fn segments(&self) -> &[Vec<String>] {
        &self.segments
    }

    pub fn turn_count(&self) -> usize {
        self.segments.len()
    }

    /// Events of the most recently opened segment.
    pub fn current_turn(&self) -> &[String] {
        self.segments.last().map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_land_in_the_open_segment_in_order() {
        let mut timeline = Timeline::new();
        timeline.begin_turn();
        timeline.record("first");
        timeline.record("second");
        timeline.begin_turn();
        timeline.record("third");

        assert_eq!(timeline.turn_count(), 2);
        assert_eq!(timeline.segments()[0], vec!["first", "second"]);
        assert_eq!(timeline.segments()[1], vec!["third"]);
        assert_eq!(timeline.current_turn(), ["third"]);
    }

    #[test]
    fn a_new_segment_starts_empty() {
        let mut timeline = Timeline::new();
        timeline.begin_turn();
        assert_eq!(timeline.turn_count(), 1);
        assert!(timeline.current_turn().is_empty());
    }
}

//! Free-gap detection inside the working window.

use crate::time::TimeRange;

/// Finds free gaps between occupied ranges.
#[derive(Debug, Clone)]
pub struct GapFinder {
    window: TimeRange,
    /// Minimum gap duration to report (in minutes)
    min_gap_minutes: u32,
}

impl GapFinder {
    pub fn new(window: TimeRange) -> Self {
        Self {
            window,
            min_gap_minutes: crate::time::DEFAULT_DURATION_MINUTES,
        }
    }

    /// Set the minimum gap duration
    pub fn with_min_gap(mut self, minutes: u32) -> Self {
        self.min_gap_minutes = minutes;
        self
    }

    /// Gaps of at least the minimum duration, sorted by start.
    ///
    /// Occupied ranges may lie partly or wholly outside the window and may
    /// overlap each other.
    pub fn find_gaps(&self, occupied: &[TimeRange]) -> Vec<TimeRange> {
        let mut sorted = occupied.to_vec();
        sorted.sort_by_key(|r| (r.start, r.end));

        let mut gaps = Vec::new();
        let mut last_end = self.window.start;

        for range in &sorted {
            if range.end <= last_end {
                continue;
            }
            if range.start >= self.window.end {
                break;
            }

            if range.start > last_end {
                self.push_gap(&mut gaps, last_end, range.start.min(self.window.end));
            }

            last_end = last_end.max(range.end.min(self.window.end));
        }

        if last_end < self.window.end {
            self.push_gap(&mut gaps, last_end, self.window.end);
        }

        gaps
    }

    fn push_gap(&self, gaps: &mut Vec<TimeRange>, start: u32, end: u32) {
        let gap = TimeRange::new(start, end);
        if gap.can_fit(self.min_gap_minutes) {
            gaps.push(gap);
        }
    }
}

//! Viewport math: row positions, visible windows and scroll destinations.

use std::fmt;

use escalator_core::{EscalatorError, IndexRange, Result};

use crate::spacer::SpacerIndex;

/// Where a scroll target should end up inside the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollDestination {
    /// Scroll as little as possible; no-op if the target is fully visible.
    #[default]
    Any,
    /// Target at the start (top or left) of the viewport.
    Start,
    /// Target centered. Does not accept padding.
    Middle,
    /// Target at the end (bottom or right) of the viewport.
    End,
}

impl ScrollDestination {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "any" => Some(Self::Any),
            "start" | "top" | "left" => Some(Self::Start),
            "middle" | "center" => Some(Self::Middle),
            "end" | "bottom" | "right" => Some(Self::End),
            _ => None,
        }
    }
}

impl fmt::Display for ScrollDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scrolling direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollAxis {
    /// `scroll_top`: body rows.
    Vertical,
    /// `scroll_left`: unfrozen columns.
    Horizontal,
}

impl ScrollAxis {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vertical => "vertical",
            Self::Horizontal => "horizontal",
        }
    }
}

/// Scroll position that brings `[target_start, target_end)` to `destination`
/// inside a viewport currently showing `[viewport_start, viewport_start +
/// viewport_len)`. The result is not clamped.
pub fn scroll_pos(
    destination: ScrollDestination,
    target_start: f64,
    target_end: f64,
    viewport_start: f64,
    viewport_len: f64,
    padding: f64,
) -> Result<f64> {
    if destination == ScrollDestination::Middle && padding != 0.0 {
        return Err(EscalatorError::PaddingWithMiddle { padding });
    }
    let viewport_end = viewport_start + viewport_len;
    let pos = match destination {
        ScrollDestination::Any => {
            if target_start - padding < viewport_start {
                target_start - padding
            } else if target_end + padding > viewport_end {
                target_end + padding - viewport_len
            } else {
                viewport_start
            }
        }
        ScrollDestination::Start => target_start - padding,
        ScrollDestination::Middle => {
            let middle = target_start + (target_end - target_start) / 2.0;
            middle - viewport_len / 2.0
        }
        ScrollDestination::End => target_end + padding - viewport_len,
    };
    Ok(pos)
}

/// Vertical geometry of the body: uniform rows plus interleaved spacers.
#[derive(Debug, Clone, Copy)]
pub struct BodyMetrics<'a> {
    pub row_count: usize,
    pub row_height: f64,
    pub spacers: &'a SpacerIndex,
}

impl BodyMetrics<'_> {
    /// Top edge of row `index` (`top(row_count)` is the content height).
    #[must_use]
    pub fn top(&self, index: usize) -> f64 {
        index as f64 * self.row_height + self.spacers.sum_before(index)
    }

    /// Top edge of the spacer below `row`.
    #[must_use]
    pub fn spacer_top(&self, row: usize) -> f64 {
        self.top(row) + self.row_height
    }

    /// Height of all rows and spacers.
    #[must_use]
    pub fn content_height(&self) -> f64 {
        self.row_count as f64 * self.row_height + self.spacers.total()
    }

    /// Number of rows whose top edge is strictly before `y`.
    #[must_use]
    pub fn rows_starting_before(&self, y: f64) -> usize {
        let mut lo = 0;
        let mut hi = self.row_count;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.top(mid) < y {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// Rows whose own extent (spacer excluded) intersects `[y0, y1)`.
    #[must_use]
    pub fn visible_rows(&self, y0: f64, y1: f64) -> IndexRange {
        if self.row_count == 0 || y1 <= y0 {
            let at = self.rows_starting_before(y0).min(self.row_count);
            return IndexRange::new(at, at);
        }
        let mut first = self.rows_starting_before(y0);
        // The row just above y0 may still reach into the viewport.
        if first > 0 && self.top(first - 1) + self.row_height > y0 {
            first -= 1;
        }
        let end = self.rows_starting_before(y1);
        IndexRange::new(first, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spacer::SpacerElement;

    #[test]
    fn any_is_noop_when_visible() {
        let pos = scroll_pos(ScrollDestination::Any, 100.0, 120.0, 50.0, 200.0, 0.0).unwrap();
        assert_eq!(pos, 50.0);
    }

    #[test]
    fn any_picks_nearest_edge() {
        // Above the viewport: align to start.
        let pos = scroll_pos(ScrollDestination::Any, 20.0, 40.0, 100.0, 200.0, 5.0).unwrap();
        assert_eq!(pos, 15.0);
        // Below: align to end.
        let pos = scroll_pos(ScrollDestination::Any, 400.0, 420.0, 100.0, 200.0, 5.0).unwrap();
        assert_eq!(pos, 225.0);
    }

    #[test]
    fn explicit_destinations() {
        let start = scroll_pos(ScrollDestination::Start, 400.0, 420.0, 0.0, 200.0, 10.0);
        assert_eq!(start, Ok(390.0));
        let end = scroll_pos(ScrollDestination::End, 400.0, 420.0, 0.0, 200.0, 10.0);
        assert_eq!(end, Ok(230.0));
        let middle = scroll_pos(ScrollDestination::Middle, 400.0, 420.0, 0.0, 200.0, 0.0);
        assert_eq!(middle, Ok(310.0));
    }

    #[test]
    fn middle_rejects_padding() {
        let err = scroll_pos(ScrollDestination::Middle, 0.0, 10.0, 0.0, 100.0, 3.0).unwrap_err();
        assert_eq!(err, EscalatorError::PaddingWithMiddle { padding: 3.0 });
    }

    #[test]
    fn destination_parse() {
        assert_eq!(ScrollDestination::parse("END"), Some(ScrollDestination::End));
        assert_eq!(ScrollDestination::parse("center"), Some(ScrollDestination::Middle));
        assert_eq!(ScrollDestination::parse("sideways"), None);
    }

    #[test]
    fn body_metrics_with_spacers() {
        let mut spacers = SpacerIndex::new();
        spacers.insert(SpacerElement::new(2, 50.0));
        let body = BodyMetrics {
            row_count: 10,
            row_height: 20.0,
            spacers: &spacers,
        };
        assert_eq!(body.top(2), 40.0);
        assert_eq!(body.top(3), 110.0);
        assert_eq!(body.spacer_top(2), 60.0);
        assert_eq!(body.content_height(), 250.0);

        // 0..60 rows 0-2, 60..110 spacer, 110.. row 3.
        assert_eq!(body.visible_rows(0.0, 60.0), IndexRange::new(0, 3));
        assert_eq!(body.visible_rows(65.0, 100.0), IndexRange::new(3, 3));
        assert_eq!(body.visible_rows(55.0, 111.0), IndexRange::new(2, 4));
        assert_eq!(body.visible_rows(230.0, 400.0), IndexRange::new(9, 10));
    }

    #[test]
    fn empty_body_has_empty_window() {
        let spacers = SpacerIndex::new();
        let body = BodyMetrics {
            row_count: 0,
            row_height: 20.0,
            spacers: &spacers,
        };
        assert!(body.visible_rows(0.0, 100.0).is_empty());
    }
}

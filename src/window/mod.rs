//! Windowed (virtualized) list computation.
//!
//! Only the rows inside the viewport plus a fixed overscan margin are ever
//! materialized, regardless of how many items the result set holds. The
//! functions here are pure and O(1) per call, so the render loop can run
//! them on every scroll tick; a single spacer of `spacer_height` preserves
//! scrollbar proportions and each rendered row sits at `row_offset(index)`.

use serde::Serialize;

/// Default number of rows rendered beyond each visible edge.
pub const DEFAULT_OVERSCAN: usize = 5;
/// Rows shown by the fixed-size loading skeleton.
pub const DEFAULT_SKELETON_ROWS: usize = 8;

/// Half-open row index range `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RowRange {
    pub start: usize,
    pub end: usize,
}

impl RowRange {
    pub const EMPTY: RowRange = RowRange { start: 0, end: 0 };

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn indices(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// Scroll state of the viewport a list is rendered into. `row_height` is the
/// fixed (or estimated) per-row pixel height.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub scroll_top: u32,
    pub viewport_height: u32,
    pub row_height: u32,
    pub overscan: usize,
}

impl Viewport {
    pub fn new(viewport_height: u32, row_height: u32) -> Self {
        Viewport {
            scroll_top: 0,
            viewport_height,
            row_height: row_height.max(1),
            overscan: DEFAULT_OVERSCAN,
        }
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn scrolled_to(mut self, scroll_top: u32) -> Self {
        self.scroll_top = scroll_top;
        self
    }

    /// Rows intersecting the visible viewport, before overscan.
    pub fn visible_range(&self, item_count: usize) -> RowRange {
        if item_count == 0 {
            return RowRange::EMPTY;
        }
        let h = self.row_height as usize;
        let scroll_top = self.scroll_top as usize;
        let start = scroll_top / h;
        let end = (scroll_top + self.viewport_height as usize).div_ceil(h);
        RowRange {
            start: start.min(item_count),
            end: end.min(item_count),
        }
    }

    /// Rows that must actually be materialized: the visible range extended
    /// by `overscan` on both edges, clipped to `[0, item_count)`.
    pub fn rendered_range(&self, item_count: usize) -> RowRange {
        let visible = self.visible_range(item_count);
        if visible.is_empty() {
            return RowRange::EMPTY;
        }
        RowRange {
            start: visible.start.saturating_sub(self.overscan),
            end: (visible.end + self.overscan).min(item_count),
        }
    }

    /// Total scrollable height simulated by the single spacer element.
    pub fn spacer_height(&self, item_count: usize) -> u64 {
        item_count as u64 * self.row_height as u64
    }

    /// Absolute offset of a row within the spacer.
    pub fn row_offset(&self, index: usize) -> u64 {
        index as u64 * self.row_height as u64
    }
}

/// Fixed-size placeholder window shown during a loading transition,
/// independent of the (not yet known) item count.
pub fn skeleton_range(rows: usize) -> RowRange {
    RowRange {
        start: 0,
        end: rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_window_with_overscan() {
        // 10k rows of 64px in a 640px viewport scrolled to 6400px.
        let viewport = Viewport::new(640, 64).with_overscan(5).scrolled_to(6400);

        assert_eq!(
            viewport.visible_range(10_000),
            RowRange {
                start: 100,
                end: 110
            }
        );
        assert_eq!(
            viewport.rendered_range(10_000),
            RowRange {
                start: 95,
                end: 115
            }
        );
    }

    #[test]
    fn rendered_range_clips_at_the_top() {
        let viewport = Viewport::new(640, 64).with_overscan(5);
        assert_eq!(
            viewport.rendered_range(10_000),
            RowRange { start: 0, end: 15 }
        );
    }

    #[test]
    fn rendered_range_clips_at_the_bottom() {
        let viewport = Viewport::new(640, 64).with_overscan(5).scrolled_to(6400);
        // Only 105 items: the window cannot extend past the end.
        assert_eq!(
            viewport.rendered_range(105),
            RowRange {
                start: 95,
                end: 105
            }
        );
    }

    #[test]
    fn partial_rows_round_outward() {
        // 30px of a row peeking in at the top and bottom still renders it.
        let viewport = Viewport::new(100, 64).with_overscan(0).scrolled_to(30);
        assert_eq!(viewport.visible_range(1_000), RowRange { start: 0, end: 3 });
    }

    #[test]
    fn empty_list_renders_nothing() {
        let viewport = Viewport::new(640, 64).with_overscan(5).scrolled_to(6400);
        assert_eq!(viewport.visible_range(0), RowRange::EMPTY);
        assert_eq!(viewport.rendered_range(0), RowRange::EMPTY);
        assert_eq!(viewport.spacer_height(0), 0);
    }

    #[test]
    fn spacer_and_offsets_scale_linearly() {
        let viewport = Viewport::new(640, 64);
        assert_eq!(viewport.spacer_height(10_000), 640_000);
        assert_eq!(viewport.row_offset(0), 0);
        assert_eq!(viewport.row_offset(101), 6464);
    }

    #[test]
    fn skeleton_window_is_independent_of_item_count() {
        assert_eq!(
            skeleton_range(DEFAULT_SKELETON_ROWS),
            RowRange { start: 0, end: 8 }
        );
    }

    #[test]
    fn scrolled_past_the_end_clamps_to_item_count() {
        let viewport = Viewport::new(640, 64).with_overscan(5).scrolled_to(1_000_000);
        let rendered = viewport.rendered_range(50);
        assert!(rendered.is_empty());
    }
}

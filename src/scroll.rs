//! Drag and wheel scrolling for a vertical viewport
//!
//! Offsets follow the usual convention: 0 shows the top of the content and
//! scrolling down moves the offset negative, bounded below by
//! `min_offset = min(0, visible - content)`. Every mutation re-clamps, so
//! `min_offset <= offset <= 0` holds between any two calls.

use serde::{Deserialize, Serialize};

use crate::consts::{MIN_THUMB_HEIGHT, WHEEL_LINE_PX, WHEEL_PAGE_FRACTION};

/// Unit of a wheel delta (mirrors the DOM deltaMode values)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeltaMode {
    #[default]
    Pixel,
    Line,
    Page,
}

impl DeltaMode {
    /// Map a DOM `WheelEvent.deltaMode` value
    pub fn from_dom(mode: u32) -> Self {
        match mode {
            1 => DeltaMode::Line,
            2 => DeltaMode::Page,
            _ => DeltaMode::Pixel,
        }
    }
}

/// Pointer feedback for the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollCursor {
    /// Content fits, nothing to scroll
    Default,
    Grab,
    Grabbing,
}

/// Scroll tuning
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Inset between the viewport edge and the scrolled content (each side)
    pub padding: f32,
    pub min_thumb_height: f32,
    /// Pixels per wheel line
    pub line_height: f32,
    /// Fraction of the viewport scrolled per wheel page
    pub page_fraction: f32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            padding: 0.0,
            min_thumb_height: MIN_THUMB_HEIGHT,
            line_height: WHEEL_LINE_PX,
            page_fraction: WHEEL_PAGE_FRACTION,
        }
    }
}

/// Scrollbar thumb geometry, relative to the top of the track
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollThumb {
    pub y: f32,
    pub height: f32,
}

/// Scroll offset state machine driven by pointer and wheel input
#[derive(Debug, Clone)]
pub struct ScrollController {
    config: ScrollConfig,
    viewport_size: f32,
    content_size: f32,
    offset: f32,
    min_offset: f32,
    is_dragging: bool,
    /// Pointer Y at drag start
    drag_anchor: f32,
    /// Offset at drag start
    drag_anchor_offset: f32,
}

impl Default for ScrollController {
    fn default() -> Self {
        Self::new(ScrollConfig::default())
    }
}

impl ScrollController {
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            config,
            viewport_size: 0.0,
            content_size: 0.0,
            offset: 0.0,
            min_offset: 0.0,
            is_dragging: false,
            drag_anchor: 0.0,
            drag_anchor_offset: 0.0,
        }
    }

    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn min_offset(&self) -> f32 {
        self.min_offset
    }

    /// Upper bound of the offset (top of the content)
    pub fn max_offset(&self) -> f32 {
        0.0
    }

    pub fn viewport_size(&self) -> f32 {
        self.viewport_size
    }

    pub fn content_size(&self) -> f32 {
        self.content_size
    }

    pub fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    /// Viewport extent left for content after padding
    pub fn visible_size(&self) -> f32 {
        (self.viewport_size - self.config.padding * 2.0).max(0.0)
    }

    /// Whether the content overflows the viewport
    pub fn is_scrollable(&self) -> bool {
        self.min_offset < 0.0
    }

    /// Y of the content's top edge relative to the viewport's top edge
    pub fn content_translation(&self) -> f32 {
        self.config.padding + self.offset
    }

    pub fn set_viewport_size(&mut self, size: f32) {
        self.viewport_size = size.max(0.0);
        self.update_bounds();
    }

    pub fn set_content_size(&mut self, size: f32) {
        self.content_size = size.max(0.0);
        self.update_bounds();
    }

    /// Jump to an offset (clamped)
    pub fn scroll_to(&mut self, offset: f32) {
        self.offset = offset.clamp(self.min_offset, 0.0);
    }

    /// Start a drag at pointer `y`. Returns false (and does nothing) when the
    /// content is not scrollable.
    pub fn pointer_down(&mut self, y: f32) -> bool {
        if !self.is_scrollable() {
            return false;
        }
        self.is_dragging = true;
        self.drag_anchor = y;
        self.drag_anchor_offset = self.offset;
        true
    }

    /// Follow the pointer while dragging. Returns true if the offset changed.
    pub fn pointer_move(&mut self, y: f32) -> bool {
        if !self.is_dragging {
            return false;
        }
        let before = self.offset;
        self.scroll_to(self.drag_anchor_offset + (y - self.drag_anchor));
        self.offset != before
    }

    pub fn pointer_up(&mut self) {
        self.is_dragging = false;
    }

    /// Cancel and up-outside end the drag like a normal release
    pub fn pointer_cancel(&mut self) {
        self.pointer_up();
    }

    /// Apply a wheel delta.
    ///
    /// Returns true when the event was consumed; the host must then suppress
    /// the default page scroll and stop propagation.
    pub fn wheel(&mut self, delta_y: f32, mode: DeltaMode) -> bool {
        if !self.is_scrollable() {
            return false;
        }
        let pixels = match mode {
            DeltaMode::Pixel => delta_y,
            DeltaMode::Line => delta_y * self.config.line_height,
            DeltaMode::Page => delta_y * self.viewport_size * self.config.page_fraction,
        };
        self.scroll_to(self.offset - pixels);
        true
    }

    pub fn cursor(&self) -> ScrollCursor {
        if self.is_dragging {
            ScrollCursor::Grabbing
        } else if self.is_scrollable() {
            ScrollCursor::Grab
        } else {
            ScrollCursor::Default
        }
    }

    /// Scrollbar track length (matches the visible area)
    pub fn track_height(&self) -> f32 {
        self.visible_size()
    }

    /// Thumb geometry, or `None` when there is nothing to scroll
    pub fn thumb(&self) -> Option<ScrollThumb> {
        if !self.is_scrollable() || self.content_size <= 0.0 {
            return None;
        }
        let visible = self.visible_size();
        let scrollable = self.content_size - visible;
        if scrollable <= 0.0 {
            return None;
        }

        let track = self.track_height();
        let height = (track * (visible / self.content_size))
            .max(self.config.min_thumb_height)
            .min(track);
        let travel = (track - height).max(0.0);
        let progress = (-self.offset / scrollable).clamp(0.0, 1.0);
        Some(ScrollThumb {
            y: travel * progress,
            height,
        })
    }

    /// Recompute the lower bound and re-clamp the offset
    fn update_bounds(&mut self) {
        self.min_offset = (self.visible_size() - self.content_size).min(0.0);
        self.scroll_to(self.offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scroller(viewport: f32, content: f32) -> ScrollController {
        let mut s = ScrollController::default();
        s.set_viewport_size(viewport);
        s.set_content_size(content);
        s
    }

    #[test]
    fn test_bounds_from_sizes() {
        let s = scroller(400.0, 1000.0);
        assert_eq!(s.min_offset(), -600.0);
        assert_eq!(s.offset(), 0.0);
        assert!(s.is_scrollable());
        assert_eq!(s.cursor(), ScrollCursor::Grab);
    }

    #[test]
    fn test_padding_shrinks_visible_area() {
        let mut s = ScrollController::new(ScrollConfig {
            padding: 12.0,
            ..Default::default()
        });
        s.set_viewport_size(400.0);
        s.set_content_size(390.0);
        assert_eq!(s.visible_size(), 376.0);
        assert_eq!(s.min_offset(), -14.0);
        assert_eq!(s.content_translation(), 12.0);
    }

    #[test]
    fn test_drag_follows_pointer_and_clamps() {
        let mut s = scroller(400.0, 1000.0);
        assert!(s.pointer_down(300.0));
        assert_eq!(s.cursor(), ScrollCursor::Grabbing);
        s.pointer_move(200.0);
        assert_eq!(s.offset(), -100.0);
        s.pointer_move(-900.0);
        assert_eq!(s.offset(), -600.0);
        s.pointer_move(900.0);
        assert_eq!(s.offset(), 0.0);
        s.pointer_up();
        assert!(!s.pointer_move(0.0));
        assert_eq!(s.cursor(), ScrollCursor::Grab);
    }

    #[test]
    fn test_drag_anchors_on_current_offset() {
        let mut s = scroller(400.0, 1000.0);
        s.scroll_to(-250.0);
        s.pointer_down(100.0);
        s.pointer_move(90.0);
        assert_eq!(s.offset(), -260.0);
        s.pointer_cancel();
        assert!(!s.is_dragging());
    }

    #[test]
    fn test_wheel_modes() {
        let mut s = scroller(400.0, 2000.0);
        assert!(s.wheel(100.0, DeltaMode::Pixel));
        assert_eq!(s.offset(), -100.0);
        s.wheel(3.0, DeltaMode::Line);
        assert_eq!(s.offset(), -148.0);
        s.wheel(1.0, DeltaMode::Page);
        assert!((s.offset() - -508.0).abs() < 0.001);
        s.wheel(-100.0, DeltaMode::Page);
        assert_eq!(s.offset(), 0.0);
    }

    #[test]
    fn test_not_scrollable_ignores_input() {
        let mut s = scroller(400.0, 300.0);
        assert!(!s.is_scrollable());
        assert!(!s.pointer_down(10.0));
        assert!(!s.pointer_move(500.0));
        assert!(!s.wheel(100.0, DeltaMode::Pixel));
        assert_eq!(s.offset(), 0.0);
        assert_eq!(s.cursor(), ScrollCursor::Default);
        assert!(s.thumb().is_none());
    }

    #[test]
    fn test_content_shrink_reclamps() {
        let mut s = scroller(400.0, 1000.0);
        s.scroll_to(-600.0);
        s.set_content_size(500.0);
        assert_eq!(s.offset(), -100.0);
        s.set_viewport_size(800.0);
        assert_eq!(s.offset(), 0.0);
    }

    #[test]
    fn test_thumb_geometry() {
        let mut s = scroller(400.0, 800.0);
        let thumb = s.thumb().unwrap();
        assert_eq!(thumb.height, 200.0);
        assert_eq!(thumb.y, 0.0);

        s.scroll_to(-400.0);
        let thumb = s.thumb().unwrap();
        assert_eq!(thumb.y, 200.0);

        s.scroll_to(-200.0);
        assert_eq!(s.thumb().unwrap().y, 100.0);
    }

    #[test]
    fn test_thumb_minimum_height() {
        let s = scroller(100.0, 100_000.0);
        assert_eq!(s.thumb().unwrap().height, MIN_THUMB_HEIGHT);
    }

    #[test]
    fn test_delta_mode_from_dom() {
        assert_eq!(DeltaMode::from_dom(0), DeltaMode::Pixel);
        assert_eq!(DeltaMode::from_dom(1), DeltaMode::Line);
        assert_eq!(DeltaMode::from_dom(2), DeltaMode::Page);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Down(f32),
        Move(f32),
        Up,
        Wheel(f32, u32),
        Viewport(f32),
        Content(f32),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (-2000.0f32..2000.0).prop_map(Op::Down),
            (-2000.0f32..2000.0).prop_map(Op::Move),
            Just(Op::Up),
            ((-50.0f32..50.0), 0u32..3).prop_map(|(d, m)| Op::Wheel(d, m)),
            (0.0f32..1500.0).prop_map(Op::Viewport),
            (0.0f32..5000.0).prop_map(Op::Content),
        ]
    }

    proptest! {
        #[test]
        fn prop_offset_stays_in_bounds(ops in prop::collection::vec(op(), 0..80)) {
            let mut s = scroller(400.0, 1200.0);
            for op in ops {
                match op {
                    Op::Down(y) => { s.pointer_down(y); }
                    Op::Move(y) => { s.pointer_move(y); }
                    Op::Up => s.pointer_up(),
                    Op::Wheel(d, m) => { s.wheel(d, DeltaMode::from_dom(m)); }
                    Op::Viewport(v) => s.set_viewport_size(v),
                    Op::Content(c) => s.set_content_size(c),
                }
                prop_assert!(s.min_offset() <= s.offset());
                prop_assert!(s.offset() <= 0.0);
                if s.content_size() <= s.visible_size() {
                    prop_assert_eq!(s.offset(), 0.0);
                }
            }
        }
    }
}

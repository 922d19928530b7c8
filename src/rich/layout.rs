//! Incremental rich text layout
//!
//! Tokens are placed strictly in source order. Image references suspend the
//! layout while their image resolves. The first poll, every resumption and
//! the final apply compare the version captured when `layout()` was called
//! with the owner's current version, and abandon the run if a newer call has
//! started since. An abandoned run never touches the visible result.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use glam::Vec2;

use super::measure::TextMeasure;
use super::resolver::{ImageHandle, ImageResolver};
use super::token::{RichToken, split_segments, tokenize};
use crate::consts::{EMOJI_GAP, EMOJI_SIZE, LINE_HEIGHT};

/// Line and image metrics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutStyle {
    pub line_height: f32,
    /// Images are drawn as squares of this size
    pub image_size: f32,
    /// Space after each image
    pub image_gap: f32,
}

impl Default for LayoutStyle {
    fn default() -> Self {
        Self {
            line_height: LINE_HEIGHT,
            image_size: EMOJI_SIZE,
            image_gap: EMOJI_GAP,
        }
    }
}

/// What a placed atom draws
#[derive(Debug, Clone, PartialEq)]
pub enum AtomKind {
    Text(String),
    Image { name: String, handle: ImageHandle },
}

/// A positioned glyph run or image
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedAtom {
    pub kind: AtomKind,
    /// Top-left corner relative to the run origin
    pub position: Vec2,
    pub size: Vec2,
    /// Zero-based line index
    pub line: usize,
}

/// Result of one completed layout
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutRun {
    pub atoms: Vec<PlacedAtom>,
    pub bounding_size: Vec2,
    pub line_count: usize,
}

impl LayoutRun {
    pub fn width(&self) -> f32 {
        self.bounding_size.x
    }

    pub fn height(&self) -> f32 {
        self.bounding_size.y
    }

    /// Source text rebuilt from the atoms in placement order
    pub fn to_source(&self) -> String {
        self.atoms
            .iter()
            .map(|atom| match &atom.kind {
                AtomKind::Text(text) => text.clone(),
                AtomKind::Image { name, .. } => format!("{{{name}}}"),
            })
            .collect()
    }

    /// Token sequence of the placed atoms
    pub fn to_tokens(&self) -> Vec<RichToken> {
        tokenize(&self.to_source())
    }
}

/// Line-filling cursor used while a layout is in progress
struct Placer<'m> {
    style: LayoutStyle,
    measure: &'m dyn TextMeasure,
    max_width: f32,
    atoms: Vec<PlacedAtom>,
    x: f32,
    line: usize,
    atoms_on_line: usize,
    extent: f32,
}

impl<'m> Placer<'m> {
    fn new(style: LayoutStyle, measure: &'m dyn TextMeasure, max_width: f32) -> Self {
        Self {
            style,
            measure,
            max_width,
            atoms: Vec::new(),
            x: 0.0,
            line: 0,
            atoms_on_line: 0,
            extent: 0.0,
        }
    }

    fn place_text(&mut self, text: &str) {
        for segment in split_segments(text) {
            let width = self.measure.measure(segment);
            self.place(
                AtomKind::Text(segment.to_owned()),
                width,
                Vec2::new(width, self.style.line_height),
                0.0,
            );
        }
    }

    fn place_image(&mut self, name: String, handle: ImageHandle) {
        let size = self.style.image_size;
        let advance = size + self.style.image_gap;
        let y_offset = (self.style.line_height - size) / 2.0;
        self.place(AtomKind::Image { name, handle }, advance, Vec2::splat(size), y_offset);
    }

    /// Place one atom, wrapping first if it would overflow a non-empty line.
    /// An empty line always accepts the atom, however wide.
    fn place(&mut self, kind: AtomKind, advance: f32, size: Vec2, y_offset: f32) {
        if self.atoms_on_line > 0 && self.x + advance > self.max_width {
            self.x = 0.0;
            self.line += 1;
            self.atoms_on_line = 0;
        }
        let y = self.line as f32 * self.style.line_height;
        self.atoms.push(PlacedAtom {
            kind,
            position: Vec2::new(self.x, y + y_offset),
            size,
            line: self.line,
        });
        self.extent = self.extent.max(self.x + size.x);
        self.x += advance;
        self.atoms_on_line += 1;
    }

    fn finish(self) -> LayoutRun {
        let line_count = if self.atoms.is_empty() { 0 } else { self.line + 1 };
        LayoutRun {
            atoms: self.atoms,
            bounding_size: Vec2::new(self.extent, line_count as f32 * self.style.line_height),
            line_count,
        }
    }
}

/// Layout owner: holds the version counter and the last applied run
pub struct IncrementalRichLayout {
    style: LayoutStyle,
    measure: Rc<dyn TextMeasure>,
    version: Cell<u64>,
    visible: RefCell<Option<LayoutRun>>,
}

impl IncrementalRichLayout {
    pub fn new(measure: Rc<dyn TextMeasure>) -> Self {
        Self::with_style(measure, LayoutStyle::default())
    }

    pub fn with_style(measure: Rc<dyn TextMeasure>, style: LayoutStyle) -> Self {
        Self {
            style,
            measure,
            version: Cell::new(0),
            visible: RefCell::new(None),
        }
    }

    pub fn style(&self) -> LayoutStyle {
        self.style
    }

    /// Current version; bumped by every `layout()` call and by `invalidate()`
    pub fn version(&self) -> u64 {
        self.version.get()
    }

    /// Last run that completed without being superseded
    pub fn visible_run(&self) -> Option<LayoutRun> {
        self.visible.borrow().clone()
    }

    /// Abandon any pending layout without starting a new one
    pub fn invalidate(&self) {
        self.version.set(self.version.get() + 1);
    }

    /// Lay out `source` within `max_width`.
    ///
    /// The version is bumped when this is called, not when the future is first
    /// polled. Resolves to `None` if a newer call started before this one
    /// finished; otherwise the run becomes the visible run and is returned.
    pub fn layout<'a>(
        &'a self,
        source: &'a str,
        max_width: f32,
        resolver: &'a ImageResolver,
    ) -> impl Future<Output = Option<LayoutRun>> + 'a {
        self.invalidate();
        let version = self.version.get();

        async move {
            // A newer call may have started before this one was first polled
            if self.is_stale(version) {
                log::debug!("Discarding stale layout v{}", version);
                return None;
            }
            let mut placer = Placer::new(self.style, self.measure.as_ref(), max_width);

            for token in tokenize(source) {
                match token {
                    RichToken::Text(text) => placer.place_text(&text),
                    RichToken::ImageRef(name) => {
                        let mut handle = resolver.resolve(&name).await;
                        if self.is_stale(version) {
                            log::debug!("Discarding stale layout v{}", version);
                            return None;
                        }

                        if handle.is_none() {
                            if let Some(fallback) = resolver.default_key().filter(|key| *key != name) {
                                handle = resolver.resolve(fallback).await;
                                if self.is_stale(version) {
                                    log::debug!("Discarding stale layout v{}", version);
                                    return None;
                                }
                            }
                        }

                        match handle {
                            Some(handle) => placer.place_image(name, handle),
                            None => {
                                log::debug!("No image for {{{}}}, placing it as text", name);
                                placer.place_text(&format!("{{{name}}}"));
                            }
                        }
                    }
                }
            }

            let run = placer.finish();
            if self.is_stale(version) {
                log::debug!("Discarding stale layout v{}", version);
                return None;
            }
            *self.visible.borrow_mut() = Some(run.clone());
            Some(run)
        }
    }

    fn is_stale(&self, version: u64) -> bool {
        self.version.get() != version
    }
}

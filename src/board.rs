//! Dialogue board
//!
//! Loads a dialogue document (entries, emoji and avatar lookups), lays every
//! entry out as a speech bubble and scrolls the resulting column inside a
//! clipped viewport. All methods take `&self` so a host can keep the board in
//! an `Rc` while a render future is in flight.
//!
//! Renders are version-guarded like the layouts they drive: a newer
//! `render_dialogue()` call makes older ones return early, and only a render
//! that completes replaces the visible bubbles.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;

use async_trait::async_trait;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::rich::{ImageLoader, ImageResolver, IncrementalRichLayout, LayoutRun, LayoutStyle, TextMeasure};
use crate::scroll::{DeltaMode, ScrollConfig, ScrollController, ScrollCursor, ScrollThumb};

/// Inset of the message column inside the viewport (each side)
pub const VIEWPORT_PADDING: f32 = 12.0;
pub const SCROLLBAR_WIDTH: f32 = 6.0;
pub const SCROLLBAR_GAP: f32 = 8.0;
/// Text inset inside a bubble
pub const BUBBLE_PADDING: Vec2 = Vec2::new(12.0, 8.0);
pub const BUBBLE_MIN_SIZE: Vec2 = Vec2::new(100.0, 36.0);
pub const MESSAGE_GAP: f32 = 12.0;
/// Alternating bubble fills
pub const BUBBLE_COLORS: [u32; 2] = [0x0a2b45, 0x134264];
const MAX_TEXT_WIDTH: f32 = 500.0;
const MIN_TEXT_WIDTH: f32 = 120.0;

const MIN_VIEWPORT_WIDTH: f32 = 220.0;
const MAX_VIEWPORT_WIDTH: f32 = 720.0;
/// Below this scene width the compact paddings apply
const COMPACT_BREAKPOINT: f32 = 768.0;

/// One line of dialogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueEntry {
    pub name: String,
    #[serde(default)]
    pub text: String,
}

/// Name to URL pair for inline images
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedImage {
    pub name: String,
    pub url: String,
}

/// Which side a speaker's bubbles hang on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarSide {
    #[default]
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Avatar {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub position: AvatarSide,
}

/// The dialogue document as served
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentDocument {
    #[serde(default)]
    pub dialogue: Vec<DialogueEntry>,
    #[serde(default, rename = "emojies", alias = "emojis")]
    pub emojis: Vec<NamedImage>,
    #[serde(default)]
    pub avatars: Vec<Avatar>,
}

impl ContentDocument {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Where the dialogue document comes from (HTTP, bundled file, test double)
#[async_trait(?Send)]
pub trait ContentSource {
    async fn fetch(&self) -> Result<String>;
}

/// A document already held in memory
#[derive(Debug, Clone)]
pub struct StaticContent(pub String);

#[async_trait(?Send)]
impl ContentSource for StaticContent {
    async fn fetch(&self) -> Result<String> {
        if self.0.trim().is_empty() {
            return Err(Error::Fetch("empty dialogue document".into()));
        }
        Ok(self.0.clone())
    }
}

/// A laid-out dialogue entry
#[derive(Debug, Clone, PartialEq)]
pub struct MessageBubble {
    pub speaker: String,
    pub side: AvatarSide,
    pub avatar_url: Option<String>,
    /// Top-left corner within the message column
    pub position: Vec2,
    pub size: Vec2,
    pub color: u32,
    pub text: LayoutRun,
}

impl MessageBubble {
    /// Top-left corner of the text run within the message column
    pub fn text_origin(&self) -> Vec2 {
        self.position + BUBBLE_PADDING
    }
}

/// Scrollable dialogue of speech bubbles
pub struct DialogueBoard {
    measure: Rc<dyn TextMeasure>,
    style: LayoutStyle,
    loader: Rc<dyn ImageLoader>,
    default_emoji: Option<String>,
    resolver: RefCell<Rc<ImageResolver>>,
    dialogue: RefCell<Rc<[DialogueEntry]>>,
    avatars: RefCell<HashMap<String, Avatar>>,
    viewport: Cell<Vec2>,
    scroll: RefCell<ScrollController>,
    render_version: Cell<u64>,
    bubbles: RefCell<Vec<MessageBubble>>,
}

impl DialogueBoard {
    pub fn new(loader: Rc<dyn ImageLoader>, measure: Rc<dyn TextMeasure>) -> Self {
        let viewport = Vec2::new(500.0, 400.0);
        let mut scroll = ScrollController::new(ScrollConfig {
            padding: VIEWPORT_PADDING,
            ..ScrollConfig::default()
        });
        scroll.set_viewport_size(viewport.y);

        Self {
            measure,
            style: LayoutStyle::default(),
            resolver: RefCell::new(Rc::new(ImageResolver::new(Rc::clone(&loader)))),
            loader,
            default_emoji: None,
            dialogue: RefCell::new(Rc::from(Vec::new())),
            avatars: RefCell::new(HashMap::new()),
            viewport: Cell::new(viewport),
            scroll: RefCell::new(scroll),
            render_version: Cell::new(0),
            bubbles: RefCell::new(Vec::new()),
        }
    }

    /// Emoji name substituted for unknown references
    pub fn with_default_emoji(mut self, name: Option<String>) -> Self {
        self.default_emoji = name;
        self
    }

    pub fn with_style(mut self, style: LayoutStyle) -> Self {
        self.style = style;
        self
    }

    /// Fetch and install a document, then render it
    pub async fn init(&self, source: &dyn ContentSource) -> Result<bool> {
        self.load_content(source).await?;
        Ok(self.render_dialogue().await)
    }

    /// Fetch and parse the document and rebuild the name lookups.
    /// Does not render. A document without dialogue is rejected.
    pub async fn load_content(&self, source: &dyn ContentSource) -> Result<()> {
        let json = source.fetch().await?;
        let document = ContentDocument::from_json(&json)?;
        if document.dialogue.is_empty() {
            return Err(Error::Content("document has no dialogue entries".into()));
        }
        self.install(document);
        Ok(())
    }

    /// Install an already parsed document
    pub fn install(&self, document: ContentDocument) {
        let mut resolver = ImageResolver::new(Rc::clone(&self.loader));
        for emoji in &document.emojis {
            resolver.insert(emoji.name.clone(), emoji.url.clone());
        }
        resolver.set_default_key(self.default_emoji.clone());

        let avatars: HashMap<String, Avatar> = document
            .avatars
            .into_iter()
            .map(|avatar| (avatar.name.clone(), avatar))
            .collect();

        log::info!(
            "Dialogue loaded: {} entries, {} emojis, {} avatars",
            document.dialogue.len(),
            document.emojis.len(),
            avatars.len()
        );

        *self.resolver.borrow_mut() = Rc::new(resolver);
        *self.avatars.borrow_mut() = avatars;
        *self.dialogue.borrow_mut() = Rc::from(document.dialogue);
    }

    pub fn entry_count(&self) -> usize {
        self.dialogue.borrow().len()
    }

    pub fn render_version(&self) -> u64 {
        self.render_version.get()
    }

    /// Lay out every entry and replace the visible bubbles.
    ///
    /// The version is bumped when this is called. Resolves to false if a newer
    /// render started first; the visible bubbles are then left as they were.
    pub fn render_dialogue(&self) -> impl Future<Output = bool> + '_ {
        self.render_version.set(self.render_version.get() + 1);
        let version = self.render_version.get();
        let dialogue = self.dialogue.borrow().clone();
        let resolver = self.resolver.borrow().clone();
        let avatars = self.avatars.borrow().clone();
        let text_width = self.max_text_width();
        let column_width = self.column_width();

        async move {
            if self.render_version.get() != version {
                log::debug!("Dialogue render v{} superseded", version);
                return false;
            }
            let mut bubbles = Vec::with_capacity(dialogue.len());
            let mut next_y = 0.0;

            for (index, entry) in dialogue.iter().enumerate() {
                let layout = IncrementalRichLayout::with_style(Rc::clone(&self.measure), self.style);
                let run = layout.layout(&entry.text, text_width, &resolver).await;
                if self.render_version.get() != version {
                    log::debug!("Dialogue render v{} superseded", version);
                    return false;
                }
                let Some(run) = run else {
                    return false;
                };

                let size = Vec2::new(
                    (text_width + BUBBLE_PADDING.x * 2.0).min((run.width() + BUBBLE_PADDING.x * 2.0).max(BUBBLE_MIN_SIZE.x)),
                    (run.height() + BUBBLE_PADDING.y * 2.0).max(BUBBLE_MIN_SIZE.y),
                );
                let avatar = avatars.get(&entry.name);
                let side = avatar.map(|a| a.position).unwrap_or_default();
                let x = match side {
                    AvatarSide::Left => 0.0,
                    AvatarSide::Right => (column_width - size.x).max(0.0),
                };

                bubbles.push(MessageBubble {
                    speaker: entry.name.clone(),
                    side,
                    avatar_url: avatar.map(|a| a.url.clone()),
                    position: Vec2::new(x, next_y),
                    size,
                    color: BUBBLE_COLORS[index % BUBBLE_COLORS.len()],
                    text: run,
                });
                next_y += size.y + MESSAGE_GAP;
            }

            if self.render_version.get() != version {
                log::debug!("Dialogue render v{} superseded", version);
                return false;
            }
            let content_height = (next_y - MESSAGE_GAP).max(0.0);
            self.scroll.borrow_mut().set_content_size(content_height);
            *self.bubbles.borrow_mut() = bubbles;
            log::debug!("Dialogue render v{} done, content height {:.0}", version, content_height);
            true
        }
    }

    /// Currently visible bubbles
    pub fn bubbles(&self) -> Vec<MessageBubble> {
        self.bubbles.borrow().clone()
    }

    /// Fit the viewport to a scene of `width` x `height`.
    ///
    /// Explicit paddings override the breakpoint defaults. Returns true when
    /// the size changed while content is loaded; the caller should then run
    /// `render_dialogue()` again.
    pub fn resize(&self, width: f32, height: f32, top_padding: Option<f32>, bottom_padding: Option<f32>) -> bool {
        let compact = width < COMPACT_BREAKPOINT;
        let horizontal = if compact { 20.0 } else { 56.0 };
        let top = top_padding.unwrap_or(if compact { 88.0 } else { 112.0 });
        let bottom = bottom_padding.unwrap_or(if compact { 24.0 } else { 40.0 });

        let next = Vec2::new(
            (width - horizontal * 2.0).clamp(MIN_VIEWPORT_WIDTH, MAX_VIEWPORT_WIDTH),
            (height - top - bottom).max(1.0),
        );
        let changed = next != self.viewport.get();
        self.viewport.set(next);
        self.scroll.borrow_mut().set_viewport_size(next.y);

        changed && self.entry_count() > 0
    }

    pub fn viewport_size(&self) -> Vec2 {
        self.viewport.get()
    }

    /// Width available to a bubble's text
    pub fn max_text_width(&self) -> f32 {
        let reserve = SCROLLBAR_WIDTH + SCROLLBAR_GAP;
        let available = self.viewport.get().x - VIEWPORT_PADDING * 2.0 - BUBBLE_PADDING.x * 2.0 - reserve;
        available.max(MIN_TEXT_WIDTH).min(MAX_TEXT_WIDTH)
    }

    /// Width of the message column (viewport minus padding and scrollbar)
    pub fn column_width(&self) -> f32 {
        self.viewport.get().x - VIEWPORT_PADDING * 2.0 - SCROLLBAR_WIDTH - SCROLLBAR_GAP
    }

    pub fn content_height(&self) -> f32 {
        self.scroll.borrow().content_size()
    }

    /// Y of the message column's top relative to the viewport top
    pub fn content_translation(&self) -> f32 {
        self.scroll.borrow().content_translation()
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll.borrow().offset()
    }

    pub fn is_scrollable(&self) -> bool {
        self.scroll.borrow().is_scrollable()
    }

    pub fn pointer_down(&self, y: f32) -> bool {
        self.scroll.borrow_mut().pointer_down(y)
    }

    pub fn pointer_move(&self, y: f32) -> bool {
        self.scroll.borrow_mut().pointer_move(y)
    }

    pub fn pointer_up(&self) {
        self.scroll.borrow_mut().pointer_up();
    }

    pub fn pointer_cancel(&self) {
        self.scroll.borrow_mut().pointer_cancel();
    }

    /// Returns true when the host must suppress the default wheel action
    pub fn wheel(&self, delta_y: f32, mode: DeltaMode) -> bool {
        self.scroll.borrow_mut().wheel(delta_y, mode)
    }

    pub fn cursor(&self) -> ScrollCursor {
        self.scroll.borrow().cursor()
    }

    /// Thumb geometry relative to the track top
    pub fn thumb(&self) -> Option<ScrollThumb> {
        self.scroll.borrow().thumb()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::LINE_HEIGHT;
    use crate::rich::{AverageGlyphMeasure, ImageHandle};
    use futures::channel::oneshot;
    use futures::executor::block_on;

    const DOCUMENT: &str = r#"{
        "dialogue": [
            {"name": "Sheldon", "text": "Hello {satisfied}"},
            {"name": "Leonard", "text": "Hi"},
            {"name": "Penny", "text": "Who dis {unknownEmoji}"}
        ],
        "emojies": [
            {"name": "satisfied", "url": "https://img.example/satisfied.png"}
        ],
        "avatars": [
            {"name": "Sheldon", "url": "https://img.example/sheldon.png", "position": "left"},
            {"name": "Leonard", "url": "https://img.example/leonard.png", "position": "right"}
        ]
    }"#;

    struct InstantLoader;

    #[async_trait(?Send)]
    impl ImageLoader for InstantLoader {
        async fn load(&self, url: &str) -> Result<ImageHandle> {
            Ok(ImageHandle {
                url: url.to_owned(),
                size: Vec2::splat(64.0),
            })
        }
    }

    #[derive(Default)]
    struct GatedLoader {
        pending: RefCell<Vec<(String, oneshot::Sender<ImageHandle>)>>,
    }

    impl GatedLoader {
        fn open(&self) {
            for (url, tx) in self.pending.borrow_mut().drain(..) {
                let _ = tx.send(ImageHandle {
                    url,
                    size: Vec2::splat(64.0),
                });
            }
        }
    }

    #[async_trait(?Send)]
    impl ImageLoader for GatedLoader {
        async fn load(&self, url: &str) -> Result<ImageHandle> {
            let (tx, rx) = oneshot::channel();
            self.pending.borrow_mut().push((url.to_owned(), tx));
            rx.await.map_err(|_| Error::Fetch("gate dropped".into()))
        }
    }

    fn board() -> DialogueBoard {
        DialogueBoard::new(Rc::new(InstantLoader), Rc::new(AverageGlyphMeasure::default()))
    }

    #[test]
    fn test_parse_document() {
        let doc = ContentDocument::from_json(DOCUMENT).unwrap();
        assert_eq!(doc.dialogue.len(), 3);
        assert_eq!(doc.emojis[0].name, "satisfied");
        assert_eq!(doc.avatars[1].position, AvatarSide::Right);

        let alias = ContentDocument::from_json(r#"{"emojis": [{"name": "a", "url": "b"}]}"#).unwrap();
        assert_eq!(alias.emojis.len(), 1);
        assert!(alias.dialogue.is_empty());

        assert!(matches!(ContentDocument::from_json("{nope"), Err(Error::Json(_))));
    }

    #[test]
    fn test_empty_source_is_fetch_error() {
        let board = board();
        let result = block_on(board.load_content(&StaticContent(String::new())));
        assert!(matches!(result, Err(Error::Fetch(_))));
        assert_eq!(board.entry_count(), 0);
    }

    #[test]
    fn test_document_without_dialogue_is_rejected() {
        let board = board();
        let result = block_on(board.load_content(&StaticContent(r#"{"emojies": []}"#.into())));
        assert!(matches!(result, Err(Error::Content(_))));
    }

    #[test]
    fn test_render_builds_bubbles() {
        let board = board();
        assert!(block_on(board.init(&StaticContent(DOCUMENT.into()))).unwrap());

        let bubbles = board.bubbles();
        assert_eq!(bubbles.len(), 3);

        // "Hi" is narrow: clamped up to the minimum bubble width
        assert_eq!(bubbles[1].size, Vec2::new(BUBBLE_MIN_SIZE.x, LINE_HEIGHT + BUBBLE_PADDING.y * 2.0));
        assert_eq!(bubbles[1].side, AvatarSide::Right);
        assert_eq!(bubbles[1].position.x, board.column_width() - BUBBLE_MIN_SIZE.x);
        assert_eq!(bubbles[1].avatar_url.as_deref(), Some("https://img.example/leonard.png"));

        // Unknown speaker hangs left without an avatar
        assert_eq!(bubbles[2].side, AvatarSide::Left);
        assert!(bubbles[2].avatar_url.is_none());

        assert_eq!(bubbles[0].color, BUBBLE_COLORS[0]);
        assert_eq!(bubbles[1].color, BUBBLE_COLORS[1]);
        assert_eq!(bubbles[2].color, BUBBLE_COLORS[0]);

        // Stacked with a fixed gap
        let second_top = bubbles[0].size.y + MESSAGE_GAP;
        assert_eq!(bubbles[1].position.y, second_top);
        let last = &bubbles[2];
        assert_eq!(board.content_height(), last.position.y + last.size.y);

        assert_eq!(bubbles[2].text.to_source(), "Who dis {unknownEmoji}");
    }

    #[test]
    fn test_default_emoji_substitutes_unknown() {
        let board = board().with_default_emoji(Some("satisfied".into()));
        block_on(board.init(&StaticContent(DOCUMENT.into()))).unwrap();
        let penny = &board.bubbles()[2];
        let images = penny
            .text
            .atoms
            .iter()
            .filter(|a| matches!(a.kind, crate::rich::AtomKind::Image { .. }))
            .count();
        assert_eq!(images, 1);
    }

    #[test]
    fn test_text_width_bounds() {
        let board = board();
        board.resize(1920.0, 1080.0, None, None);
        assert_eq!(board.viewport_size().x, MAX_VIEWPORT_WIDTH);
        assert_eq!(board.max_text_width(), MAX_TEXT_WIDTH);

        board.resize(200.0, 600.0, None, None);
        assert_eq!(board.viewport_size().x, MIN_VIEWPORT_WIDTH);
        assert_eq!(board.max_text_width(), MIN_VIEWPORT_WIDTH - 62.0);

        board.resize(600.0, 600.0, None, None);
        // 600 - 40 = 560 wide, minus 24 + 24 + 14
        assert_eq!(board.max_text_width(), 498.0);
    }

    #[test]
    fn test_resize_paddings() {
        let board = board();
        board.resize(1024.0, 800.0, None, None);
        assert_eq!(board.viewport_size(), Vec2::new(720.0, 800.0 - 112.0 - 40.0));

        board.resize(700.0, 800.0, None, None);
        assert_eq!(board.viewport_size(), Vec2::new(660.0, 800.0 - 88.0 - 24.0));

        board.resize(700.0, 800.0, Some(10.0), Some(10.0));
        assert_eq!(board.viewport_size().y, 780.0);

        board.resize(700.0, 50.0, None, None);
        assert_eq!(board.viewport_size().y, 1.0);
    }

    #[test]
    fn test_resize_requests_relayout_only_with_content() {
        let board = board();
        assert!(!board.resize(1024.0, 800.0, None, None));

        board.install(ContentDocument::from_json(DOCUMENT).unwrap());
        assert!(board.resize(700.0, 800.0, None, None));
        assert!(!board.resize(700.0, 800.0, None, None));
    }

    #[test]
    fn test_overflowing_dialogue_scrolls() {
        let board = board();
        let entries: Vec<DialogueEntry> = (0..30)
            .map(|i| DialogueEntry {
                name: "Sheldon".into(),
                text: format!("Line number {i}"),
            })
            .collect();
        board.install(ContentDocument {
            dialogue: entries,
            ..ContentDocument::default()
        });
        board.resize(1024.0, 600.0, None, None);
        assert!(block_on(board.render_dialogue()));

        assert!(board.is_scrollable());
        assert_eq!(board.cursor(), ScrollCursor::Grab);
        assert!(board.wheel(3.0, DeltaMode::Line));
        assert_eq!(board.scroll_offset(), -48.0);
        assert_eq!(board.content_translation(), VIEWPORT_PADDING - 48.0);

        assert!(board.pointer_down(100.0));
        assert_eq!(board.cursor(), ScrollCursor::Grabbing);
        board.pointer_move(-100_000.0);
        assert_eq!(board.scroll_offset(), board.scroll.borrow().min_offset());
        board.pointer_cancel();
        assert_eq!(board.cursor(), ScrollCursor::Grab);
        assert!(board.thumb().is_some());
    }

    #[test]
    fn test_short_dialogue_does_not_scroll() {
        let board = board();
        block_on(board.init(&StaticContent(DOCUMENT.into()))).unwrap();
        assert!(!board.is_scrollable());
        assert!(!board.wheel(5.0, DeltaMode::Pixel));
        assert!(!board.pointer_down(10.0));
        assert_eq!(board.cursor(), ScrollCursor::Default);
        assert!(board.thumb().is_none());
    }

    #[test]
    fn test_newer_render_wins() {
        let gate = Rc::new(GatedLoader::default());
        let board = DialogueBoard::new(gate.clone(), Rc::new(AverageGlyphMeasure::default()));
        board.install(ContentDocument::from_json(DOCUMENT).unwrap());

        let first = board.render_dialogue();
        let second = board.render_dialogue();
        assert_eq!(board.render_version(), 2);

        let (a, b, ()) = block_on(async { futures::join!(first, second, async { gate.open() }) });
        assert!(!a);
        assert!(b);
        assert_eq!(board.bubbles().len(), 3);
    }

    #[test]
    fn test_older_empty_render_polled_last_is_discarded() {
        let board = board();
        board.install(ContentDocument::default());
        let first = board.render_dialogue();

        board.install(ContentDocument {
            dialogue: vec![DialogueEntry {
                name: "A".into(),
                text: "plain text".into(),
            }],
            ..ContentDocument::default()
        });
        let second = board.render_dialogue();

        assert!(block_on(second));
        let height = board.content_height();
        assert!(!block_on(first));
        assert_eq!(board.bubbles().len(), 1);
        assert_eq!(board.content_height(), height);
    }

    #[test]
    fn test_superseded_render_keeps_visible_bubbles() {
        let gate = Rc::new(GatedLoader::default());
        let board = DialogueBoard::new(gate.clone(), Rc::new(AverageGlyphMeasure::default()));
        board.install(ContentDocument {
            dialogue: vec![DialogueEntry {
                name: "A".into(),
                text: "plain".into(),
            }],
            ..ContentDocument::default()
        });
        assert!(block_on(board.render_dialogue()));
        let shown = board.bubbles();

        board.install(ContentDocument::from_json(DOCUMENT).unwrap());
        let pending = board.render_dialogue();
        let _newer = board.render_dialogue();
        let (done, ()) = block_on(async { futures::join!(pending, async { gate.open() }) });
        assert!(!done);
        assert_eq!(board.bubbles(), shown);
    }
}

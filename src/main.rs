//! Triptych entry point
//!
//! Runs the three scenes headless for a few simulated seconds and logs what
//! they produce. Rendering belongs to the embedding host.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

mod demo {
    use std::rc::Rc;

    use async_trait::async_trait;
    use glam::Vec2;

    use triptych::board::{DialogueBoard, StaticContent};
    use triptych::rich::{AverageGlyphMeasure, ImageHandle, ImageLoader};
    use triptych::scene::{AceOfShadowsScene, MagicWordsScene, PhoenixFlameScene, Scene};
    use triptych::scroll::DeltaMode;
    use triptych::{Error, Result, Settings};

    const SCENE_SIZE: (f32, f32) = (1280.0, 720.0);
    /// Simulated frames per scene
    const DEMO_FRAMES: u32 = 600;

    const DEMO_DOCUMENT: &str = r#"{
        "dialogue": [
            {"name": "Sheldon", "text": "I admit {satisfied} the robot is impressive."},
            {"name": "Leonard", "text": "Thanks! It took weeks {intrigued}"},
            {"name": "Sheldon", "text": "It would have taken me a day. {neutral}"},
            {"name": "Penny", "text": "Are you two fighting again? {laughing}"},
            {"name": "Leonard", "text": "No, we are having a scientific discussion."}
        ],
        "emojies": [
            {"name": "satisfied", "url": "https://img.example/satisfied.png"},
            {"name": "intrigued", "url": "https://img.example/intrigued.png"},
            {"name": "neutral", "url": "https://img.example/neutral.png"}
        ],
        "avatars": [
            {"name": "Sheldon", "url": "https://img.example/sheldon.png", "position": "left"},
            {"name": "Leonard", "url": "https://img.example/leonard.png", "position": "right"},
            {"name": "Penny", "url": "https://img.example/penny.png", "position": "left"}
        ]
    }"#;

    /// Pretends every https URL is a 72px square image
    struct PlaceholderLoader;

    #[async_trait(?Send)]
    impl ImageLoader for PlaceholderLoader {
        async fn load(&self, url: &str) -> Result<ImageHandle> {
            if !url.starts_with("https://") {
                return Err(Error::ImageLoad {
                    url: url.to_owned(),
                    reason: "unsupported scheme".into(),
                });
            }
            Ok(ImageHandle {
                url: url.to_owned(),
                size: Vec2::splat(72.0),
            })
        }
    }

    pub async fn run(settings: Settings) {
        let (width, height) = SCENE_SIZE;

        let mut flame = PhoenixFlameScene::new(&settings);
        flame.on_enter();
        flame.resize(width, height);
        for _ in 0..DEMO_FRAMES {
            flame.update(1.0);
        }
        log::info!(
            "Flame: {} live, {} spawned, {} dropped",
            flame.particles().count(),
            flame.emitter().total_spawned(),
            flame.emitter().total_dropped()
        );
        flame.on_exit();

        let mut cards = AceOfShadowsScene::new(&settings);
        cards.on_enter();
        cards.resize(width, height);
        cards.start();
        for _ in 0..DEMO_FRAMES {
            cards.update(1.0);
        }
        log::info!("Cards: {}, {} in flight", cards.counter_label(), cards.mover().in_flight_count());
        cards.on_exit();

        let board = Rc::new(
            DialogueBoard::new(Rc::new(PlaceholderLoader), Rc::new(AverageGlyphMeasure::default()))
                .with_default_emoji(settings.dialogue.default_emoji.clone()),
        );
        let mut words = MagicWordsScene::new(Rc::clone(&board));
        words.on_enter();
        words.resize(width, height);
        match board.init(&StaticContent(DEMO_DOCUMENT.into())).await {
            Ok(_) => {}
            Err(err) => {
                log::error!("Dialogue failed to load: {}", err);
                return;
            }
        }

        // Narrow window: forces a re-layout
        words.resize(width / 2.0, height / 2.0);
        if words.take_render_request() {
            board.render_dialogue().await;
        }
        for bubble in board.bubbles() {
            log::info!(
                "{:>8} ({:?}) {:>5.0}x{:<3.0} {}",
                bubble.speaker,
                bubble.side,
                bubble.size.x,
                bubble.size.y,
                bubble.text.to_source()
            );
        }
        if board.wheel(3.0, DeltaMode::Line) {
            log::info!("Dialogue scrolled to {:.0}", board.scroll_offset());
        }
        words.on_exit();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        return;
    }
    log::info!("Triptych starting...");
    wasm_bindgen_futures::spawn_local(demo::run(triptych::Settings::default()));
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Triptych (native) starting...");

    let path = std::env::var_os("TRIPTYCH_SETTINGS").map(std::path::PathBuf::from);
    let settings = triptych::Settings::load(path.as_deref());
    futures::executor::block_on(demo::run(settings));
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

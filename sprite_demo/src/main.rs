//! Sprite pipeline demo application
//!
//! Spawns a field of drifting, spinning sprites from a generated atlas and
//! drives the double-buffered renderer for a fixed number of frames against
//! the headless backend, then prints the renderer statistics.
//!
//! Usage: `sprite_demo [frames] [config.toml]`

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use sprite_engine::foundation::logging;
use sprite_engine::prelude::*;

const ATLAS_NAME: &str = "generated/checker_atlas";
const BACKGROUND_NAME: &str = "generated/background";
const DEFAULT_FRAMES: u64 = 600;

struct Mover {
    handle: SpriteHandle,
    velocity: Vec2,
    spin: f32,
}

pub struct SpriteDemoApp {
    renderer: SpriteRenderer,
    pool: AtlasSpritePool,
    movers: Vec<Mover>,
    background: Sprite,
    bounds: Vec2,
    // Leases keep the generated textures in the asset table
    _atlas_lease: TextureLease,
    _background_lease: TextureLease,
}

impl SpriteDemoApp {
    pub fn new(config: &ApplicationConfig) -> Result<Self, Box<dyn std::error::Error>> {
        log::info!("Creating sprite demo application...");
        let assets = TextureAssets::new(config.assets.clone());

        let atlas_lease = assets.acquire_with(ATLAS_NAME, || {
            Ok(ImageData::checkerboard(64, 32, 8, [40, 40, 60, 255], [220, 200, 120, 255]))
        })?;
        let atlas = TextureAtlas::new(
            Arc::clone(atlas_lease.texture()),
            vec![
                AtlasEntry::new("ship", Rect::new(0.0, 0.0, 16.0, 16.0)),
                AtlasEntry::new("rock", Rect::new(16.0, 0.0, 16.0, 16.0)),
                AtlasEntry::new("spark", Rect::new(32.0, 0.0, 8.0, 8.0)),
                AtlasEntry::new("star", Rect::new(48.0, 16.0, 16.0, 16.0)),
            ],
        )?;
        let pool = AtlasSpritePool::new(atlas, config.renderer.sprite_pool_capacity);

        let background_lease = assets.acquire_with(BACKGROUND_NAME, || {
            Ok(ImageData::solid_color(4, 4, [10, 10, 30, 255]))
        })?;
        let bounds = Vec2::new(
            config.renderer.virtual_width as f32,
            config.renderer.virtual_height as f32,
        );
        let background = Sprite::from_texture(
            Arc::clone(background_lease.texture()),
            Placement::default().with_size(bounds.x, bounds.y).with_depth(i16::MIN),
        );

        let backend = HeadlessBackend::new().with_frame_delay(Duration::from_millis(2));
        let renderer = SpriteRenderer::with_assets(Box::new(backend), &config.renderer, assets)?;

        Ok(Self {
            renderer,
            pool,
            movers: Vec::new(),
            background,
            bounds,
            _atlas_lease: atlas_lease,
            _background_lease: background_lease,
        })
    }

    fn spawn(&mut self, name: &str, count: usize, depth: i16) {
        let mut rng = rand::thread_rng();
        for _ in 0..count {
            let placement = Placement::at(
                rng.gen_range(0.0..self.bounds.x),
                rng.gen_range(0.0..self.bounds.y),
            )
            .with_anchor(8.0, 8.0)
            .with_scale(rng.gen_range(0.5..1.5))
            .with_depth(depth)
            .with_flip_x(rng.gen_bool(0.5));

            match self.pool.add_sprite(name, placement) {
                Ok(handle) => self.movers.push(Mover {
                    handle,
                    velocity: Vec2::new(rng.gen_range(-40.0..40.0), rng.gen_range(-40.0..40.0)),
                    spin: rng.gen_range(-3.0..3.0),
                }),
                Err(e) => {
                    log::warn!("Stopped spawning '{}': {}", name, e);
                    break;
                }
            }
        }
    }

    fn despawn_some(&mut self, count: usize) {
        let count = count.min(self.movers.len());
        for mover in self.movers.drain(..count) {
            if let Err(e) = self.pool.remove_sprite(mover.handle) {
                log::warn!("Despawn failed: {}", e);
            }
        }
    }

    fn update(&mut self, dt: f32) {
        let bounds = self.bounds;
        for mover in &self.movers {
            if let Some(placement) = self.pool.placement_mut(mover.handle) {
                placement.position += mover.velocity * dt;
                placement.position.x = placement.position.x.rem_euclid(bounds.x);
                placement.position.y = placement.position.y.rem_euclid(bounds.y);
                placement.rotation += mover.spin * dt;
            }
        }
        self.renderer.camera_mut().move_by(2.0 * dt, 0.0);
    }

    pub fn run(&mut self, frames: u64) -> Result<RenderStats, RenderError> {
        log::info!("Running {} frames...", frames);

        self.spawn("star", 100, -1);
        self.spawn("rock", 150, 0);
        self.spawn("ship", 20, 1);

        let dt = 1.0 / 60.0;
        let start = Instant::now();
        for frame in 0..frames {
            self.update(dt);

            if frame % 120 == 60 {
                self.despawn_some(25);
                self.spawn("spark", 25, 2);
            }
            if frame == frames / 2 {
                self.renderer.resize(1920, 1200)?;
            }

            self.renderer.add_sprite(self.background.clone());
            self.pool.draw(&mut self.renderer);
            self.renderer.submit()?;
        }
        self.renderer.wait_idle();

        let stats = self.renderer.stats();
        log::info!(
            "{} frames in {:.2?}: {} sprites, {} batches, {} skipped, last frame {} us",
            stats.frames_drawn,
            start.elapsed(),
            stats.sprites_drawn,
            stats.batches_drawn,
            stats.batches_skipped,
            stats.last_frame_time_us
        );
        Ok(stats)
    }

    pub fn shutdown(mut self) -> Result<(), RenderError> {
        log::info!("Shutting down with {} live sprites", self.pool.len());
        self.pool.clear_sprites();
        self.renderer.shutdown()
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let frames = args.next().and_then(|s| s.parse().ok()).unwrap_or(DEFAULT_FRAMES);
    let config_path = args.next().unwrap_or_else(|| "sprite_demo.toml".to_string());

    let config = ApplicationConfig::load_or_default(&config_path)?;
    config.validate()?;

    logging::init_with_level(config.engine.log_filter());

    log::info!("Starting sprite demo");

    let mut app = SpriteDemoApp::new(&config)?;
    let stats = app.run(frames)?;
    app.shutdown()?;

    println!(
        "Drew {} of {} submitted frames ({} sprites, {} batches, {} backend errors)",
        stats.frames_drawn,
        stats.frames_submitted,
        stats.sprites_drawn,
        stats.batches_drawn,
        stats.backend_errors
    );
    Ok(())
}

//! Parallel per-pixel render loop and the image buffer it fills.
//!
//! Every pixel is an independent task on the rayon pool. Each worker owns one
//! intersection [`Arena`], cleared between pixels, so shading never touches
//! the global allocator once the arena has warmed up.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::{Arena, Camera, Color, Intersection, TracerError, World, DEFAULT_MAX_DEPTH};

/// Render configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Maximum reflection/refraction depth
    pub max_depth: u32,
    /// Upper bound on each worker's intersection arena, in bytes
    pub arena_capacity_bytes: usize,
    /// Intersections committed up front per worker
    pub arena_initial_len: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            arena_capacity_bytes: 64 * 1024 * 1024,
            arena_initial_len: 256,
        }
    }
}

/// Summary of a finished render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStats {
    pub pixels: usize,
    /// Intersections dropped because a worker's arena was full
    pub arena_overflow: usize,
    pub elapsed: Duration,
}

/// Clamp a linear color to [0, 1] and convert to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let c = color.clamp(Color::ZERO, Color::ONE) * 255.0;
    [c.x.round() as u8, c.y.round() as u8, c.z.round() as u8, 255]
}

/// Row-major buffer of linear colors.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} image",
            self.width,
            self.height
        );
        y as usize * self.width as usize + x as usize
    }

    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    pub fn write(&mut self, x: u32, y: u32, color: Color) {
        let i = self.index(x, y);
        self.pixels[i] = color;
    }

    /// Convert to RGBA bytes (for display or saving).
    pub fn to_rgba(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|&c| color_to_rgba(c)).collect()
    }
}

/// Render `world` through `camera`, one rayon task per pixel.
pub fn render(
    camera: &Camera,
    world: &World,
    config: &RenderConfig,
) -> Result<(ImageBuffer, RenderStats), TracerError> {
    let template =
        Arena::<Intersection>::new(config.arena_capacity_bytes, config.arena_initial_len)?;
    let width = camera.hsize() as usize;

    log::info!(
        "Rendering {}x{} ({} shapes, {} lights, max depth {})",
        camera.hsize(),
        camera.vsize(),
        world.shapes().len(),
        world.lights().len(),
        config.max_depth
    );

    let start = Instant::now();
    let overflow = AtomicUsize::new(0);
    let mut image = ImageBuffer::new(camera.hsize(), camera.vsize());

    image.pixels.par_iter_mut().enumerate().for_each_init(
        || template.fresh(),
        |xs, (i, pixel)| {
            let x = (i % width) as u32;
            let y = (i / width) as u32;

            let ray = camera.ray_for_pixel(x, y);
            *pixel = world.color_at(&ray, xs, config.max_depth);
            xs.clear();

            let dropped = xs.take_overflowed();
            if dropped > 0 {
                overflow.fetch_add(dropped, Ordering::Relaxed);
            }
        },
    );

    let stats = RenderStats {
        pixels: image.pixels.len(),
        arena_overflow: overflow.into_inner(),
        elapsed: start.elapsed(),
    };

    if stats.arena_overflow > 0 {
        log::warn!(
            "Intersection arena full: dropped {} intersections (capacity {} bytes per worker)",
            stats.arena_overflow,
            config.arena_capacity_bytes
        );
    }
    log::info!("Rendered {} pixels in {:?}", stats.pixels, stats.elapsed);

    Ok((image, stats))
}

//! A renderer with no window. It keeps the window state the game asks for and
//! counts what would have been drawn, which is enough to run a game from the
//! command line or in tests.

use gm8_core::{Colour, DrawParams, Renderer, SpriteFrame};

#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub background: Colour,
    /// Draw calls since the last present.
    pub draws_this_frame: usize,
    pub total_draws: u64,
    pub frames_presented: u64,
    max_frames: Option<u64>,
}

impl HeadlessRenderer {
    pub fn new(max_frames: Option<u64>) -> Self {
        Self {
            max_frames,
            ..Self::default()
        }
    }
}

impl Renderer for HeadlessRenderer {
    fn resize_window(&mut self, width: u32, height: u32) {
        log::info!("Window resized to {width}x{height}");
        self.width = width;
        self.height = height;
    }

    fn set_window_title(&mut self, title: &str) {
        log::info!("Window title: {title}");
        self.title = title.to_string();
    }

    fn set_background_colour(&mut self, colour: Colour) {
        self.background = colour;
    }

    fn draw_image(&mut self, frame: &SpriteFrame, params: &DrawParams) {
        log::trace!(
            "Draw {} at ({}, {}) scale ({}, {}) angle {}",
            frame.image,
            params.x,
            params.y,
            params.xscale,
            params.yscale,
            params.angle
        );
        self.draws_this_frame += 1;
        self.total_draws += 1;
    }

    fn render_frame(&mut self) {
        self.frames_presented += 1;
        log::trace!(
            "Frame {} presented with {} draws",
            self.frames_presented,
            self.draws_this_frame
        );
        self.draws_this_frame = 0;
    }

    fn should_close(&self) -> bool {
        self.max_frames
            .is_some_and(|limit| self.frames_presented >= limit)
    }
}

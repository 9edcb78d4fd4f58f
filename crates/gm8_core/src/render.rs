use crate::assets::{Colour, SpriteFrame};
use crate::instance::Instance;

/// Transform and tint for one image draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawParams {
    pub x: f64,
    pub y: f64,
    pub xscale: f64,
    pub yscale: f64,
    pub angle: f64,
    pub blend: Colour,
    pub alpha: f64,
}

impl DrawParams {
    pub fn from_instance(instance: &Instance) -> Self {
        Self {
            x: instance.x,
            y: instance.y,
            xscale: instance.image_xscale,
            yscale: instance.image_yscale,
            angle: instance.image_angle,
            blend: instance.image_blend,
            alpha: instance.image_alpha,
        }
    }
}

/// The rendering backend as seen by the game: a window, a way to draw
/// sprite frames, and a close signal.
pub trait Renderer {
    fn resize_window(&mut self, width: u32, height: u32);
    fn set_window_title(&mut self, title: &str);
    fn set_background_colour(&mut self, colour: Colour);
    fn draw_image(&mut self, frame: &SpriteFrame, params: &DrawParams);
    /// Present everything drawn since the last call.
    fn render_frame(&mut self);
    /// Polled once per frame, after presentation.
    fn should_close(&self) -> bool;
}

//! CPU compositor: fog over the camera frame, then the hidden picture

use super::frame::{Compositor, FrameView};
use super::texture::{RgbImage, generate_fog_texture, load_reveal_image};
use crate::settings::Settings;

/// Blends the fog texture and reveal image into camera frames
#[derive(Debug, Clone)]
pub struct OverlayCompositor {
    fog_texture: RgbImage,
    reveal_image: RgbImage,
    max_alpha: f32,
    reveal_blend: f32,
}

impl OverlayCompositor {
    /// Build the fog texture and load `reveal.image` (placeholder if unreadable)
    pub fn new(settings: &Settings) -> Self {
        let width = settings.frame.width as usize;
        let height = settings.frame.height as usize;
        Self {
            fog_texture: generate_fog_texture(width, height, settings.fog.texture_seed),
            reveal_image: load_reveal_image(&settings.reveal.image, width, height),
            max_alpha: settings.fog.max_alpha,
            reveal_blend: settings.reveal.blend,
        }
    }

    /// Set the hidden picture; it is resized to the fog texture
    pub fn set_reveal_image(&mut self, image: RgbImage) {
        let image = image.resized(self.fog_texture.width(), self.fog_texture.height());
        self.reveal_image = image;
    }

    pub fn reveal_image(&self) -> &RgbImage {
        &self.reveal_image
    }

    pub fn fog_texture(&self) -> &RgbImage {
        &self.fog_texture
    }

    fn apply_fog(&self, frame: &mut RgbImage, view: &FrameView<'_>) {
        let alpha = self.max_alpha * view.fog_opacity;
        if alpha <= 0.0 {
            return;
        }
        let width = frame.width();
        let texture = self.fog_texture.pixels();
        for (i, px) in frame.pixels_mut().iter_mut().enumerate() {
            let (x, y) = (i % width, i / width);
            let coverage = view.fog.alpha_at_pixel(x as f32, y as f32);
            if coverage <= 0.0 {
                continue;
            }
            let fog = texture.get(i).copied().unwrap_or(*px);
            *px = px.mix(fog, coverage * alpha);
        }
    }

    fn apply_reveal(&self, frame: &mut RgbImage) {
        for (px, src) in frame.pixels_mut().iter_mut().zip(self.reveal_image.pixels()) {
            *px = px.mix(*src, self.reveal_blend);
        }
    }
}

impl Compositor for OverlayCompositor {
    type Frame = RgbImage;

    fn composite(&mut self, frame: &mut RgbImage, view: &FrameView<'_>) {
        if frame.width() != self.fog_texture.width() || frame.height() != self.fog_texture.height() {
            log::warn!(
                "Frame is {}x{}, compositor expects {}x{}; skipping overlay",
                frame.width(),
                frame.height(),
                self.fog_texture.width(),
                self.fog_texture.height()
            );
            return;
        }

        if view.state.shows_fog() {
            self.apply_fog(frame, view);
        }
        if view.shows_reveal() {
            self.apply_reveal(frame);
        }
    }
}

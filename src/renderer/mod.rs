//! Rendering module
//!
//! The engine never draws. Renderers read a `FrameView` once per tick and
//! composite fog and the hidden picture over the camera frame.

pub mod frame;
pub mod overlay;
pub mod texture;

pub use frame::{Compositor, FrameSnapshot, FrameView, OverlayParams};
pub use overlay::OverlayCompositor;
pub use texture::{
    ImageLoadError, Rgb, RgbImage, generate_fog_texture, load_reveal_image, placeholder_tree,
};

//! CPU images: the procedural fog texture and the hidden picture

use std::path::{Path, PathBuf};

use bytemuck::{Pod, Zeroable};
use image::imageops::{self, FilterType};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use thiserror::Error;

/// Box blur radius in pixels (21-tap kernel)
const FOG_BLUR_RADIUS: usize = 10;

/// Errors raised while reading an image
#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("failed to load image {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// One RGB pixel
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn gray(v: u8) -> Self {
        Self { r: v, g: v, b: v }
    }

    /// `self * (1 - t) + other * t`
    pub fn mix(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let ch = |a: u8, b: u8| (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8;
        Rgb {
            r: ch(self.r, other.r),
            g: ch(self.g, other.g),
            b: ch(self.b, other.b),
        }
    }
}

/// Row-major RGB image
#[derive(Debug, Clone, PartialEq)]
pub struct RgbImage {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl RgbImage {
    pub fn filled(width: usize, height: usize, color: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width * height],
        }
    }

    /// Wrap packed RGB bytes; `None` if the length doesn't match
    pub fn from_rgb_bytes(width: usize, height: usize, bytes: &[u8]) -> Option<Self> {
        if bytes.len() != width * height * 3 {
            return None;
        }
        let pixels = bytemuck::cast_slice::<u8, Rgb>(bytes).to_vec();
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Rgb] {
        &mut self.pixels
    }

    /// Packed RGB bytes
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Read and decode an image file (any format the `image` crate knows)
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ImageLoadError> {
        let path = path.as_ref();
        let decoded = image::open(path).map_err(|source| ImageLoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_buffer(&decoded.to_rgb8()))
    }

    /// Decode an encoded image (PNG, JPEG) held in memory
    pub fn decode(bytes: &[u8]) -> Result<Self, ImageLoadError> {
        let decoded = image::load_from_memory(bytes)?;
        Ok(Self::from_buffer(&decoded.to_rgb8()))
    }

    pub fn from_buffer(buffer: &image::RgbImage) -> Self {
        let (width, height) = buffer.dimensions();
        Self {
            width: width as usize,
            height: height as usize,
            pixels: bytemuck::cast_slice::<u8, Rgb>(buffer.as_raw().as_slice()).to_vec(),
        }
    }

    pub fn to_buffer(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.width as u32, self.height as u32, self.as_bytes().to_vec())
    }

    /// Lanczos resize. An empty source gives a black image of the requested size.
    pub fn resized(&self, width: usize, height: usize) -> RgbImage {
        if width == self.width && height == self.height {
            return self.clone();
        }
        if self.pixels.is_empty() || width == 0 || height == 0 {
            return RgbImage::filled(width, height, Rgb::default());
        }
        match self.to_buffer() {
            Some(buffer) => {
                let out = imageops::resize(&buffer, width as u32, height as u32, FilterType::Lanczos3);
                Self::from_buffer(&out)
            }
            None => RgbImage::filled(width, height, Rgb::default()),
        }
    }
}

/// Stand-in for a missing picture: a green tree on black
pub fn placeholder_tree(width: usize, height: usize) -> RgbImage {
    const LEAVES: Rgb = Rgb { r: 34, g: 139, b: 34 };
    const TRUNK: Rgb = Rgb { r: 101, g: 67, b: 33 };

    let mut img = RgbImage::filled(width, height, Rgb::default());
    let (w, h) = (width as f32, height as f32);
    let cx = w * 0.5;
    let top = h * 0.15;
    let base = h * 0.75;
    for (i, px) in img.pixels_mut().iter_mut().enumerate() {
        let x = (i % width) as f32 + 0.5;
        let y = (i / width) as f32 + 0.5;
        if y >= top && y <= base {
            let half = (y - top) / (base - top) * w * 0.25;
            if (x - cx).abs() <= half {
                *px = LEAVES;
            }
        } else if y > base && y <= h * 0.9 && (x - cx).abs() <= w * 0.04 {
            *px = TRUNK;
        }
    }
    img
}

/// Load the hidden picture at frame size, falling back to [`placeholder_tree`]
pub fn load_reveal_image(path: impl AsRef<Path>, width: usize, height: usize) -> RgbImage {
    let path = path.as_ref();
    match RgbImage::load(path) {
        Ok(image) => {
            log::info!(
                "Loaded reveal image {} ({}x{})",
                path.display(),
                image.width(),
                image.height()
            );
            image.resized(width, height)
        }
        Err(e) => {
            log::warn!("{}; using placeholder", e);
            placeholder_tree(width, height)
        }
    }
}

/// Whitish noise, softened, used as the fog color plane
pub fn generate_fog_texture(width: usize, height: usize, seed: u64) -> RgbImage {
    let mut rng = Pcg32::seed_from_u64(seed);

    let mut plane: Vec<f32> = (0..width * height)
        .map(|_| {
            let noise = f32::from(rng.random_range(200u8..255));
            255.0 * 0.7 + noise * 0.3
        })
        .collect();
    box_blur(&mut plane, width, height, FOG_BLUR_RADIUS);

    let pixels = plane
        .into_iter()
        .map(|v| Rgb::gray(v.round().clamp(0.0, 255.0) as u8))
        .collect();
    RgbImage {
        width,
        height,
        pixels,
    }
}

/// Separable box blur with edge clamping
fn box_blur(plane: &mut [f32], width: usize, height: usize, radius: usize) {
    if width == 0 || height == 0 || radius == 0 {
        return;
    }
    let mut scratch = vec![0.0f32; plane.len()];
    for y in 0..height {
        blur_line(plane, &mut scratch, width, 1, y * width, radius);
    }
    for x in 0..width {
        blur_line(&scratch, plane, height, width, x, radius);
    }
}

/// Average `2 * radius + 1` samples along one row or column
fn blur_line(src: &[f32], dst: &mut [f32], len: usize, stride: usize, start: usize, radius: usize) {
    let taps = (2 * radius + 1) as f32;
    for i in 0..len {
        let mut sum = 0.0;
        for k in 0..=2 * radius {
            let j = (i + k).saturating_sub(radius).min(len - 1);
            sum += src[start + j * stride];
        }
        dst[start + i * stride] = sum / taps;
    }
}

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use glam::Vec3;
use image::imageops::{self, FilterType};
use log::{debug, warn};

use crate::error::{Error, Result};

/// Colour used when an image file cannot be decoded (pink)
pub const FALLBACK_COLOR: Vec3 = Vec3::new(1.0, 0.75, 0.8);

/// Material slot a texture is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureType {
    Diffuse,
    Specular,
}

impl TextureType {
    pub const ALL: [TextureType; 2] = [TextureType::Diffuse, TextureType::Specular];

    pub fn name(self) -> &'static str {
        match self {
            TextureType::Diffuse => "diffuse",
            TextureType::Specular => "specular",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            TextureType::Diffuse => 0,
            TextureType::Specular => 1,
        }
    }
}

#[derive(Debug, Clone)]
enum TextureSource {
    Path { path: PathBuf, flip_y: bool },
    Color(Vec3),
    Pixels {
        width: u32,
        height: u32,
        channels: usize,
        data: Vec<f32>,
    },
}

/// Decoded RGBA8 image, ready for upload
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureImage {
    pub fn solid(color: Vec3) -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: vec![to_u8(color.x), to_u8(color.y), to_u8(color.z), 255],
        }
    }

    /// A copy downscaled so neither side exceeds `max_dim`, keeping the aspect
    /// ratio. `None` when the image already fits.
    pub fn fit_within(&self, max_dim: u32) -> Option<TextureImage> {
        let max_dim = max_dim.max(1);
        if self.width <= max_dim && self.height <= max_dim {
            return None;
        }
        let scale = max_dim as f64 / self.width.max(self.height) as f64;
        let width = ((self.width as f64 * scale).round() as u32).clamp(1, max_dim);
        let height = ((self.height as f64 * scale).round() as u32).clamp(1, max_dim);
        warn!(
            "Texture of {}x{} exceeds the GPU limit of {}, downscaling to {}x{}",
            self.width, self.height, max_dim, width, height
        );

        let Some(source) = image::RgbaImage::from_raw(self.width, self.height, self.rgba.clone())
        else {
            warn!("Texture data does not match its size, using fallback color");
            return Some(TextureImage::solid(FALLBACK_COLOR));
        };
        let resized = imageops::resize(&source, width, height, FilterType::Triangle);
        Some(TextureImage {
            width,
            height,
            rgba: resized.into_raw(),
        })
    }
}

/// A texture source: image file, solid colour, or in-memory float pixels.
///
/// The decoded image is cached and shared between clones.
#[derive(Debug, Clone)]
pub struct Texture {
    source: TextureSource,
    image: Arc<OnceLock<TextureImage>>,
}

impl Texture {
    /// Texture decoded from an image file when first uploaded.
    /// With `flip_y` the first row of texture data is the bottom image row.
    pub fn from_path(path: impl AsRef<Path>, flip_y: bool) -> Self {
        Self {
            source: TextureSource::Path {
                path: path.as_ref().to_path_buf(),
                flip_y,
            },
            image: Arc::default(),
        }
    }

    /// 1x1 texture of a single colour
    pub fn from_color(color: Vec3) -> Self {
        Self {
            source: TextureSource::Color(color),
            image: Arc::default(),
        }
    }

    /// Row-major float image with 1 (red), 3 (RGB) or 4 (RGBA) channels
    pub fn from_pixels(width: u32, height: u32, channels: usize, data: Vec<f32>) -> Result<Self> {
        if !matches!(channels, 1 | 3 | 4) {
            return Err(Error::InvalidChannelCount(channels));
        }
        let expected = width as usize * height as usize * channels;
        if data.len() != expected {
            return Err(Error::ImageSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            source: TextureSource::Pixels {
                width,
                height,
                channels,
                data,
            },
            image: Arc::default(),
        })
    }

    /// Decode into RGBA8 on first use. Never fails: unreadable files fall back
    /// to a solid colour.
    pub fn decode(&self) -> &TextureImage {
        self.image.get_or_init(|| decode_source(&self.source))
    }
}

fn decode_source(source: &TextureSource) -> TextureImage {
    match source {
        TextureSource::Color(color) => TextureImage::solid(*color),
        TextureSource::Pixels {
            width,
            height,
            channels,
            data,
        } => TextureImage {
            width: *width,
            height: *height,
            rgba: pixels_to_rgba8(data, *channels),
        },
        TextureSource::Path { path, flip_y } => match image::open(path) {
            Ok(img) => {
                let img = if *flip_y { img.flipv() } else { img };
                let rgba = img.to_rgba8();
                debug!("Decoded texture {:?}: {}x{}", path, rgba.width(), rgba.height());
                TextureImage {
                    width: rgba.width(),
                    height: rgba.height(),
                    rgba: rgba.into_raw(),
                }
            }
            Err(e) => {
                warn!("Failed to load texture {:?} ({}), using fallback color", path, e);
                TextureImage::solid(FALLBACK_COLOR)
            }
        },
    }
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn pixels_to_rgba8(data: &[f32], channels: usize) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(data.len() / channels * 4);
    for px in data.chunks_exact(channels) {
        match px {
            [r] => rgba.extend_from_slice(&[to_u8(*r), 0, 0, 255]),
            [r, g, b] => rgba.extend_from_slice(&[to_u8(*r), to_u8(*g), to_u8(*b), 255]),
            [r, g, b, a] => rgba.extend_from_slice(&[to_u8(*r), to_u8(*g), to_u8(*b), to_u8(*a)]),
            _ => unreachable!("channel count validated on construction"),
        }
    }
    rgba
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(TextureType::Diffuse.name(), "diffuse");
        assert_eq!(TextureType::Specular.name(), "specular");
        assert_eq!(TextureType::ALL.len(), 2);
    }

    #[test]
    fn test_solid_color_decodes_to_one_pixel() {
        let tex = Texture::from_color(Vec3::new(1.0, 0.5, 0.0));
        let img = tex.decode();
        assert_eq!((img.width, img.height), (1, 1));
        assert_eq!(img.rgba, vec![255, 128, 0, 255]);
    }

    #[test]
    fn test_pixels_rgb() {
        let tex = Texture::from_pixels(2, 1, 3, vec![1.0, 0.0, 0.0, 0.0, 0.0, 2.0]).unwrap();
        let img = tex.decode();
        assert_eq!(img.rgba, vec![255, 0, 0, 255, 0, 0, 255, 255]);
    }

    #[test]
    fn test_single_channel_is_red() {
        let tex = Texture::from_pixels(1, 1, 1, vec![1.0]).unwrap();
        assert_eq!(tex.decode().rgba, vec![255, 0, 0, 255]);
    }

    #[test]
    fn test_pixels_validation() {
        assert_eq!(
            Texture::from_pixels(2, 2, 2, vec![0.0; 8]).unwrap_err(),
            Error::InvalidChannelCount(2)
        );
        assert_eq!(
            Texture::from_pixels(2, 2, 3, vec![0.0; 11]).unwrap_err(),
            Error::ImageSizeMismatch { expected: 12, actual: 11 }
        );
    }

    #[test]
    fn test_missing_file_falls_back_to_pink() {
        let texture = Texture::from_path("/definitely/not/here.png", true);
        assert_eq!(*texture.decode(), TextureImage::solid(FALLBACK_COLOR));
    }

    #[test]
    fn test_file_is_decoded_once_and_shared_by_clones() {
        let path = std::env::temp_dir().join(format!("meshview_tex_{}.png", std::process::id()));
        image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let texture = Texture::from_path(&path, false);
        let copy = texture.clone();
        assert_eq!((texture.decode().width, texture.decode().height), (3, 2));
        std::fs::remove_file(&path).unwrap();

        // A second decode must not go back to the deleted file
        assert_eq!(&texture.decode().rgba[..4], &[10, 20, 30, 255]);
        assert_eq!(copy.decode().width, 3);
    }

    #[test]
    fn test_fit_within_downscales_wide_images() {
        let tex = Texture::from_pixels(10_000, 1, 3, vec![0.5; 30_000]).unwrap();
        let fitted = tex.decode().fit_within(8192).unwrap();
        assert_eq!((fitted.width, fitted.height), (8192, 1));
        assert_eq!(fitted.rgba.len(), 8192 * 4);
        assert_eq!(&fitted.rgba[..4], &[128, 128, 128, 255]);
    }

    #[test]
    fn test_fit_within_keeps_small_images() {
        let tex = Texture::from_color(Vec3::ONE);
        assert!(tex.decode().fit_within(8192).is_none());
    }
}

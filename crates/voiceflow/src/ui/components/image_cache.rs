//! Decoded image textures keyed by media reference

use crate::error::{Result, VoiceFlowError};
use crate::media::{MediaRef, MediaStore};
use egui::{ColorImage, TextureHandle, TextureOptions, Vec2};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Decode image bytes into RGBA pixels egui can upload
pub fn decode_image(bytes: &[u8]) -> Result<ColorImage> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| VoiceFlowError::UnsupportedMedia(format!("Cannot decode image: {}", e)))?;
    let rgba = decoded.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

/// Scale `size` down to fit inside `bounds`, keeping the aspect ratio
pub fn fit_within(size: Vec2, bounds: Vec2) -> Vec2 {
    if size.x <= 0.0 || size.y <= 0.0 {
        return Vec2::ZERO;
    }
    let scale = (bounds.x / size.x).min(bounds.y / size.y).min(1.0);
    size * scale
}

/// Textures for staged and sent images
///
/// Each blob is decoded once. Failed decodes are remembered too, so a broken
/// file is not decoded again every frame.
#[derive(Default)]
pub struct ImageCache {
    textures: HashMap<MediaRef, Option<TextureHandle>>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Texture for `media`, decoding it on first use
    ///
    /// `None` when the blob is gone or is not a decodable image.
    pub fn texture(
        &mut self,
        ctx: &egui::Context,
        store: &MediaStore,
        media: &MediaRef,
    ) -> Option<TextureHandle> {
        if let Some(cached) = self.textures.get(media) {
            return cached.clone();
        }

        let blob = store.get(media)?;
        let texture = match decode_image(&blob.bytes) {
            Ok(pixels) => {
                debug!("Uploaded texture for {} ({:?})", media, pixels.size);
                Some(ctx.load_texture(media.to_string(), pixels, TextureOptions::LINEAR))
            }
            Err(e) => {
                warn!("{}: {}", media, e);
                None
            }
        };
        self.textures.insert(media.clone(), texture.clone());
        texture
    }

    /// Free textures whose media has been revoked
    pub fn retain_live(&mut self, store: &MediaStore) {
        self.textures.retain(|media, _| store.contains(media));
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

//! Composes the "now playing" card: a random background, the track thumbnail
//! and two lines of text on a fixed 800×300 canvas, written as a PNG to a
//! single output path.
//!
//! Rendering never fails loudly. Every error is logged and turned into `None`
//! so a broken thumbnail or an empty background folder cannot hold up playback.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use poise::serenity_prelude::CreateAttachment;
use rand::seq::IndexedRandom;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::HTTP_CLIENT;

pub const CARD_WIDTH: u32 = 800;
pub const CARD_HEIGHT: u32 = 300;

const THUMBNAIL_SIZE: u32 = 150;
const THUMBNAIL_X: i64 = 30;
const THUMBNAIL_Y: i64 = 80;

const TEXT_X: i32 = 200;
const TEXT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
const TITLE_SIZE: f32 = 30.0;
const TITLE_BASELINE: i32 = 130;
const REQUESTER_SIZE: f32 = 20.0;
const REQUESTER_BASELINE: i32 = 180;

/// File name used when the card is attached to a Discord message
pub const ATTACHMENT_NAME: &str = "musiccard.png";

/// Errors that can occur while producing a card
#[derive(Error, Debug)]
pub enum CardError {
    #[error("No background images available")]
    NoBackgrounds,

    #[error("Failed to fetch thumbnail: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Unsupported thumbnail locator: {0}")]
    InvalidLocator(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Render task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Read-only resources shared by every render: the background pool and the font.
pub struct CardAssets {
    backgrounds: Vec<PathBuf>,
    font: Option<FontArc>,
}

impl CardAssets {
    pub fn new(backgrounds: Vec<PathBuf>, font: Option<FontArc>) -> Self {
        Self { backgrounds, font }
    }

    /// Scan `backgrounds_dir` and load the font at `font_path`.
    ///
    /// Missing pieces are logged rather than returned as errors: with no
    /// backgrounds every render yields `None`, and with no font the card is
    /// drawn without its text lines.
    pub fn load(backgrounds_dir: &Path, font_path: &Path) -> Self {
        let backgrounds = match scan_backgrounds(backgrounds_dir) {
            Ok(backgrounds) => backgrounds,
            Err(e) => {
                error!(
                    "Failed to read background directory {}: {}",
                    backgrounds_dir.display(),
                    e
                );
                Vec::new()
            }
        };

        if backgrounds.is_empty() {
            error!(
                "No background images found in {}",
                backgrounds_dir.display()
            );
        } else {
            info!(
                "Loaded {} background images from {}",
                backgrounds.len(),
                backgrounds_dir.display()
            );
        }

        Self {
            backgrounds,
            font: load_font(font_path),
        }
    }

    pub fn backgrounds(&self) -> &[PathBuf] {
        &self.backgrounds
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    fn random_background(&self) -> Option<&Path> {
        self.backgrounds
            .choose(&mut rand::rng())
            .map(PathBuf::as_path)
    }
}

/// List the `.png` and `.jpg` files directly inside `dir`, sorted by path.
pub fn scan_backgrounds(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut backgrounds: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.is_file() && is_background_file(path))
        .collect();
    backgrounds.sort();
    Ok(backgrounds)
}

fn is_background_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == "png" || ext == "jpg")
}

fn load_font(path: &Path) -> Option<FontArc> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Font file not found: {} ({})", path.display(), e);
            return None;
        }
    };

    match FontArc::try_from_vec(bytes) {
        Ok(font) => Some(font),
        Err(e) => {
            error!("Invalid font file {}: {}", path.display(), e);
            None
        }
    }
}

/// Renders cards to a single, fixed output path.
///
/// Renders run concurrently, but the output file is shared, so writes to it
/// are serialized.
pub struct CardRenderer {
    assets: Arc<CardAssets>,
    output: PathBuf,
    client: reqwest::Client,
    write_lock: Mutex<()>,
}

impl CardRenderer {
    pub fn new(assets: Arc<CardAssets>, output: impl Into<PathBuf>) -> Self {
        Self {
            assets,
            output: output.into(),
            client: HTTP_CLIENT.clone(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Render a card and return the path it was written to, or `None` on any failure.
    pub async fn render(&self, title: &str, requester: &str, thumbnail: &str) -> Option<PathBuf> {
        self.render_logged(title, requester, thumbnail)
            .await
            .map(|_| self.output.clone())
    }

    /// Render a card and wrap the bytes that were written into a message attachment.
    ///
    /// The attachment is built from this render's own bytes, so a concurrent
    /// render for another guild cannot swap the image underneath it.
    pub async fn render_attachment(
        &self,
        title: &str,
        requester: &str,
        thumbnail: &str,
    ) -> Option<CreateAttachment> {
        self.render_logged(title, requester, thumbnail)
            .await
            .map(|png| CreateAttachment::bytes(png, ATTACHMENT_NAME))
    }

    async fn render_logged(&self, title: &str, requester: &str, thumbnail: &str) -> Option<Vec<u8>> {
        match self.try_render(title, requester, thumbnail).await {
            Ok(png) => {
                debug!(
                    "Rendered music card for '{}' to {}",
                    title,
                    self.output.display()
                );
                Some(png)
            }
            Err(e) => {
                error!("Error generating music card: {}", e);
                None
            }
        }
    }

    async fn try_render(
        &self,
        title: &str,
        requester: &str,
        thumbnail: &str,
    ) -> Result<Vec<u8>, CardError> {
        let background = self
            .assets
            .random_background()
            .ok_or(CardError::NoBackgrounds)?;
        let background = tokio::fs::read(background).await?;
        let thumbnail = self.load_thumbnail(thumbnail).await?;

        let assets = Arc::clone(&self.assets);
        let title = title.to_owned();
        let requested_by = format!("Requested by: {}", requester);

        let png = tokio::task::spawn_blocking(move || {
            compose(
                &background,
                &thumbnail,
                assets.font.as_ref(),
                &title,
                &requested_by,
            )
        })
        .await??;

        // Only the write touches the shared output; fetching and drawing run unlocked
        let _guard = self.write_lock.lock().await;
        tokio::fs::write(&self.output, &png).await?;
        Ok(png)
    }

    /// Fetch thumbnail bytes: `http(s)` over the network, `file://` URIs and bare paths from disk.
    async fn load_thumbnail(&self, locator: &str) -> Result<Vec<u8>, CardError> {
        match Url::parse(locator) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                let response = self.client.get(url).send().await?.error_for_status()?;
                Ok(response.bytes().await?.to_vec())
            }
            Ok(url) if url.scheme() == "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| CardError::InvalidLocator(locator.to_owned()))?;
                Ok(tokio::fs::read(path).await?)
            }
            Ok(_) => Err(CardError::InvalidLocator(locator.to_owned())),
            Err(_) => Ok(tokio::fs::read(locator).await?),
        }
    }
}

/// Draw the card and encode it as PNG.
fn compose(
    background: &[u8],
    thumbnail: &[u8],
    font: Option<&FontArc>,
    title: &str,
    requested_by: &str,
) -> Result<Vec<u8>, CardError> {
    let mut canvas = image::load_from_memory(background)?
        .resize_exact(CARD_WIDTH, CARD_HEIGHT, FilterType::Triangle)
        .to_rgba8();

    let thumbnail = image::load_from_memory(thumbnail)?
        .resize_exact(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Triangle)
        .to_rgba8();
    imageops::overlay(&mut canvas, &thumbnail, THUMBNAIL_X, THUMBNAIL_Y);

    match font {
        Some(font) => {
            draw_line(&mut canvas, font, TITLE_SIZE, TITLE_BASELINE, title);
            draw_line(&mut canvas, font, REQUESTER_SIZE, REQUESTER_BASELINE, requested_by);
        }
        None => warn!("No font loaded, music card rendered without text"),
    }

    let mut png = Vec::new();
    canvas.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}

/// Draw one line of text with its baseline at `baseline`.
fn draw_line(canvas: &mut RgbaImage, font: &FontArc, size: f32, baseline: i32, text: &str) {
    let scale = PxScale::from(size);
    // imageproc positions text by the top of the line box, not the baseline
    let ascent = font.as_scaled(scale).ascent();
    let top = baseline - ascent.round() as i32;
    draw_text_mut(canvas, TEXT_COLOR, TEXT_X, top, scale, font, text);
}

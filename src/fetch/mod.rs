use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;
use std::time::Duration;

use image::GenericImageView;
use image::imageops::FilterType;
use reqwest::blocking::Client;
use thiserror::Error;
use tracing::debug;

pub mod url_rewrite;

const HTTP_TIMEOUT: Duration = Duration::from_secs(15);
const HTTP_USER_AGENT: &str = concat!("glance/", env!("CARGO_PKG_VERSION"));
const MAX_DECODED_SIDE: u32 = 4096;

/// Generation stamp for one fetch. The panel bumps its generation on every
/// open, so a completion carrying an older ticket is recognizably stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTicket(pub u64);

/// A decoded image ready for the host to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Completion of one fetch, delivered back to the host thread.
#[derive(Debug, Clone)]
pub enum FetchUpdate {
    Loaded {
        ticket: FetchTicket,
        image: PreviewImage,
    },
    Failed {
        ticket: FetchTicket,
        message: String,
    },
}

impl FetchUpdate {
    pub fn ticket(&self) -> FetchTicket {
        match self {
            Self::Loaded { ticket, .. } | Self::Failed { ticket, .. } => *ticket,
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("image request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),
}

/// Issues image loads. Completions travel back through whatever channel the
/// implementation was constructed with; `request` itself never blocks.
pub trait ImageFetcher {
    fn request(&mut self, ticket: FetchTicket, url: &str);
}

/// Fetches and decodes images on a background thread per request. Send
/// failures are ignored: the receiver disappearing just means the plugin
/// was torn down while a load was in flight.
pub struct HttpImageFetcher {
    updates: Sender<FetchUpdate>,
}

impl HttpImageFetcher {
    pub fn spawn() -> (Self, Receiver<FetchUpdate>) {
        let (updates, rx) = channel();
        (Self { updates }, rx)
    }
}

impl ImageFetcher for HttpImageFetcher {
    fn request(&mut self, ticket: FetchTicket, url: &str) {
        debug!(url, ticket = ticket.0, "requesting preview image");
        let updates = self.updates.clone();
        let url = url.to_string();
        thread::spawn(move || {
            let update = match fetch_image(&url) {
                Ok(image) => FetchUpdate::Loaded { ticket, image },
                Err(err) => FetchUpdate::Failed {
                    ticket,
                    message: err.to_string(),
                },
            };
            let _ = updates.send(update);
        });
    }
}

fn fetch_image(url: &str) -> Result<PreviewImage, FetchError> {
    let client = Client::builder().timeout(HTTP_TIMEOUT).build()?;
    let bytes = client
        .get(url)
        .header(reqwest::header::USER_AGENT, HTTP_USER_AGENT)
        .send()?
        .error_for_status()?
        .bytes()?;
    decode_preview(&bytes)
}

fn decode_preview(bytes: &[u8]) -> Result<PreviewImage, FetchError> {
    let decoded = image::load_from_memory(bytes)?;
    // Cap the decoded size before it reaches the panel; anything larger
    // only costs memory that the fit-to-bounds sizing would discard.
    let decoded = if decoded.width() > MAX_DECODED_SIDE || decoded.height() > MAX_DECODED_SIDE {
        decoded.resize(MAX_DECODED_SIDE, MAX_DECODED_SIDE, FilterType::Lanczos3)
    } else {
        decoded
    };
    let rgba = decoded.to_rgba8();
    Ok(PreviewImage {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut out, image::ImageFormat::Png)
            .expect("encode test png");
        out.into_inner()
    }

    #[test]
    fn decodes_dimensions_and_pixels() {
        let image = decode_preview(&png_bytes(3, 2)).expect("decode");
        assert_eq!((image.width, image.height), (3, 2));
        assert_eq!(image.rgba.len(), 3 * 2 * 4);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(matches!(
            decode_preview(b"definitely not an image"),
            Err(FetchError::Decode(_))
        ));
    }

    #[test]
    fn update_exposes_its_ticket() {
        let failed = FetchUpdate::Failed {
            ticket: FetchTicket(7),
            message: "boom".to_string(),
        };
        assert_eq!(failed.ticket(), FetchTicket(7));
    }
}

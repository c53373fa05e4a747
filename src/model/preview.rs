//! Preview handles for the selected image
//!
//! A `PreviewHandle` is the renderer's view of the current upload: metadata
//! plus a small decoded thumbnail. Metadata is read from the image header on
//! selection; the thumbnail is decoded on a worker thread and picked up by
//! `poll`. Handles are counted by the registry that created them and released
//! on drop, so the number of live previews is observable.

use super::upload::UploadedFile;
use std::cell::Cell;
use std::io::Cursor;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

/// Thumbnail bounds in terminal cells; each cell holds two vertical pixels
pub const THUMBNAIL_COLUMNS: u32 = 48;
pub const THUMBNAIL_ROWS: u32 = 18;

pub type Rgb = [u8; 3];

/// Downscaled image as rows of (upper, lower) half-block colors
#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    pub columns: u16,
    pub rows: Vec<Vec<(Rgb, Rgb)>>,
}

impl Thumbnail {
    fn from_bytes(bytes: &[u8]) -> Option<Thumbnail> {
        let img = match image::load_from_memory(bytes) {
            Ok(img) => img,
            Err(e) => {
                tracing::debug!(error = %e, "preview decode failed");
                return None;
            }
        };

        let small = img.thumbnail(THUMBNAIL_COLUMNS, THUMBNAIL_ROWS * 2).to_rgb8();
        let (width, height) = small.dimensions();

        let rows = (0..height.div_ceil(2))
            .map(|cy| {
                (0..width)
                    .map(|x| {
                        let upper = small.get_pixel(x, cy * 2).0;
                        let lower = if cy * 2 + 1 < height {
                            small.get_pixel(x, cy * 2 + 1).0
                        } else {
                            upper
                        };
                        (upper, lower)
                    })
                    .collect()
            })
            .collect();

        Some(Thumbnail {
            columns: width as u16,
            rows,
        })
    }
}

/// Pixel dimensions from the image header, without decoding pixels
fn header_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

#[derive(Debug)]
enum ThumbnailSlot {
    Decoding(Receiver<Option<Thumbnail>>),
    Ready(Thumbnail),
    Unavailable,
}

/// Renderer-facing reference to the current upload
#[derive(Debug)]
pub struct PreviewHandle {
    id: u64,
    pub file_name: String,
    pub mime: String,
    pub size_label: String,
    /// Pixel dimensions, when the header could be read
    pub dimensions: Option<(u32, u32)>,
    thumbnail: ThumbnailSlot,
    live: Rc<Cell<usize>>,
}

impl PreviewHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn thumbnail(&self) -> Option<&Thumbnail> {
        match &self.thumbnail {
            ThumbnailSlot::Ready(thumbnail) => Some(thumbnail),
            _ => None,
        }
    }

    pub fn is_decoding(&self) -> bool {
        matches!(self.thumbnail, ThumbnailSlot::Decoding(_))
    }

    /// Pick up a finished thumbnail; true when the handle changed
    pub fn poll(&mut self) -> bool {
        let ThumbnailSlot::Decoding(ref receiver) = self.thumbnail else {
            return false;
        };
        self.thumbnail = match receiver.try_recv() {
            Ok(Some(thumbnail)) => ThumbnailSlot::Ready(thumbnail),
            Ok(None) | Err(TryRecvError::Disconnected) => ThumbnailSlot::Unavailable,
            Err(TryRecvError::Empty) => return false,
        };
        true
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.live.set(self.live.get().saturating_sub(1));
        tracing::trace!(preview = self.id, "preview released");
    }
}

/// Creates preview handles and counts the ones still alive
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    live: Rc<Cell<usize>>,
    next_id: u64,
}

impl PreviewRegistry {
    /// Start a preview for `file`; the thumbnail arrives later through `poll`
    pub fn create(&mut self, file: &UploadedFile) -> PreviewHandle {
        self.next_id += 1;
        self.live.set(self.live.get() + 1);

        let dimensions = header_dimensions(&file.bytes);
        let thumbnail = match dimensions {
            Some(_) => ThumbnailSlot::Decoding(spawn_decoder(Arc::clone(&file.bytes))),
            None => ThumbnailSlot::Unavailable,
        };

        PreviewHandle {
            id: self.next_id,
            file_name: file.name.clone(),
            mime: file.mime.clone(),
            size_label: file.formatted_size(),
            dimensions,
            thumbnail,
            live: Rc::clone(&self.live),
        }
    }

    /// Number of handles created by this registry and not yet dropped
    pub fn live_count(&self) -> usize {
        self.live.get()
    }
}

fn spawn_decoder(bytes: Arc<[u8]>) -> Receiver<Option<Thumbnail>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        // The handle may have been dropped meanwhile
        let _ = tx.send(Thumbnail::from_bytes(&bytes));
    });
    rx
}

#[cfg(test)]
pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 10) as u8, (y * 10) as u8, 128])
    });
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn upload(bytes: Vec<u8>) -> UploadedFile {
        UploadedFile {
            name: "cake.png".to_string(),
            mime: "image/png".to_string(),
            bytes: bytes.into(),
        }
    }

    fn wait_for_thumbnail(handle: &mut PreviewHandle) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while handle.is_decoding() && Instant::now() < deadline {
            handle.poll();
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_drop_releases_handle() {
        let mut registry = PreviewRegistry::default();
        let handle = registry.create(&upload(vec![1, 2, 3]));
        assert_eq!(registry.live_count(), 1);

        drop(handle);
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_undecodable_payload_has_no_thumbnail() {
        let mut registry = PreviewRegistry::default();
        let handle = registry.create(&upload(b"not an image".to_vec()));

        assert!(!handle.is_decoding());
        assert!(handle.thumbnail().is_none());
        assert!(handle.dimensions.is_none());
        assert_eq!(handle.file_name, "cake.png");
    }

    #[test]
    fn test_metadata_is_ready_before_thumbnail() {
        let mut registry = PreviewRegistry::default();
        let handle = registry.create(&upload(png_bytes(200, 100)));

        assert_eq!(handle.dimensions, Some((200, 100)));
        assert_eq!(handle.file_name, "cake.png");
        assert!(handle.is_decoding());
        assert!(handle.thumbnail().is_none());
    }

    #[test]
    fn test_thumbnail_fits_bounds() {
        let mut registry = PreviewRegistry::default();
        let mut handle = registry.create(&upload(png_bytes(200, 100)));
        wait_for_thumbnail(&mut handle);

        let thumb = handle.thumbnail().unwrap();
        assert!(thumb.columns as u32 <= THUMBNAIL_COLUMNS);
        assert!(thumb.rows.len() as u32 <= THUMBNAIL_ROWS);
        assert!(thumb.rows.iter().all(|r| r.len() == thumb.columns as usize));
        assert!(!handle.poll());
    }

    #[test]
    fn test_ids_increase() {
        let mut registry = PreviewRegistry::default();
        let a = registry.create(&upload(vec![0]));
        let b = registry.create(&upload(vec![0]));
        assert!(b.id() > a.id());
        assert_eq!(registry.live_count(), 2);
    }
}

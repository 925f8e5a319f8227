//! The photo session: one named image and the transformations applied to it.
//!
//! Every transformation consumes the current value of the slot and replaces
//! it with its output; prior representations are not retained.
//!
//! Each operation comes in two forms. `try_*` methods return a [`Result`] and
//! leave it to the caller to decide what a failure means. The plain methods
//! call their `try_*` counterpart, log any error and return normally, so a
//! script can run a sequence of steps and keep going past a bad one. Neither
//! form rolls back state: if an image was decoded into a bitmap before an
//! encoding step failed, the slot keeps the bitmap.
//!
//! # Example
//!
//! ```ignore
//! use photokit_core::{PhotoSession, RelativeRect};
//!
//! let mut session = PhotoSession::new("giant-image");
//! session.fetch("https://images.alphacoders.com/601/601059.jpg");
//! session.compress(50);
//! session.persist("/tmp/original-");
//!
//! session.relative_crop(RelativeRect::new(5.0, 55.0, 17.0, 50.0));
//! session.persist_cropped("/tmp/face1-");
//! ```

use crate::error::{AppError, Result};
use crate::fetch::HttpFetcher;
use crate::image_data::ImageData;
use crate::image_processing::{CropRect, DEFAULT_JPEG_QUALITY, ImageProcessor, RelativeRect};
use image::DynamicImage;
use std::fs;
use std::path::PathBuf;

/// A named image held in memory, plus the last crop derived from it.
#[derive(Debug)]
pub struct PhotoSession {
    name: String,
    image: Option<ImageData>,
    cropped_image: Option<ImageData>,
    fetcher: Option<HttpFetcher>,
}

impl PhotoSession {
    /// Creates an empty session. `name` is used to build output file names.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: None,
            cropped_image: None,
            fetcher: None,
        }
    }

    /// Creates a session that starts out holding `image`.
    pub fn with_image(name: impl Into<String>, image: impl Into<ImageData>) -> Self {
        let mut session = Self::new(name);
        session.image = Some(image.into());
        session
    }

    /// Uses `fetcher` for downloads instead of a default client.
    pub fn with_fetcher(mut self, fetcher: HttpFetcher) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> Option<&ImageData> {
        self.image.as_ref()
    }

    pub fn cropped_image(&self) -> Option<&ImageData> {
        self.cropped_image.as_ref()
    }

    pub fn take_image(&mut self) -> Option<ImageData> {
        self.image.take()
    }

    /// Replaces the image with `image`, whatever its representation.
    pub fn set_image(&mut self, image: impl Into<ImageData>) {
        self.image = Some(image.into());
    }

    /// Sets the image to caller-supplied text, typically base64, without
    /// decoding it.
    pub fn assign(&mut self, text: impl Into<String>) {
        self.image = Some(ImageData::Base64Text(text.into()));
    }

    /// Path an image of this session is written to: `{directory}{name}.jpeg`.
    ///
    /// `directory` is prepended verbatim, so it may also carry a file name
    /// prefix such as `/tmp/original-`.
    pub fn output_path(&self, directory: &str) -> PathBuf {
        PathBuf::from(format!("{}{}.jpeg", directory, self.name))
    }

    /// Downloads `url` and stores the response body as raw bytes.
    ///
    /// On failure the image is left as it was.
    pub fn try_fetch(&mut self, url: &str) -> Result<()> {
        let fetcher = match self.fetcher.take() {
            Some(fetcher) => fetcher,
            None => HttpFetcher::new()?,
        };

        let result = fetcher.get(url);
        self.fetcher = Some(fetcher);

        self.image = Some(ImageData::RawBytes(result?));
        Ok(())
    }

    pub fn fetch(&mut self, url: &str) {
        log_failure("Error connecting to URL", self.try_fetch(url));
    }

    /// Writes the image to [`output_path`](Self::output_path).
    ///
    /// Raw bytes are written verbatim and a bitmap is encoded as JPEG first.
    /// Returns the written path, or `None` if there was nothing to write.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UnsupportedRepresentation`] for base64 text (no file
    /// is created) and [`AppError::Io`] if the write fails.
    pub fn try_persist(&self, directory: &str) -> Result<Option<PathBuf>> {
        self.write_slot(self.image.as_ref(), directory, "persist")
    }

    pub fn persist(&self, directory: &str) {
        log_failure("Error saving the image", self.try_persist(directory));
    }

    /// Same contract as [`try_persist`](Self::try_persist), for the cropped image.
    pub fn try_persist_cropped(&self, directory: &str) -> Result<Option<PathBuf>> {
        self.write_slot(self.cropped_image.as_ref(), directory, "persist_cropped")
    }

    pub fn persist_cropped(&self, directory: &str) {
        log_failure(
            "Error saving the cropped image",
            self.try_persist_cropped(directory),
        );
    }

    /// Re-encodes the image as JPEG and replaces it with the base64 text of
    /// the encoded bytes. Does nothing if the image is empty.
    pub fn try_to_base64(&mut self) -> Result<()> {
        if let Some(jpeg) = self.reencode(DEFAULT_JPEG_QUALITY)? {
            self.image = Some(ImageData::Base64Text(ImageProcessor::encode_base64(&jpeg)));
        }
        Ok(())
    }

    pub fn to_base64(&mut self) {
        log_failure("Error converting to base64", self.try_to_base64());
    }

    /// Decodes base64 text held in the image and replaces it with the bitmap.
    ///
    /// Raw bytes are read as ASCII base64 text.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::EmptyImage`] if there is no image and
    /// [`AppError::UnsupportedRepresentation`] if it is already a bitmap.
    pub fn try_from_base64(&mut self) -> Result<()> {
        let data = self
            .image
            .as_ref()
            .filter(|data| !data.is_empty())
            .ok_or(AppError::EmptyImage)?;

        let encoded: &[u8] = match data {
            ImageData::Base64Text(text) => text.as_bytes(),
            ImageData::RawBytes(bytes) => bytes,
            ImageData::Bitmap(_) => return Err(AppError::unsupported("from_base64", data.kind())),
        };

        let bytes = ImageProcessor::decode_base64(encoded)?;
        let bitmap = ImageProcessor::decode_bytes(&bytes)?;
        self.image = Some(ImageData::Bitmap(bitmap));
        Ok(())
    }

    pub fn from_base64(&mut self) {
        log_failure("Error decoding from base64", self.try_from_base64());
    }

    /// Re-encodes the image as JPEG at the default quality and stores the
    /// bytes. Does nothing if the image is empty.
    pub fn try_to_jpeg(&mut self) -> Result<()> {
        if let Some(jpeg) = self.reencode(DEFAULT_JPEG_QUALITY)? {
            self.image = Some(ImageData::RawBytes(jpeg));
        }
        Ok(())
    }

    pub fn to_jpeg(&mut self) {
        log_failure("Error converting to JPEG", self.try_to_jpeg());
    }

    /// Re-encodes the image as JPEG at `quality` (0-100) and stores the bytes.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidQuality`] above 100, before the image is
    /// touched.
    pub fn try_compress(&mut self, quality: u8) -> Result<()> {
        if let Some(jpeg) = self.reencode(quality)? {
            self.image = Some(ImageData::RawBytes(jpeg));
        }
        Ok(())
    }

    pub fn compress(&mut self, quality: u8) {
        log_failure("Error compressing the image", self.try_compress(quality));
    }

    /// Crops the current image by percentages and stores the JPEG-encoded
    /// result in the cropped image. The image itself is not modified.
    ///
    /// Returns the pixel rectangle that was cut, or `None` if the image is
    /// empty. See [`RelativeRect::to_pixels`] for the coordinate mapping.
    pub fn try_relative_crop(&mut self, area: RelativeRect) -> Result<Option<CropRect>> {
        let Some(source) = self.image.as_ref().filter(|data| !data.is_empty()) else {
            return Ok(None);
        };

        let bitmap = source.decode()?;
        match crop_to_jpeg(&bitmap, area) {
            Ok((rect, jpeg)) => {
                log::debug!(
                    "Cropped {}x{} at ({}, {}) from {}x{}",
                    rect.width,
                    rect.height,
                    rect.x,
                    rect.y,
                    bitmap.width(),
                    bitmap.height()
                );
                self.cropped_image = Some(ImageData::RawBytes(jpeg));
                Ok(Some(rect))
            }
            Err(e) => {
                self.cropped_image = Some(ImageData::Bitmap(bitmap));
                Err(e)
            }
        }
    }

    pub fn relative_crop(&mut self, area: RelativeRect) {
        log_failure("Error cropping the image", self.try_relative_crop(area));
    }

    /// Makes sure the image slot holds a bitmap, decoding it in place.
    fn ensure_bitmap(&mut self) -> Result<()> {
        let decoded = match &self.image {
            None => return Err(AppError::EmptyImage),
            Some(ImageData::Bitmap(_)) => return Ok(()),
            Some(other) => other.decode()?,
        };
        self.image = Some(ImageData::Bitmap(decoded));
        Ok(())
    }

    /// Decodes the image into a bitmap (kept in the slot) and encodes it as
    /// JPEG. `None` when the image is empty.
    fn reencode(&mut self, quality: u8) -> Result<Option<Vec<u8>>> {
        if self.image.as_ref().is_none_or(ImageData::is_empty) {
            return Ok(None);
        }
        if quality > 100 {
            return Err(AppError::InvalidQuality(quality));
        }

        self.ensure_bitmap()?;
        let bitmap = self
            .image
            .as_ref()
            .and_then(ImageData::as_bitmap)
            .ok_or(AppError::EmptyImage)?;

        ImageProcessor::encode_jpeg(bitmap, quality).map(Some)
    }

    fn write_slot(
        &self,
        slot: Option<&ImageData>,
        directory: &str,
        operation: &'static str,
    ) -> Result<Option<PathBuf>> {
        let Some(data) = slot.filter(|data| !data.is_empty()) else {
            return Ok(None);
        };

        let path = self.output_path(directory);
        match data {
            ImageData::RawBytes(bytes) => fs::write(&path, bytes)?,
            ImageData::Bitmap(bitmap) => {
                let jpeg = ImageProcessor::encode_jpeg(bitmap, DEFAULT_JPEG_QUALITY)?;
                fs::write(&path, jpeg)?;
            }
            ImageData::Base64Text(_) => return Err(AppError::unsupported(operation, data.kind())),
        }

        log::info!("Saved {} to {}", data.kind(), path.display());
        Ok(Some(path))
    }
}

fn crop_to_jpeg(bitmap: &DynamicImage, area: RelativeRect) -> Result<(CropRect, Vec<u8>)> {
    let rect = area.to_pixels(bitmap.width(), bitmap.height())?;
    let cropped = ImageProcessor::crop(bitmap, rect);
    let jpeg = ImageProcessor::encode_jpeg(&cropped, DEFAULT_JPEG_QUALITY)?;
    Ok((rect, jpeg))
}

fn log_failure<T>(context: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log::error!("{}: {}", context, e);
            None
        }
    }
}

//! LibRaw binding layer
//!
//! Opening camera RAW files, extracting embedded thumbnails, reading camera,
//! lens and exposure metadata, and decoding full sensor data into an
//! [`image::DynamicImage`] or a PPM/TIFF file written by LibRaw itself.
//!
//! All native work goes through the [`RawEngine`] seam. The system LibRaw
//! backs it when the crate is built with the library available.

pub mod common;
pub mod decoder;
pub mod engine;
#[cfg(has_libraw)]
pub mod native;
pub mod options;
pub mod output;
pub mod pixmap;
pub mod types;


pub use common::{DecodeError, NativeError, Result, StatusKind, translate};
pub use decoder::RawDecoder;
pub use engine::{BlockFormat, BlockHeader, ProcessedBlock, RawContext, RawEngine};
pub use options::{Demosaic, OutputBits, ProcessingOptions, ProcessingOptionsBuilder};
pub use pixmap::RawImageBuffer;
pub use types::{Camera, Lens, Metadata, ShotSettings};

#[cfg(has_libraw)]
pub use native::LibRaw;

#[cfg(has_libraw)]
mod convenience {
    use std::path::Path;

    use image::DynamicImage;

    use super::{Metadata, RawDecoder, Result};

    /// Exports the embedded thumbnail of `input_path` to `export_path`.
    pub fn extract_thumbnail<P: AsRef<Path>, Q: AsRef<Path>>(
        input_path: P,
        export_path: Q,
    ) -> Result<()> {
        RawDecoder::default().extract_thumbnail(input_path, export_path)
    }

    /// Reads camera, lens and exposure metadata.
    pub fn extract_metadata<P: AsRef<Path>>(path: P) -> Result<Metadata> {
        RawDecoder::default().extract_metadata(path)
    }

    /// Decodes a RAW file into an in-memory image.
    pub fn import_raw<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
        RawDecoder::default().import_raw(path)
    }

    /// Processes a RAW file and writes it as PPM.
    pub fn export_ppm<P: AsRef<Path>, Q: AsRef<Path>>(input_path: P, export_path: Q) -> Result<()> {
        RawDecoder::default().export_ppm(input_path, export_path)
    }
}

#[cfg(has_libraw)]
pub use convenience::{export_ppm, extract_metadata, extract_thumbnail, import_raw};

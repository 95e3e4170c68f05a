//! Host-owned copies of processed images and their pixel-map serialization.

use image::{DynamicImage, ImageFormat};
use tracing::{debug, error};

use crate::libraw::common::error::{DecodeError, Result};
use crate::libraw::engine::{BlockFormat, BlockHeader};

/// Processed pixels copied out of native memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImageBuffer {
    pub width: u32,
    pub height: u32,
    /// 1 (grey) or 3 (RGB) interleaved channels
    pub colors: u16,
    /// 8 or 16 bits per sample
    pub bits: u16,
    /// Packed samples, 16-bit ones in host byte order
    pub data: Vec<u8>,
}

impl RawImageBuffer {
    /// Validates a native block header and copies its payload.
    ///
    /// The declared size must match both the geometry and the bytes actually
    /// available before anything is allocated.
    pub fn from_block(header: BlockHeader, bytes: &[u8]) -> Result<Self> {
        if header.format != BlockFormat::Bitmap {
            return Err(DecodeError::UnsupportedImage(format!(
                "expected bitmap, got {:?}",
                header.format
            )));
        }
        if header.bits != 8 && header.bits != 16 {
            return Err(DecodeError::UnsupportedImage(format!(
                "{} bits per sample",
                header.bits
            )));
        }
        if header.colors != 1 && header.colors != 3 {
            return Err(DecodeError::UnsupportedImage(format!(
                "{} color channels",
                header.colors
            )));
        }
        if header.width == 0 || header.height == 0 {
            return Err(DecodeError::UnsupportedImage(format!(
                "empty image {}x{}",
                header.width, header.height
            )));
        }

        let expected = (header.width as u64)
            .checked_mul(header.height as u64)
            .and_then(|n| n.checked_mul(header.colors as u64))
            .and_then(|n| n.checked_mul(header.bits as u64 / 8))
            .ok_or_else(|| {
                DecodeError::UnsupportedImage(format!(
                    "dimensions {}x{} overflow",
                    header.width, header.height
                ))
            })?;
        if header.data_size != expected || bytes.len() as u64 != expected {
            return Err(DecodeError::BlockSize {
                declared: header.data_size,
                expected,
            });
        }

        Ok(Self {
            width: header.width,
            height: header.height,
            colors: header.colors,
            bits: header.bits,
            data: bytes.to_vec(),
        })
    }

    pub fn data_size(&self) -> usize {
        self.data.len()
    }

    pub fn max_value(&self) -> u32 {
        (1u32 << self.bits) - 1
    }

    /// Three-line ASCII header: magic, dimensions, maxval.
    pub fn header(&self) -> String {
        let magic = if self.colors == 1 { "P5" } else { "P6" };
        format!(
            "{magic}\n{} {}\n{}\n",
            self.width,
            self.height,
            self.max_value()
        )
    }

    /// Serializes into a binary PNM container.
    ///
    /// PNM stores 16-bit samples most significant byte first.
    pub fn to_pixmap(&self) -> Vec<u8> {
        let header = self.header();
        let mut out = Vec::with_capacity(header.len() + self.data.len());
        out.extend_from_slice(header.as_bytes());
        if self.bits == 16 {
            for sample in self.data.chunks_exact(2) {
                let value = u16::from_ne_bytes([sample[0], sample[1]]);
                out.extend_from_slice(&value.to_be_bytes());
            }
        } else {
            out.extend_from_slice(&self.data);
        }
        out
    }

    /// Decodes the synthesized container into a standard image.
    ///
    /// The header describes the very buffer it precedes, so a failure here is
    /// a bug in this module rather than bad input.
    pub fn decode(&self) -> Result<DynamicImage> {
        let pixmap = self.to_pixmap();
        debug!(bytes = pixmap.len(), "Decoding synthesized pixel map");
        image::load_from_memory_with_format(&pixmap, ImageFormat::Pnm).map_err(|e| {
            error!(
                width = self.width,
                height = self.height,
                bits = self.bits,
                "Pixel map rejected by decoder: {}",
                e
            );
            DecodeError::InvariantViolation(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    fn header(width: u32, height: u32, colors: u16, bits: u16) -> BlockHeader {
        BlockHeader {
            format: BlockFormat::Bitmap,
            width,
            height,
            colors,
            bits,
            data_size: width as u64 * height as u64 * colors as u64 * (bits as u64 / 8),
        }
    }

    #[test]
    fn test_header_text() {
        let bytes = vec![0u8; 4 * 3 * 3];
        let buffer = RawImageBuffer::from_block(header(4, 3, 3, 8), &bytes).unwrap();
        assert_eq!(buffer.header(), "P6\n4 3\n255\n");

        let bytes = vec![0u8; 4 * 3 * 3 * 2];
        let buffer = RawImageBuffer::from_block(header(4, 3, 3, 16), &bytes).unwrap();
        assert_eq!(buffer.header(), "P6\n4 3\n65535\n");
    }

    #[test]
    fn test_copy_is_exact() {
        let bytes: Vec<u8> = (0..2 * 2 * 3).map(|v| v as u8).collect();
        let buffer = RawImageBuffer::from_block(header(2, 2, 3, 8), &bytes).unwrap();
        assert_eq!(buffer.data, bytes);
        assert_eq!(buffer.data_size(), 12);
    }

    #[test]
    fn test_decode_rgb8() {
        let bytes: Vec<u8> = vec![
            255, 0, 0, 0, 255, 0, //
            0, 0, 255, 10, 20, 30,
        ];
        let buffer = RawImageBuffer::from_block(header(2, 2, 3, 8), &bytes).unwrap();
        let image = buffer.decode().unwrap();

        assert_eq!(image.dimensions(), (2, 2));
        let rgb = image.to_rgb8();
        assert_eq!(rgb.pixels().count(), 4);
        assert_eq!(rgb.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(rgb.get_pixel(1, 0).0, [0, 255, 0]);
        assert_eq!(rgb.get_pixel(1, 1).0, [10, 20, 30]);
    }

    #[test]
    fn test_decode_rgb16_keeps_sample_values() {
        let samples: [u16; 3] = [0x1234, 0xABCD, 0x0001];
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_ne_bytes()).collect();
        let buffer = RawImageBuffer::from_block(header(1, 1, 3, 16), &bytes).unwrap();

        let image = buffer.decode().unwrap();
        let rgb = image.to_rgb16();
        assert_eq!(rgb.get_pixel(0, 0).0, samples);
    }

    #[test]
    fn test_decode_grey() {
        let bytes = vec![1u8, 2, 3, 4, 5, 6];
        let buffer = RawImageBuffer::from_block(header(3, 2, 1, 8), &bytes).unwrap();
        assert!(buffer.header().starts_with("P5\n"));

        let image = buffer.decode().unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.to_luma8().get_pixel(2, 1).0, [6]);
    }

    #[test]
    fn test_declared_size_mismatch() {
        let mut h = header(2, 2, 3, 8);
        h.data_size = 11;
        let bytes = vec![0u8; 11];
        assert!(matches!(
            RawImageBuffer::from_block(h, &bytes),
            Err(DecodeError::BlockSize {
                declared: 11,
                expected: 12
            })
        ));
    }

    #[test]
    fn test_truncated_payload() {
        let bytes = vec![0u8; 6];
        assert!(matches!(
            RawImageBuffer::from_block(header(2, 2, 3, 8), &bytes),
            Err(DecodeError::BlockSize { .. })
        ));
    }

    #[test]
    fn test_oversized_dimensions_are_rejected() {
        let h = BlockHeader {
            format: BlockFormat::Bitmap,
            width: u32::MAX,
            height: u32::MAX,
            colors: 3,
            bits: 16,
            data_size: 4,
        };
        assert!(matches!(
            RawImageBuffer::from_block(h, &[0u8; 4]),
            Err(DecodeError::UnsupportedImage(_))
        ));
    }

    #[test]
    fn test_rejects_jpeg_and_odd_shapes() {
        let mut h = header(2, 2, 3, 8);
        h.format = BlockFormat::Jpeg;
        assert!(matches!(
            RawImageBuffer::from_block(h, &[0u8; 12]),
            Err(DecodeError::UnsupportedImage(_))
        ));

        assert!(matches!(
            RawImageBuffer::from_block(header(2, 2, 3, 12), &[0u8; 12]),
            Err(DecodeError::UnsupportedImage(_))
        ));
        assert!(matches!(
            RawImageBuffer::from_block(header(2, 2, 4, 8), &[0u8; 16]),
            Err(DecodeError::UnsupportedImage(_))
        ));
        assert!(matches!(
            RawImageBuffer::from_block(header(0, 2, 3, 8), &[]),
            Err(DecodeError::UnsupportedImage(_))
        ));
    }
}

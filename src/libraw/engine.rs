use std::ffi::CStr;

use crate::libraw::common::status::NativeError;
use crate::libraw::options::ProcessingOptions;
use crate::libraw::types::{Camera, Lens, ShotSettings};

pub type NativeResult<T = ()> = std::result::Result<T, NativeError>;

/// Source of processing contexts.
///
/// Every public operation acquires a fresh context and never shares it.
pub trait RawEngine {
    type Context: RawContext;

    fn acquire(&self) -> Self::Context;
}

/// One open/decode session against the native library.
///
/// Dropping the context releases it. String fields are copied into owned
/// values before being returned, so nothing returned borrows native memory.
pub trait RawContext {
    type Block: ProcessedBlock;

    fn open_file(&mut self, path: &CStr) -> NativeResult;
    fn apply_options(&mut self, options: &ProcessingOptions);
    fn unpack(&mut self) -> NativeResult;
    fn unpack_thumb(&mut self) -> NativeResult;
    fn process(&mut self) -> NativeResult;
    fn make_mem_image(&mut self) -> NativeResult<Self::Block>;
    fn write_thumbnail(&mut self, path: &CStr) -> NativeResult;
    fn write_ppm_tiff(&mut self, path: &CStr) -> NativeResult;

    fn camera(&self) -> Camera;
    fn lens(&self) -> Lens;
    fn shot(&self) -> ShotSettings;
    /// Raw sensor (width, height)
    fn raw_size(&self) -> (u32, u32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockFormat {
    Bitmap,
    Jpeg,
    Other(u32),
}

/// Shape of a processed image block as reported by the native library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub format: BlockFormat,
    pub width: u32,
    pub height: u32,
    pub colors: u16,
    pub bits: u16,
    /// Byte length the library claims for the payload
    pub data_size: u64,
}

/// A processed image allocated by the native library.
///
/// Has its own release (on drop), independent of the context it came from.
pub trait ProcessedBlock {
    fn header(&self) -> BlockHeader;
    /// The payload, exactly `header().data_size` bytes long.
    fn bytes(&self) -> &[u8];
}

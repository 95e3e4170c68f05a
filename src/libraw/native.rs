//! LibRaw-backed engine.
//!
//! Two RAII guards own the native allocations: [`Processor`] wraps a
//! `libraw_data_t` (released with `libraw_close`) and [`MemImage`] wraps a
//! `libraw_processed_image_t` (released with `libraw_dcraw_clear_mem`).

use std::alloc::{Layout, handle_alloc_error};
use std::ffi::{CStr, c_int};
use std::ptr::NonNull;
use std::slice;
use std::sync::OnceLock;

use tracing::{debug, info, trace};

use crate::libraw::common::cstr::fixed_cstr;
use crate::libraw::common::status::{NativeError, check_with};
use crate::libraw::engine::{
    BlockFormat, BlockHeader, NativeResult, ProcessedBlock, RawContext, RawEngine,
};
use crate::libraw::options::ProcessingOptions;
use crate::libraw::types::{Camera, Lens, ShotSettings};

#[allow(non_upper_case_globals)]
#[allow(non_camel_case_types)]
#[allow(non_snake_case)]
#[allow(dead_code)]
#[allow(clippy::all)]
mod sys {
    include!(concat!(env!("OUT_DIR"), "/libraw_bindings.rs"));
}

/// Version string of the linked library.
pub fn version() -> String {
    // SAFETY: libraw_version returns a pointer to a static string.
    unsafe { CStr::from_ptr(sys::libraw_version()) }
        .to_string_lossy()
        .into_owned()
}

/// Number of camera models the linked library can decode.
pub fn camera_count() -> i32 {
    // SAFETY: no arguments, reads static tables.
    unsafe { sys::libraw_cameraCount() }
}

fn strerror(code: i32) -> String {
    // SAFETY: libraw_strerror returns a static string for every input.
    unsafe { CStr::from_ptr(sys::libraw_strerror(code as c_int)) }
        .to_string_lossy()
        .into_owned()
}

fn check(code: c_int) -> NativeResult {
    check_with(code, strerror)
}

static LIBRARY_INFO: OnceLock<(String, i32)> = OnceLock::new();

/// The engine backed by the system LibRaw.
#[derive(Debug, Clone, Copy, Default)]
pub struct LibRaw;

impl RawEngine for LibRaw {
    type Context = Processor;

    fn acquire(&self) -> Processor {
        LIBRARY_INFO.get_or_init(|| {
            let info = (version(), camera_count());
            info!(version = %info.0, cameras = info.1, "LibRaw loaded");
            info
        });

        // SAFETY: flags 0 requests default behaviour.
        let ptr = unsafe { sys::libraw_init(0) };
        match NonNull::new(ptr) {
            Some(inner) => {
                trace!("Processing context acquired");
                Processor { inner }
            }
            None => handle_alloc_error(Layout::new::<sys::libraw_data_t>()),
        }
    }
}

/// Owned `libraw_data_t`.
#[derive(Debug)]
pub struct Processor {
    inner: NonNull<sys::libraw_data_t>,
}

// SAFETY: Processor owns its context exclusively; LibRaw is safe to use from
// any thread as long as one context is not touched concurrently.
unsafe impl Send for Processor {}

impl Drop for Processor {
    fn drop(&mut self) {
        // SAFETY: we own this pointer, it came from libraw_init and is closed once.
        unsafe { sys::libraw_close(self.inner.as_ptr()) };
        trace!("Processing context released");
    }
}

impl Processor {
    fn ptr(&self) -> *mut sys::libraw_data_t {
        self.inner.as_ptr()
    }
}

impl RawContext for Processor {
    type Block = MemImage;

    fn open_file(&mut self, path: &CStr) -> NativeResult {
        // SAFETY: valid context, NUL-terminated path that outlives the call.
        check(unsafe { sys::libraw_open_file(self.ptr(), path.as_ptr()) })
    }

    fn apply_options(&mut self, options: &ProcessingOptions) {
        // SAFETY: params is plain data inside the context we own.
        let params = unsafe { &mut (*self.ptr()).params };
        params.output_bps = options.output_bits.bits();
        params.output_tiff = options.output_tiff as c_int;
        params.half_size = options.half_size as c_int;
        params.use_camera_wb = options.use_camera_wb as c_int;
        params.no_auto_bright = options.no_auto_bright as c_int;
        if let Some(demosaic) = options.demosaic {
            params.user_qual = demosaic.user_qual();
        }
        debug!(?options, "Processing options applied");
    }

    fn unpack(&mut self) -> NativeResult {
        // SAFETY: valid, opened context.
        check(unsafe { sys::libraw_unpack(self.ptr()) })
    }

    fn unpack_thumb(&mut self) -> NativeResult {
        // SAFETY: valid, opened context.
        check(unsafe { sys::libraw_unpack_thumb(self.ptr()) })
    }

    fn process(&mut self) -> NativeResult {
        // SAFETY: valid, unpacked context.
        check(unsafe { sys::libraw_dcraw_process(self.ptr()) })
    }

    fn make_mem_image(&mut self) -> NativeResult<MemImage> {
        let mut errc: c_int = 0;
        // SAFETY: valid, processed context; errc outlives the call.
        let ptr = unsafe { sys::libraw_dcraw_make_mem_image(self.ptr(), &mut errc) };
        // Take ownership first so a non-null block is freed even on error.
        let block = NonNull::new(ptr).map(|inner| MemImage { inner });
        check(errc)?;
        block.ok_or_else(|| NativeError::unspecified("libraw returned no image"))
    }

    fn write_thumbnail(&mut self, path: &CStr) -> NativeResult {
        // SAFETY: valid context with an unpacked thumbnail.
        check(unsafe { sys::libraw_dcraw_thumb_writer(self.ptr(), path.as_ptr()) })
    }

    fn write_ppm_tiff(&mut self, path: &CStr) -> NativeResult {
        // SAFETY: valid, processed context.
        check(unsafe { sys::libraw_dcraw_ppm_tiff_writer(self.ptr(), path.as_ptr()) })
    }

    fn camera(&self) -> Camera {
        // SAFETY: libraw_get_iparams returns a pointer into the context, which
        // is alive for this borrow; every field is copied out immediately.
        let iparams = unsafe { &*sys::libraw_get_iparams(self.ptr()) };
        Camera {
            make: fixed_cstr(&iparams.normalized_make),
            model: fixed_cstr(&iparams.normalized_model),
            software: fixed_cstr(&iparams.software),
            colors: iparams.colors as u32,
        }
    }

    fn lens(&self) -> Lens {
        // SAFETY: as in camera().
        let lensinfo = unsafe { &*sys::libraw_get_lensinfo(self.ptr()) };
        Lens {
            make: fixed_cstr(&lensinfo.LensMake),
            model: fixed_cstr(&lensinfo.Lens),
            serial: fixed_cstr(&lensinfo.LensSerial),
            min_focal: lensinfo.MinFocal as f64,
            max_focal: lensinfo.MaxFocal as f64,
            max_ap_min_focal: lensinfo.MaxAp4MinFocal as f64,
            max_ap_max_focal: lensinfo.MaxAp4MaxFocal as f64,
        }
    }

    fn shot(&self) -> ShotSettings {
        // SAFETY: as in camera().
        let other = unsafe { &*sys::libraw_get_imgother(self.ptr()) };
        ShotSettings {
            timestamp: other.timestamp as i64,
            iso: other.iso_speed as u32,
            aperture: other.aperture as f64,
            shutter: other.shutter as f64,
            focal_length: other.focal_len as f64,
            artist: fixed_cstr(&other.artist),
        }
    }

    fn raw_size(&self) -> (u32, u32) {
        // SAFETY: valid context.
        let (width, height) = unsafe {
            (
                sys::libraw_get_raw_width(self.ptr()),
                sys::libraw_get_raw_height(self.ptr()),
            )
        };
        (width.max(0) as u32, height.max(0) as u32)
    }
}

/// Owned `libraw_processed_image_t`.
#[derive(Debug)]
pub struct MemImage {
    inner: NonNull<sys::libraw_processed_image_t>,
}

// SAFETY: a plain heap block owned exclusively by this guard.
unsafe impl Send for MemImage {}

impl Drop for MemImage {
    fn drop(&mut self) {
        // SAFETY: allocated by libraw_dcraw_make_mem_image, freed once.
        unsafe { sys::libraw_dcraw_clear_mem(self.inner.as_ptr()) };
        trace!("Processed image block released");
    }
}

impl ProcessedBlock for MemImage {
    fn header(&self) -> BlockHeader {
        // SAFETY: the block is alive while self is.
        let img = unsafe { self.inner.as_ref() };
        let format = match img.type_ {
            sys::LibRaw_image_formats_LIBRAW_IMAGE_BITMAP => BlockFormat::Bitmap,
            sys::LibRaw_image_formats_LIBRAW_IMAGE_JPEG => BlockFormat::Jpeg,
            other => BlockFormat::Other(other as u32),
        };
        BlockHeader {
            format,
            width: img.width as u32,
            height: img.height as u32,
            colors: img.colors as u16,
            bits: img.bits as u16,
            data_size: img.data_size as u64,
        }
    }

    fn bytes(&self) -> &[u8] {
        // SAFETY: `data` is a trailing array of `data_size` bytes allocated
        // together with the header; the slice borrows self, so it cannot
        // outlive the block.
        unsafe {
            let img = self.inner.as_ptr();
            let len = (*img).data_size as usize;
            slice::from_raw_parts(std::ptr::addr_of!((*img).data).cast::<u8>(), len)
        }
    }
}

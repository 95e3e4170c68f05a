use std::fs;
use std::path::Path;

use image::DynamicImage;
use tracing::{debug, info, instrument, warn};

use crate::libraw::{
    common::cstr::path_to_cstring,
    common::error::{DecodeError, Result},
    engine::{ProcessedBlock, RawContext, RawEngine},
    options::ProcessingOptions,
    output::StagedOutput,
    pixmap::RawImageBuffer,
    types::Metadata,
};

#[cfg(has_libraw)]
use crate::libraw::native::LibRaw;

/// Entry point for all RAW operations.
///
/// Each method acquires its own context from the engine and releases it
/// before returning, on success and on every error path.
pub struct RawDecoder<E: RawEngine> {
    engine: E,
    options: ProcessingOptions,
}

#[cfg(has_libraw)]
impl RawDecoder<LibRaw> {
    pub fn new(options: ProcessingOptions) -> Self {
        Self {
            engine: LibRaw,
            options,
        }
    }
}

#[cfg(has_libraw)]
impl Default for RawDecoder<LibRaw> {
    fn default() -> Self {
        Self::new(ProcessingOptions::default())
    }
}

fn require_input(path: &Path) -> Result<fs::Metadata> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(meta),
        _ => Err(DecodeError::InputMissing(path.to_path_buf())),
    }
}

fn require_absent(path: &Path) -> Result<()> {
    // symlink_metadata so a dangling link still counts as occupied
    if fs::symlink_metadata(path).is_ok() {
        return Err(DecodeError::OutputExists(path.to_path_buf()));
    }
    Ok(())
}

impl<E: RawEngine> RawDecoder<E> {
    pub fn with_engine(engine: E, options: ProcessingOptions) -> Self {
        Self { engine, options }
    }

    pub fn options(&self) -> &ProcessingOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: ProcessingOptions) {
        self.options = options;
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    fn open(&self, path: &Path) -> Result<E::Context> {
        let native_path = path_to_cstring(path)?;
        let mut ctx = self.engine.acquire();
        {
            let _span = tracing::info_span!("open").entered();
            ctx.open_file(&native_path)
                .map_err(|source| DecodeError::Open {
                    path: path.to_path_buf(),
                    source,
                })?;
        }
        ctx.apply_options(&self.options);
        Ok(ctx)
    }

    /// Opens, unpacks and processes; the shared prefix of import and export.
    fn develop(&self, path: &Path) -> Result<E::Context> {
        let mut ctx = self.open(path)?;

        {
            let _span = tracing::info_span!("unpack").entered();
            ctx.unpack().map_err(|source| DecodeError::Unpack {
                path: path.to_path_buf(),
                source,
            })?;
        }

        {
            let _span = tracing::info_span!("process").entered();
            ctx.process().map_err(|source| DecodeError::Process {
                path: path.to_path_buf(),
                source,
            })?;
        }

        Ok(ctx)
    }

    /// Reads camera, lens and exposure information without decoding pixels.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn extract_metadata<P: AsRef<Path>>(&self, path: P) -> Result<Metadata> {
        let path = path.as_ref();
        let stat = require_input(path)?;

        let ctx = self.open(path)?;
        let camera = ctx.camera();
        let lens = ctx.lens();
        let shot = ctx.shot();
        let (width, height) = ctx.raw_size();
        drop(ctx);

        let metadata = Metadata {
            timestamp: shot.timestamp,
            width,
            height,
            data_size: stat.len(),
            camera,
            lens,
            iso: shot.iso,
            aperture: shot.aperture,
            shutter: shot.shutter,
            focal_length: shot.focal_length,
            artist: shot.artist,
        };

        debug!(
            make = %metadata.camera.make,
            model = %metadata.camera.model,
            width,
            height,
            "Metadata extracted"
        );
        Ok(metadata)
    }

    /// Writes the embedded preview of `input_path` to `export_path` verbatim.
    ///
    /// Much cheaper than [`import_raw`](Self::import_raw): the main image is
    /// never unpacked. Files without a usable preview fail with
    /// [`DecodeError::NoThumbnail`].
    #[instrument(skip(self, input_path, export_path))]
    pub fn extract_thumbnail<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        export_path: Q,
    ) -> Result<()> {
        let input_path = input_path.as_ref();
        let export_path = export_path.as_ref();

        require_absent(export_path)?;
        require_input(input_path)?;

        info!(
            input = %input_path.display(),
            output = %export_path.display(),
            "Extracting thumbnail"
        );

        let mut ctx = self.open(input_path)?;

        {
            let _span = tracing::info_span!("unpack_thumb").entered();
            ctx.unpack_thumb().map_err(|source| {
                if source.kind().is_missing_thumbnail() {
                    warn!(input = %input_path.display(), "No usable embedded thumbnail");
                    DecodeError::NoThumbnail {
                        path: input_path.to_path_buf(),
                        source,
                    }
                } else {
                    DecodeError::UnpackThumbnail {
                        path: input_path.to_path_buf(),
                        source,
                    }
                }
            })?;
        }

        let staged = StagedOutput::new(export_path)?;
        {
            let _span = tracing::info_span!("write").entered();
            ctx.write_thumbnail(staged.native_path())
                .map_err(|source| DecodeError::Write {
                    path: export_path.to_path_buf(),
                    source,
                })?;
        }
        drop(ctx);

        staged.commit()
    }

    /// Fully decodes `path` into an in-memory image.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn import_raw<P: AsRef<Path>>(&self, path: P) -> Result<DynamicImage> {
        let path = path.as_ref();
        require_input(path)?;

        info!("Starting RAW import");

        let mut ctx = self.develop(path)?;

        let buffer = {
            let _span = tracing::info_span!("make_mem_image").entered();
            let block = ctx.make_mem_image().map_err(|source| DecodeError::MemImage {
                path: path.to_path_buf(),
                source,
            })?;
            let header = block.header();
            debug!(?header, "Processed image block");
            RawImageBuffer::from_block(header, block.bytes())?
        };
        drop(ctx);

        let image = {
            let _span = tracing::info_span!(
                "decode_pixmap",
                width = buffer.width,
                height = buffer.height
            )
            .entered();
            buffer.decode()?
        };

        info!(
            width = buffer.width,
            height = buffer.height,
            bits = buffer.bits,
            "Import complete"
        );
        Ok(image)
    }

    /// Fully processes `input_path` and lets the native writer produce a
    /// PPM (or TIFF, see [`ProcessingOptions::output_tiff`]) at `export_path`.
    #[instrument(skip(self, input_path, export_path))]
    pub fn export_ppm<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        export_path: Q,
    ) -> Result<()> {
        let input_path = input_path.as_ref();
        let export_path = export_path.as_ref();

        require_absent(export_path)?;
        require_input(input_path)?;

        info!(
            input = %input_path.display(),
            output = %export_path.display(),
            tiff = self.options.output_tiff,
            "Exporting file"
        );

        let mut ctx = self.develop(input_path)?;

        let staged = StagedOutput::new(export_path)?;
        {
            let _span = tracing::info_span!("write").entered();
            ctx.write_ppm_tiff(staged.native_path())
                .map_err(|source| DecodeError::Write {
                    path: export_path.to_path_buf(),
                    source,
                })?;
        }
        drop(ctx);

        staged.commit()
    }
}

//! Processing configuration applied to every native context

/// Bit depth of processed output samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputBits {
    Eight,
    Sixteen,
}

impl OutputBits {
    pub fn bits(self) -> i32 {
        match self {
            OutputBits::Eight => 8,
            OutputBits::Sixteen => 16,
        }
    }
}

/// Demosaic algorithms understood by LibRaw's `user_qual` parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Demosaic {
    /// Bilinear interpolation (fastest)
    Linear,
    Vng,
    Ppg,
    /// Adaptive homogeneity-directed (library default)
    Ahd,
    Dcb,
    Dht,
    /// Modified AHD
    Aahd,
}

impl Demosaic {
    pub fn user_qual(self) -> i32 {
        match self {
            Demosaic::Linear => 0,
            Demosaic::Vng => 1,
            Demosaic::Ppg => 2,
            Demosaic::Ahd => 3,
            Demosaic::Dcb => 4,
            Demosaic::Dht => 11,
            Demosaic::Aahd => 12,
        }
    }
}

/// Configuration for RAW processing and export
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingOptions {
    /// Sample depth of processed images
    pub output_bits: OutputBits,
    /// Whether the native writer emits TIFF instead of PPM on export
    pub output_tiff: bool,
    /// Decode at half resolution, skipping demosaic (much faster)
    pub half_size: bool,
    /// Use the white balance recorded by the camera
    pub use_camera_wb: bool,
    /// Disable automatic brightness adjustment
    pub no_auto_bright: bool,
    /// Demosaic algorithm, `None` keeps the library default
    pub demosaic: Option<Demosaic>,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            output_bits: OutputBits::Eight,
            output_tiff: false,
            half_size: false,
            use_camera_wb: true,
            no_auto_bright: false,
            demosaic: None,
        }
    }
}

impl ProcessingOptions {
    pub fn builder() -> ProcessingOptionsBuilder {
        ProcessingOptionsBuilder::default()
    }
}

/// Builder for ProcessingOptions
#[derive(Default)]
pub struct ProcessingOptionsBuilder {
    output_bits: Option<OutputBits>,
    output_tiff: Option<bool>,
    half_size: Option<bool>,
    use_camera_wb: Option<bool>,
    no_auto_bright: Option<bool>,
    demosaic: Option<Option<Demosaic>>,
}

impl ProcessingOptionsBuilder {
    pub fn output_bits(mut self, bits: OutputBits) -> Self {
        self.output_bits = Some(bits);
        self
    }

    pub fn output_tiff(mut self, enable: bool) -> Self {
        self.output_tiff = Some(enable);
        self
    }

    pub fn half_size(mut self, enable: bool) -> Self {
        self.half_size = Some(enable);
        self
    }

    pub fn use_camera_wb(mut self, enable: bool) -> Self {
        self.use_camera_wb = Some(enable);
        self
    }

    pub fn no_auto_bright(mut self, enable: bool) -> Self {
        self.no_auto_bright = Some(enable);
        self
    }

    pub fn demosaic(mut self, demosaic: Option<Demosaic>) -> Self {
        self.demosaic = Some(demosaic);
        self
    }

    pub fn build(self) -> ProcessingOptions {
        let default = ProcessingOptions::default();
        ProcessingOptions {
            output_bits: self.output_bits.unwrap_or(default.output_bits),
            output_tiff: self.output_tiff.unwrap_or(default.output_tiff),
            half_size: self.half_size.unwrap_or(default.half_size),
            use_camera_wb: self.use_camera_wb.unwrap_or(default.use_camera_wb),
            no_auto_bright: self.no_auto_bright.unwrap_or(default.no_auto_bright),
            demosaic: self.demosaic.unwrap_or(default.demosaic),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_match_default() {
        assert_eq!(ProcessingOptions::builder().build(), ProcessingOptions::default());
    }

    #[test]
    fn test_builder_overrides() {
        let options = ProcessingOptions::builder()
            .output_bits(OutputBits::Sixteen)
            .output_tiff(true)
            .half_size(true)
            .use_camera_wb(false)
            .no_auto_bright(true)
            .demosaic(Some(Demosaic::Dht))
            .build();

        assert_eq!(options.output_bits.bits(), 16);
        assert!(options.output_tiff);
        assert!(options.half_size);
        assert!(!options.use_camera_wb);
        assert!(options.no_auto_bright);
        assert_eq!(options.demosaic.map(Demosaic::user_qual), Some(11));
    }
}

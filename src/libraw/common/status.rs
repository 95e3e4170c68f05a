//! Native status codes and their translation into Rust errors.

use thiserror::Error;

/// Classification of a LibRaw status code.
///
/// Negative values are LibRaw's own error enumeration, positive values are
/// OS `errno` values surfaced by the file layer (e.g. `ENOENT` from open).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Unspecified,
    FileUnsupported,
    RequestForNonexistentImage,
    OutOfOrderCall,
    NoThumbnail,
    UnsupportedThumbnail,
    InputClosed,
    NotImplemented,
    RequestForNonexistentThumbnail,
    InsufficientMemory,
    DataError,
    IoError,
    CancelledByCallback,
    BadCrop,
    TooBig,
    MempoolOverflow,
    Os(i32),
    Unknown(i32),
}

impl StatusKind {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => StatusKind::Success,
            -1 => StatusKind::Unspecified,
            -2 => StatusKind::FileUnsupported,
            -3 => StatusKind::RequestForNonexistentImage,
            -4 => StatusKind::OutOfOrderCall,
            -5 => StatusKind::NoThumbnail,
            -6 => StatusKind::UnsupportedThumbnail,
            -7 => StatusKind::InputClosed,
            -8 => StatusKind::NotImplemented,
            -9 => StatusKind::RequestForNonexistentThumbnail,
            -100007 => StatusKind::InsufficientMemory,
            -100008 => StatusKind::DataError,
            -100009 => StatusKind::IoError,
            -100010 => StatusKind::CancelledByCallback,
            -100011 => StatusKind::BadCrop,
            -100012 => StatusKind::TooBig,
            -100013 => StatusKind::MempoolOverflow,
            errno if errno > 0 => StatusKind::Os(errno),
            other => StatusKind::Unknown(other),
        }
    }

    /// Same wording as `libraw_strerror` for LibRaw's own codes.
    pub fn description(&self) -> String {
        let text = match self {
            StatusKind::Success => "No error",
            StatusKind::Unspecified => "Unspecified error",
            StatusKind::FileUnsupported => "Unsupported file format or not RAW file",
            StatusKind::RequestForNonexistentImage => "Request for nonexisting image number",
            StatusKind::OutOfOrderCall => "Out of order call of libraw function",
            StatusKind::NoThumbnail => "No thumbnail in file",
            StatusKind::UnsupportedThumbnail => "Unsupported thumbnail format",
            StatusKind::InputClosed => "No input stream, or input stream closed",
            StatusKind::NotImplemented => "Decoder not implemented for this data format",
            StatusKind::RequestForNonexistentThumbnail => "Request for nonexisting thumbnail number",
            StatusKind::InsufficientMemory => "Unsufficient memory",
            StatusKind::DataError => "Corrupted data or unexpected EOF",
            StatusKind::IoError => "Input/output error",
            StatusKind::CancelledByCallback => "Cancelled by user callback",
            StatusKind::BadCrop => "Bad crop box",
            StatusKind::TooBig => "Image too big for processing",
            StatusKind::MempoolOverflow => "Libraw internal mempool overflowed",
            StatusKind::Os(errno) => {
                return std::io::Error::from_raw_os_error(*errno).to_string();
            }
            StatusKind::Unknown(_) => "Unknown error code",
        };
        text.to_string()
    }

    /// True for the codes meaning the file simply carries no usable preview.
    pub fn is_missing_thumbnail(&self) -> bool {
        matches!(
            self,
            StatusKind::NoThumbnail
                | StatusKind::UnsupportedThumbnail
                | StatusKind::RequestForNonexistentThumbnail
        )
    }
}

/// A non-zero status returned by a native call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("libraw error: {message}")]
pub struct NativeError {
    pub code: i32,
    pub message: String,
}

impl NativeError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// A failure LibRaw reported without a status code of its own.
    pub fn unspecified(message: impl Into<String>) -> Self {
        Self::new(-1, message)
    }

    /// Builds the error from the Rust-side description table.
    pub fn from_code(code: i32) -> Self {
        Self::new(code, StatusKind::from_code(code).description())
    }

    pub fn kind(&self) -> StatusKind {
        StatusKind::from_code(self.code)
    }
}

/// Translates a status code, describing failures with `describe`.
///
/// The native engine passes `libraw_strerror`; everything else uses
/// [`translate`].
pub fn check_with<F>(code: i32, describe: F) -> Result<(), NativeError>
where
    F: FnOnce(i32) -> String,
{
    match code {
        0 => Ok(()),
        code => Err(NativeError::new(code, describe(code))),
    }
}

pub fn translate(code: i32) -> Result<(), NativeError> {
    check_with(code, |code| StatusKind::from_code(code).description())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_translates_to_ok() {
        assert!(translate(0).is_ok());
    }

    #[test]
    fn test_failure_carries_code_and_message() {
        let err = translate(-2).unwrap_err();
        assert_eq!(err.code, -2);
        assert_eq!(err.kind(), StatusKind::FileUnsupported);
        assert_eq!(
            err.to_string(),
            "libraw error: Unsupported file format or not RAW file"
        );
    }

    #[test]
    fn test_custom_describer_is_used_only_on_failure() {
        let mut called = false;
        assert!(check_with(0, |_| {
            called = true;
            String::new()
        })
        .is_ok());
        assert!(!called);

        let err = check_with(-100009, |code| format!("native says {code}")).unwrap_err();
        assert_eq!(err.message, "native says -100009");
        assert_eq!(err.kind(), StatusKind::IoError);
    }

    #[test]
    fn test_positive_codes_are_os_errors() {
        let kind = StatusKind::from_code(2);
        assert_eq!(kind, StatusKind::Os(2));
        assert!(!kind.description().is_empty());
    }

    #[test]
    fn test_unknown_negative_code() {
        let err = NativeError::from_code(-42);
        assert_eq!(err.kind(), StatusKind::Unknown(-42));
        assert_eq!(err.message, "Unknown error code");
    }

    #[test]
    fn test_unspecified_is_never_success() {
        let err = NativeError::unspecified("libraw returned no image");
        assert_ne!(err.code, 0);
        assert_eq!(err.kind(), StatusKind::Unspecified);
        assert_eq!(err.to_string(), "libraw error: libraw returned no image");
    }

    #[test]
    fn test_missing_thumbnail_classification() {
        assert!(StatusKind::from_code(-5).is_missing_thumbnail());
        assert!(StatusKind::from_code(-6).is_missing_thumbnail());
        assert!(StatusKind::from_code(-9).is_missing_thumbnail());
        assert!(!StatusKind::from_code(-100008).is_missing_thumbnail());
        assert!(!StatusKind::from_code(-2).is_missing_thumbnail());
    }
}

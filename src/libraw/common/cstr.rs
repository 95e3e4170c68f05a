use std::ffi::{CString, c_char};
use std::path::Path;

use super::error::{DecodeError, Result};

/// Copies a fixed-size native character buffer into an owned string.
///
/// Scanning stops at the first NUL or at the end of the buffer, whichever
/// comes first, so an unterminated field never reads past its array.
pub fn fixed_cstr(buf: &[c_char]) -> String {
    let bytes: Vec<u8> = buf
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Converts a filesystem path into the NUL-terminated form LibRaw expects.
pub fn path_to_cstring(path: &Path) -> Result<CString> {
    #[cfg(unix)]
    let bytes = {
        use std::os::unix::ffi::OsStrExt;
        path.as_os_str().as_bytes().to_vec()
    };
    #[cfg(not(unix))]
    let bytes = path
        .to_str()
        .ok_or_else(|| DecodeError::InvalidPath(path.to_path_buf()))?
        .as_bytes()
        .to_vec();

    CString::new(bytes).map_err(|_| DecodeError::InvalidPath(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buf<const N: usize>(s: &str) -> [c_char; N] {
        let mut out = [0 as c_char; N];
        for (dst, src) in out.iter_mut().zip(s.bytes()) {
            *dst = src as c_char;
        }
        out
    }

    #[test]
    fn test_stops_at_nul() {
        let mut raw = buf::<16>("Canon");
        raw[8] = b'X' as c_char;
        assert_eq!(fixed_cstr(&raw), "Canon");
    }

    #[test]
    fn test_unterminated_buffer_is_bounded() {
        let raw = buf::<4>("NIKON");
        assert_eq!(fixed_cstr(&raw), "NIKO");
    }

    #[test]
    fn test_empty_buffer() {
        let raw = [0 as c_char; 8];
        assert_eq!(fixed_cstr(&raw), "");
    }

    #[test]
    fn test_path_with_interior_nul_is_rejected() {
        let path = Path::new("bad\0name.cr2");
        assert!(matches!(
            path_to_cstring(path),
            Err(DecodeError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_path_round_trips() {
        let c = path_to_cstring(Path::new("/tmp/photo.nef")).unwrap();
        assert_eq!(c.to_str().unwrap(), "/tmp/photo.nef");
    }
}

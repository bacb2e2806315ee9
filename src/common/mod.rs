//! Common utilities shared across the harness

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use error::{Error, Result};

/// Decode captured bytes for display, replacing invalid UTF-8
pub fn decode_lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_lossy() {
        assert_eq!(decode_lossy(b"hi\n"), "hi\n");
        assert_eq!(decode_lossy(&[b'a', 0xff, b'b']), "a\u{fffd}b");
    }
}

//! Fixed-width codec for typed store values.
//!
//! Numeric values are 8 bytes, big-endian; `f64` is the big-endian encoding
//! of its IEEE-754 bit pattern. Strings and byte values are stored as raw
//! bytes with no length prefix (the column family is the only delimiter).
//!
//! Decoding always produces an owned value and checks input length; there is
//! no zero-copy reinterpretation anywhere in this layer.

use crate::error::{Error, Result};

/// Encode an `i64` as 8 big-endian bytes.
pub fn encode_i64(value: i64) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

/// Decode 8 big-endian bytes into an `i64`.
pub fn decode_i64(data: &[u8]) -> Result<i64> {
    Ok(i64::from_be_bytes(fixed8(data)?))
}

/// Encode a `u64` as 8 big-endian bytes.
pub fn encode_u64(value: u64) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

/// Decode 8 big-endian bytes into a `u64`.
pub fn decode_u64(data: &[u8]) -> Result<u64> {
    Ok(u64::from_be_bytes(fixed8(data)?))
}

/// Encode an `f64` as the big-endian bytes of its IEEE-754 bit pattern.
pub fn encode_f64(value: f64) -> Vec<u8> {
    value.to_bits().to_be_bytes().to_vec()
}

/// Decode 8 big-endian bytes into an `f64` via its bit pattern.
pub fn decode_f64(data: &[u8]) -> Result<f64> {
    Ok(f64::from_bits(u64::from_be_bytes(fixed8(data)?)))
}

/// Encode a string as its raw UTF-8 bytes (owned copy).
pub fn encode_str(value: &str) -> Vec<u8> {
    value.as_bytes().to_vec()
}

/// Decode raw bytes into an owned `String`, validating UTF-8.
pub fn decode_string(data: &[u8]) -> Result<String> {
    String::from_utf8(data.to_vec())
        .map_err(|e| Error::Codec(format!("invalid utf-8 in string value: {}", e)))
}

fn fixed8(data: &[u8]) -> Result<[u8; 8]> {
    data.try_into().map_err(|_| {
        Error::Codec(format!(
            "expected 8-byte fixed-width value, got {} bytes",
            data.len()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_i64_roundtrip() {
        for v in [0i64, 1, -1, 42, i64::MIN, i64::MAX] {
            assert_eq!(decode_i64(&encode_i64(v)).unwrap(), v);
        }
    }

    #[test]
    fn test_u64_roundtrip() {
        for v in [0u64, 1, 999999, u64::MAX] {
            assert_eq!(decode_u64(&encode_u64(v)).unwrap(), v);
        }
    }

    #[test]
    fn test_f64_roundtrip() {
        for v in [0.0f64, 999.999, -1.5, f64::MIN, f64::MAX] {
            assert_eq!(decode_f64(&encode_f64(v)).unwrap(), v);
        }
        assert!(decode_f64(&encode_f64(f64::NAN)).unwrap().is_nan());
    }

    #[test]
    fn test_i64_big_endian_ordering() {
        // Non-negative integers must sort lexicographically in key order.
        let a = encode_i64(1);
        let b = encode_i64(2);
        let c = encode_i64(256);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_decode_wrong_length() {
        assert!(matches!(decode_i64(&[1, 2, 3]), Err(Error::Codec(_))));
        assert!(matches!(decode_u64(&[]), Err(Error::Codec(_))));
        assert!(matches!(decode_f64(&[0; 9]), Err(Error::Codec(_))));
    }

    #[test]
    fn test_string_roundtrip() {
        assert_eq!(decode_string(&encode_str("test")).unwrap(), "test");
        assert_eq!(decode_string(b"").unwrap(), "");
    }

    #[test]
    fn test_string_invalid_utf8() {
        assert!(matches!(decode_string(&[0xff, 0xfe]), Err(Error::Codec(_))));
    }
}

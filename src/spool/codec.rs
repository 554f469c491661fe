//! Payload obfuscation
//!
//! Serialized payloads are stored as standard base64 (RFC 4648 alphabet,
//! padded). The output never contains the batch separator byte.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::SpoolResult;

/// Encode a serialized payload for storage
pub fn encode(input: &[u8]) -> Vec<u8> {
    STANDARD.encode(input).into_bytes()
}

/// Reverse [`encode`]
pub fn decode(input: &[u8]) -> SpoolResult<Vec<u8>> {
    Ok(STANDARD.decode(input)?)
}

/// Length of `encode(input)` for an input of `len` bytes
pub fn encoded_len(len: usize) -> usize {
    len.div_ceil(3) * 4
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spool::SEPARATOR;
    use proptest::prelude::*;

    #[test]
    fn test_known_vector() {
        assert_eq!(encode(b"{\"message\":\"hi\"}"), b"eyJtZXNzYWdlIjoiaGkifQ==".to_vec());
        assert_eq!(encode(b""), Vec::<u8>::new());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode(b"not base64!").is_err());
    }

    #[test]
    fn test_encoded_len() {
        assert_eq!(encoded_len(0), 0);
        assert_eq!(encoded_len(1), 4);
        assert_eq!(encoded_len(75), 100);
        assert_eq!(encode(&[7u8; 75]).len(), 100);
    }

    proptest! {
        #[test]
        fn prop_round_trip(input in proptest::collection::vec(any::<u8>(), 0..4096)) {
            let encoded = encode(&input);
            prop_assert!(!encoded.contains(&SEPARATOR));
            prop_assert_eq!(encoded.len(), encoded_len(input.len()));
            prop_assert_eq!(decode(&encoded).unwrap(), input);
        }
    }
}

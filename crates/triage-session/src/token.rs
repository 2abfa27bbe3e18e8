//! Session token generation.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;

/// Random bytes per token unless configured otherwise.
pub const DEFAULT_TOKEN_BYTES: usize = 16;

/// Generate an opaque token from `byte_length` random bytes.
///
/// Encoded as URL-safe base64 without padding, so the result is
/// `ceil(byte_length * 4 / 3)` characters drawn from `[A-Za-z0-9_-]`.
pub fn make_token(byte_length: usize) -> String {
    let mut bytes = vec![0u8; byte_length];
    rand::rng().fill(bytes.as_mut_slice());
    URL_SAFE_NO_PAD.encode(&bytes)
}

/// Character length of a token generated from `byte_length` bytes.
pub fn token_length(byte_length: usize) -> usize {
    (byte_length * 4).div_ceil(3)
}

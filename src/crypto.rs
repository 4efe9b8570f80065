//! Payload encryption - SM4 in ECB mode with block-aligned byte padding
//!
//! The SmartGen wire format encrypts every request body and most response
//! payloads with a single shared 128-bit key. ECB with no IV is what the
//! remote service speaks; each identical plaintext block maps to an
//! identical ciphertext block, and that determinism is part of the
//! protocol, not something to paper over here.

use crate::error::{Result, SmartGenError};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use sm4::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};
use sm4::Sm4;

pub const BLOCK_SIZE: usize = 16;

/// Shared SM4 key used by the production endpoint (both directions).
pub const DEFAULT_KEY: [u8; 16] = *b"sF4mT2tU0zU6mL7u";

/// Codec for the encrypted request/response bodies.
///
/// Stateless apart from the expanded key; safe to share across calls.
#[derive(Clone)]
pub struct PayloadCipher {
    sm4: Sm4,
}

impl PayloadCipher {
    pub fn new(key: &[u8; 16]) -> Self {
        Self {
            sm4: Sm4::new(GenericArray::from_slice(key)),
        }
    }

    /// Encrypt a UTF-8 string to a base64 ciphertext string.
    pub fn encrypt(&self, plaintext: &str) -> String {
        let mut buf = pad(plaintext.as_bytes());
        for block in buf.chunks_exact_mut(BLOCK_SIZE) {
            self.sm4.encrypt_block(GenericArray::from_mut_slice(block));
        }
        BASE64.encode(&buf)
    }

    /// Decrypt a base64 ciphertext string back to a UTF-8 string.
    ///
    /// Fails with [`SmartGenError::MalformedPadding`] when the stripped
    /// padding byte is 0 or larger than the buffer, rather than silently
    /// truncating.
    pub fn decrypt(&self, ciphertext: &str) -> Result<String> {
        let mut buf = BASE64
            .decode(ciphertext)
            .map_err(|e| SmartGenError::Crypto(format!("invalid base64 ciphertext: {}", e)))?;

        if buf.is_empty() {
            return Ok(String::new());
        }
        if buf.len() % BLOCK_SIZE != 0 {
            return Err(SmartGenError::Crypto(format!(
                "ciphertext length {} is not a multiple of {}",
                buf.len(),
                BLOCK_SIZE
            )));
        }

        for block in buf.chunks_exact_mut(BLOCK_SIZE) {
            self.sm4.decrypt_block(GenericArray::from_mut_slice(block));
        }
        unpad(&mut buf)?;

        String::from_utf8(buf)
            .map_err(|e| SmartGenError::Crypto(format!("decrypted payload is not UTF-8: {}", e)))
    }
}

impl Default for PayloadCipher {
    fn default() -> Self {
        Self::new(&DEFAULT_KEY)
    }
}

/// Append N bytes of value N up to the next block boundary.
/// Already-aligned input gets a full extra block.
fn pad(data: &[u8]) -> Vec<u8> {
    let padding = BLOCK_SIZE - data.len() % BLOCK_SIZE;
    let mut buf = Vec::with_capacity(data.len() + padding);
    buf.extend_from_slice(data);
    buf.extend(std::iter::repeat(padding as u8).take(padding));
    buf
}

/// Strip padding by reading the final byte as a count.
///
/// Only the count is validated; interior padding bytes are not checked.
/// The remote strips the same way, so stricter verification would reject
/// payloads the real service accepts.
fn unpad(buf: &mut Vec<u8>) -> Result<()> {
    let len = buf.len();
    let byte = match buf.last() {
        Some(b) => *b,
        None => return Ok(()),
    };
    if byte == 0 || byte as usize > len {
        return Err(SmartGenError::MalformedPadding { byte, len });
    }
    buf.truncate(len - byte as usize);
    Ok(())
}

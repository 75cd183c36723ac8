use serde::{Deserialize, Serialize};
use std::fmt;

/// 8-character lowercase hex digest of text content.
///
/// Polynomial rolling hash (base 31) accumulated into a wrapping signed
/// 64-bit value, sign-folded, then truncated to the low 32 bits. Collisions
/// are possible and are treated as identical content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest(String);

impl Digest {
    /// Compute the digest of `text`.
    pub fn from_content(text: &str) -> Self {
        let mut acc: i64 = 0;
        for byte in text.bytes() {
            acc = acc.wrapping_mul(31).wrapping_add(i64::from(byte));
        }
        let folded = acc.unsigned_abs() & 0xffff_ffff;
        Digest(format!("{:08x}", folded))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

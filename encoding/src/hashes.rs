// Bitcoin formats library: consensus codecs, keys, scripts and PSBTs
// by LNP/BP Association (https://lnp-bp.org)
// Written in 2020-2022 by
//     Dr. Maxim Orlovsky <orlovsky@lnp-bp.org>
//
// To the extent possible under law, the author(s) have dedicated all
// copyright and related and neighboring rights to this software to
// the public domain worldwide. This software is distributed without
// any warranty.
//
// You should have received a copy of the Apache-2.0 License
// along with this software.
// If not, see <https://opensource.org/licenses/Apache-2.0>.

//! Hash functions used by bitcoin script and data formats.

use bitcoin::hashes::{hash160, hmac, ripemd160, sha256, sha256d, sha512, Hash, HashEngine};

/// Single SHA-256 hash (`OP_SHA256`).
pub fn sha256(data: impl AsRef<[u8]>) -> [u8; 32] {
    sha256::Hash::hash(data.as_ref()).into_inner()
}

/// Double SHA-256 hash (`OP_HASH256`).
pub fn hash256(data: impl AsRef<[u8]>) -> [u8; 32] {
    sha256d::Hash::hash(data.as_ref()).into_inner()
}

/// RIPEMD-160 hash (`OP_RIPEMD160`).
pub fn ripemd160(data: impl AsRef<[u8]>) -> [u8; 20] {
    ripemd160::Hash::hash(data.as_ref()).into_inner()
}

/// RIPEMD-160 of SHA-256 hash (`OP_HASH160`).
pub fn hash160(data: impl AsRef<[u8]>) -> [u8; 20] {
    hash160::Hash::hash(data.as_ref()).into_inner()
}

/// HMAC-SHA512, used by BIP-32 key derivation.
pub fn hmac_sha512(key: &[u8], data: &[u8]) -> [u8; 64] {
    let mut engine = hmac::HmacEngine::<sha512::Hash>::new(key);
    engine.input(data);
    hmac::Hmac::<sha512::Hash>::from_engine(engine).into_inner()
}

/// Streaming double SHA-256 engine for hashing data produced by an
/// [`Encode`](crate::Encode) implementation without intermediate buffers.
#[derive(Clone, Default)]
pub struct Hash256Writer(sha256::HashEngine);

impl Hash256Writer {
    /// Creates a new engine.
    pub fn new() -> Self { Self::default() }

    /// Finalizes the hashing, returning double SHA-256 of the written data.
    pub fn finish(self) -> [u8; 32] { sha256d::Hash::from_engine(self.0).into_inner() }

    /// Finalizes the hashing, returning single SHA-256 of the written data.
    pub fn finish_single(self) -> [u8; 32] { sha256::Hash::from_engine(self.0).into_inner() }
}

impl std::io::Write for Hash256Writer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.input(buf);
        Ok(buf.len())
    }

    #[inline]
    fn flush(&mut self) -> std::io::Result<()> { Ok(()) }
}

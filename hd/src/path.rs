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


use core::fmt::{self, Display, Formatter};
use core::str::FromStr;
use std::borrow::Borrow;
use std::ops::{Deref, DerefMut};

use crate::HARDENED_INDEX_BOUNDARY;

/// Errors parsing derivation paths
#[derive(Clone, PartialEq, Eq, Hash, Debug, Display, Error)]
#[display(doc_comments)]
pub enum PathError {
    /// derivation path segment `{0}` is not a valid index
    InvalidSegment(String),

    /// hardened index {0} must be below 2^31
    HardenedOutOfRange(u32),
}

/// BIP-32 derivation path: a sequence of child indexes, where indexes at or
/// above [`HARDENED_INDEX_BOUNDARY`] denote hardened derivation.
///
/// Textual form is `m/0/1'/2h/-3`, where hardened indexes are marked with a
/// trailing `'` or `h` or a leading `-`. The leading `m` is optional, and an
/// empty string means an empty path.
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default)]
pub struct DerivationPath(Vec<u32>);

// This is needed to get methods line `len()` and `is_empty()` working.
impl Deref for DerivationPath {
    type Target = Vec<u32>;

    fn deref(&self) -> &Self::Target { &self.0 }
}

impl DerefMut for DerivationPath {
    fn deref_mut(&mut self) -> &mut Self::Target { &mut self.0 }
}

impl From<Vec<u32>> for DerivationPath {
    fn from(path: Vec<u32>) -> Self { Self(path) }
}

impl From<&[u32]> for DerivationPath {
    fn from(path: &[u32]) -> Self { Self(path.to_vec()) }
}

impl From<DerivationPath> for Vec<u32> {
    fn from(path: DerivationPath) -> Self { path.0 }
}

impl AsRef<[u32]> for DerivationPath {
    #[inline]
    fn as_ref(&self) -> &[u32] { &self.0 }
}

impl Borrow<[u32]> for DerivationPath {
    #[inline]
    fn borrow(&self) -> &[u32] { &self.0 }
}

impl Display for DerivationPath {
    /// Alternative formatting (`{:#}`) marks hardened indexes with `h`
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for index in &self.0 {
            if *index >= HARDENED_INDEX_BOUNDARY {
                let marker = if f.alternate() { 'h' } else { '\'' };
                write!(f, "/{}{}", index - HARDENED_INDEX_BOUNDARY, marker)?;
            } else {
                write!(f, "/{}", index)?;
            }
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::default());
        }
        let mut segments = s.split('/').peekable();
        if segments.peek() == Some(&"m") {
            segments.next();
        }
        segments.map(parse_segment).collect::<Result<_, _>>().map(Self)
    }
}

fn parse_segment(segment: &str) -> Result<u32, PathError> {
    let invalid = || PathError::InvalidSegment(segment.to_owned());
    let (digits, hardened) = if let Some(digits) = segment.strip_prefix('-') {
        (digits, true)
    } else if let Some(digits) = segment.strip_suffix(&['h', '\''][..]) {
        (digits, true)
    } else {
        (segment, false)
    };
    if digits.is_empty() || !digits.bytes().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let index = digits.parse::<u32>().map_err(|_| invalid())?;
    if !hardened {
        return Ok(index);
    }
    if index >= HARDENED_INDEX_BOUNDARY {
        return Err(PathError::HardenedOutOfRange(index));
    }
    Ok(index | HARDENED_INDEX_BOUNDARY)
}

impl IntoIterator for DerivationPath {
    type Item = u32;
    type IntoIter = std::vec::IntoIter<u32>;

    fn into_iter(self) -> Self::IntoIter { self.0.into_iter() }
}

impl<'path> IntoIterator for &'path DerivationPath {
    type Item = u32;
    type IntoIter = std::iter::Copied<std::slice::Iter<'path, u32>>;

    fn into_iter(self) -> Self::IntoIter { self.0.iter().copied() }
}

impl FromIterator<u32> for DerivationPath {
    fn from_iter<T: IntoIterator<Item = u32>>(iter: T) -> Self { Self(iter.into_iter().collect()) }
}

impl DerivationPath {
    /// Constructs empty derivation path.
    pub fn new() -> Self { Self::default() }

    /// Returns derivation path extended with one more index
    pub fn child(&self, index: u32) -> Self {
        let mut path = self.clone();
        path.push(index);
        path
    }

    /// Detects whether the path contains hardened indexes
    pub fn has_hardened(&self) -> bool { self.0.iter().any(|index| *index >= HARDENED_INDEX_BOUNDARY) }
}

/// Parses derivation path string into a list of indexes with hardened flags
pub fn parse_path(s: &str) -> Result<Vec<u32>, PathError> { DerivationPath::from_str(s).map(Vec::from) }

/// Renders list of indexes as derivation path string
pub fn unparse_path(path: &[u32]) -> String { DerivationPath::from(path).to_string() }

#[cfg(feature = "serde")]
impl serde::Serialize for DerivationPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for DerivationPath {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        DerivationPath::from_str(&s).map_err(serde::de::Error::custom)
    }
}

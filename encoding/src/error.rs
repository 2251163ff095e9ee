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

use std::io;

/// Errors happening during decoding of consensus-encoded data
#[derive(Clone, PartialEq, Eq, Hash, Debug, Display, Error)]
#[display(doc_comments)]
pub enum Error {
    /// I/O error while reading the data: {0}
    Io(io::ErrorKind),

    /// data ended before the structure was completely read
    UnexpectedEnd,

    /// {0} bytes of data were left unconsumed after the structure
    DataNotConsumed(usize),

    /// compact integer {0} is not encoded in its shortest form
    NonCanonicalCompactUint(u64),

    /// length prefix {0} exceeds the maximum allowed allocation size
    OversizedAllocation(u64),

    /// invalid value: {0}
    InvalidValue(String),

    /// string data is not a valid UTF-8
    Utf8,
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Error::UnexpectedEnd,
            kind => Error::Io(kind),
        }
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(_: std::string::FromUtf8Error) -> Self { Error::Utf8 }
}

impl Error {
    /// Constructs [`Error::InvalidValue`] from any displayable message.
    pub fn invalid(msg: impl ToString) -> Self { Error::InvalidValue(msg.to_string()) }
}

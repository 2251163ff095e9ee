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


//! Script opcodes and data push helpers.

use std::fmt::{self, Display, Formatter};

use bitcoin::hashes::hex::ToHex;

/// Errors in script push operations and small number encoding
#[derive(Clone, PartialEq, Eq, Hash, Debug, Display, Error)]
#[display(doc_comments)]
pub enum PushError {
    /// data of {0} bytes are too large to be pushed into a script
    TooLarge(usize),

    /// number {0} can't be represented by a single opcode
    InvalidNumber(i64),

    /// script push contains no data
    Empty,

    /// opcode {0} is not a data push or its length is truncated
    InvalidHeader(u8),

    /// script push declares {expected} bytes of data while {actual} bytes
    /// follow the header
    LengthMismatch {
        /// Length declared by the push opcode
        expected: usize,
        /// Number of bytes actually present
        actual: usize,
    },

    /// script ends inside a data push starting at byte {0}
    Truncated(usize),
}

macro_rules! opcodes {
    ($($(#[$attr:meta])* $name:ident = $value:literal),+ $(,)?) => {
        impl Opcode {
            $(
                $(#[$attr])*
                pub const $name: Opcode = Opcode($value);
            )+

            /// Returns canonical name of the opcode, if the opcode is known
            pub fn name(self) -> Option<&'static str> {
                match self.0 {
                    $( $value => Some(stringify!($name)), )+
                    _ => None,
                }
            }
        }
    };
}

/// Script opcode.
///
/// Values `0x01..=0x4B` push the given number of following bytes onto the
/// stack and have no named constants.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Opcode(pub u8);

opcodes! {
    /// Push an empty array
    OP_0 = 0x00,
    /// Read the next byte as N; push the next N bytes
    OP_PUSHDATA1 = 0x4C,
    /// Read the next 2 bytes as N; push the next N bytes
    OP_PUSHDATA2 = 0x4D,
    /// Read the next 4 bytes as N; push the next N bytes
    OP_PUSHDATA4 = 0x4E,
    /// Push -1
    OP_1NEGATE = 0x4F,
    /// Fail the script unless executed
    OP_RESERVED = 0x50,
    /// Push number 1
    OP_1 = 0x51,
    /// Push number 2
    OP_2 = 0x52,
    /// Push number 3
    OP_3 = 0x53,
    /// Push number 4
    OP_4 = 0x54,
    /// Push number 5
    OP_5 = 0x55,
    /// Push number 6
    OP_6 = 0x56,
    /// Push number 7
    OP_7 = 0x57,
    /// Push number 8
    OP_8 = 0x58,
    /// Push number 9
    OP_9 = 0x59,
    /// Push number 10
    OP_10 = 0x5A,
    /// Push number 11
    OP_11 = 0x5B,
    /// Push number 12
    OP_12 = 0x5C,
    /// Push number 13
    OP_13 = 0x5D,
    /// Push number 14
    OP_14 = 0x5E,
    /// Push number 15
    OP_15 = 0x5F,
    /// Push number 16
    OP_16 = 0x60,

    /// Does nothing
    OP_NOP = 0x61,
    /// Fail the script unless executed
    OP_VER = 0x62,
    /// Pop and execute the next statements if a nonzero element was popped
    OP_IF = 0x63,
    /// Pop and execute the next statements if a zero element was popped
    OP_NOTIF = 0x64,
    /// Fail the script unconditionally
    OP_VERIF = 0x65,
    /// Fail the script unconditionally
    OP_VERNOTIF = 0x66,
    /// Execute statements if those after the previous OP_IF were not
    OP_ELSE = 0x67,
    /// Pop an execution flag
    OP_ENDIF = 0x68,
    /// Pop and fail the script if the value is zero
    OP_VERIFY = 0x69,
    /// Fail the script immediately
    OP_RETURN = 0x6A,

    /// Move the top item to the alt stack
    OP_TOALTSTACK = 0x6B,
    /// Move the top item of the alt stack to the main stack
    OP_FROMALTSTACK = 0x6C,
    /// Drop the top two items
    OP_2DROP = 0x6D,
    /// Duplicate the top two items
    OP_2DUP = 0x6E,
    /// Duplicate the top three items
    OP_3DUP = 0x6F,
    /// Copy the 3rd and 4th items to the top
    OP_2OVER = 0x70,
    /// Move the 5th and 6th items to the top
    OP_2ROT = 0x71,
    /// Swap the top two pairs of items
    OP_2SWAP = 0x72,
    /// Duplicate the top item if it is nonzero
    OP_IFDUP = 0x73,
    /// Push the stack size
    OP_DEPTH = 0x74,
    /// Drop the top item
    OP_DROP = 0x75,
    /// Duplicate the top item
    OP_DUP = 0x76,
    /// Drop the second-to-top item
    OP_NIP = 0x77,
    /// Copy the second-to-top item
    OP_OVER = 0x78,
    /// Copy the item N back in the stack
    OP_PICK = 0x79,
    /// Move the item N back in the stack to the top
    OP_ROLL = 0x7A,
    /// Rotate the top three items
    OP_ROT = 0x7B,
    /// Swap the top two items
    OP_SWAP = 0x7C,
    /// Copy the top item behind the second-to-top item
    OP_TUCK = 0x7D,

    /// Disabled: concatenation
    OP_CAT = 0x7E,
    /// Disabled: substring
    OP_SUBSTR = 0x7F,
    /// Disabled: left substring
    OP_LEFT = 0x80,
    /// Disabled: right substring
    OP_RIGHT = 0x81,
    /// Push the length of the top item
    OP_SIZE = 0x82,

    /// Disabled: bitwise inversion
    OP_INVERT = 0x83,
    /// Disabled: bitwise and
    OP_AND = 0x84,
    /// Disabled: bitwise or
    OP_OR = 0x85,
    /// Disabled: bitwise xor
    OP_XOR = 0x86,
    /// Push 1 if the top two items are equal, 0 otherwise
    OP_EQUAL = 0x87,
    /// OP_EQUAL followed by OP_VERIFY
    OP_EQUALVERIFY = 0x88,
    /// Fail the script unless executed
    OP_RESERVED1 = 0x89,
    /// Fail the script unless executed
    OP_RESERVED2 = 0x8A,

    /// Increment the top number
    OP_1ADD = 0x8B,
    /// Decrement the top number
    OP_1SUB = 0x8C,
    /// Disabled: multiply by two
    OP_2MUL = 0x8D,
    /// Disabled: divide by two
    OP_2DIV = 0x8E,
    /// Negate the top number
    OP_NEGATE = 0x8F,
    /// Absolute value of the top number
    OP_ABS = 0x90,
    /// Logical not of the top number
    OP_NOT = 0x91,
    /// Push 0 if the top number is 0, 1 otherwise
    OP_0NOTEQUAL = 0x92,
    /// Add the top two numbers
    OP_ADD = 0x93,
    /// Subtract the top number from the second one
    OP_SUB = 0x94,
    /// Disabled: multiplication
    OP_MUL = 0x95,
    /// Disabled: division
    OP_DIV = 0x96,
    /// Disabled: modulo
    OP_MOD = 0x97,
    /// Disabled: left shift
    OP_LSHIFT = 0x98,
    /// Disabled: right shift
    OP_RSHIFT = 0x99,
    /// Boolean and of the top two numbers
    OP_BOOLAND = 0x9A,
    /// Boolean or of the top two numbers
    OP_BOOLOR = 0x9B,
    /// Push 1 if the top two numbers are equal
    OP_NUMEQUAL = 0x9C,
    /// OP_NUMEQUAL followed by OP_VERIFY
    OP_NUMEQUALVERIFY = 0x9D,
    /// Push 1 if the top two numbers differ
    OP_NUMNOTEQUAL = 0x9E,
    /// Push 1 if the second number is less than the top one
    OP_LESSTHAN = 0x9F,
    /// Push 1 if the second number is greater than the top one
    OP_GREATERTHAN = 0xA0,
    /// Push 1 if the second number is less than or equal to the top one
    OP_LESSTHANOREQUAL = 0xA1,
    /// Push 1 if the second number is greater than or equal to the top one
    OP_GREATERTHANOREQUAL = 0xA2,
    /// Smaller of the top two numbers
    OP_MIN = 0xA3,
    /// Larger of the top two numbers
    OP_MAX = 0xA4,
    /// Push 1 if the third number is within the range given by the top two
    OP_WITHIN = 0xA5,

    /// RIPEMD-160 of the top item
    OP_RIPEMD160 = 0xA6,
    /// SHA-1 of the top item
    OP_SHA1 = 0xA7,
    /// SHA-256 of the top item
    OP_SHA256 = 0xA8,
    /// RIPEMD-160 of SHA-256 of the top item
    OP_HASH160 = 0xA9,
    /// Double SHA-256 of the top item
    OP_HASH256 = 0xAA,
    /// Mark the start of the signed script part
    OP_CODESEPARATOR = 0xAB,
    /// Check the signature against the public key
    OP_CHECKSIG = 0xAC,
    /// OP_CHECKSIG followed by OP_VERIFY
    OP_CHECKSIGVERIFY = 0xAD,
    /// Check M-of-N signatures
    OP_CHECKMULTISIG = 0xAE,
    /// OP_CHECKMULTISIG followed by OP_VERIFY
    OP_CHECKMULTISIGVERIFY = 0xAF,

    /// Does nothing
    OP_NOP1 = 0xB0,
    /// Absolute lock time check (BIP-65)
    OP_NOP2 = 0xB1,
    /// Relative lock time check (BIP-112)
    OP_NOP3 = 0xB2,
    /// Does nothing
    OP_NOP4 = 0xB3,
    /// Does nothing
    OP_NOP5 = 0xB4,
    /// Does nothing
    OP_NOP6 = 0xB5,
    /// Does nothing
    OP_NOP7 = 0xB6,
    /// Does nothing
    OP_NOP8 = 0xB7,
    /// Does nothing
    OP_NOP9 = 0xB8,
    /// Does nothing
    OP_NOP10 = 0xB9,

    /// Template matching placeholder for a small integer
    OP_SMALLINTEGER = 0xFA,
    /// Template matching placeholder for a list of public keys
    OP_PUBKEYS = 0xFB,
    /// Template matching placeholder for a public key hash
    OP_PUBKEYHASH = 0xFD,
    /// Template matching placeholder for a public key
    OP_PUBKEY = 0xFE,

    /// Invalid opcode
    OP_INVALIDOPCODE = 0xFF,
}

impl Opcode {
    /// Alias for [`Opcode::OP_0`]
    pub const OP_FALSE: Opcode = Opcode::OP_0;
    /// Alias for [`Opcode::OP_1`]
    pub const OP_TRUE: Opcode = Opcode::OP_1;
    /// Alias for [`Opcode::OP_NOP2`]
    pub const OP_CHECKLOCKTIMEVERIFY: Opcode = Opcode::OP_NOP2;
    /// Alias for [`Opcode::OP_NOP3`]
    pub const OP_CHECKSEQUENCEVERIFY: Opcode = Opcode::OP_NOP3;

    /// Returns the byte value of the opcode
    #[inline]
    pub fn to_u8(self) -> u8 { self.0 }

    /// Returns the number of bytes pushed by the opcode, if it is one of the
    /// direct `OP_PUSHBYTES` opcodes
    pub fn pushed_bytes(self) -> Option<usize> {
        match self.0 {
            len @ 0x01..=0x4B => Some(len as usize),
            _ => None,
        }
    }

    /// Returns the number pushed by `OP_0`, `OP_1NEGATE` and `OP_1`-`OP_16`
    pub fn small_number(self) -> Option<i64> {
        match self {
            Opcode::OP_0 => Some(0),
            Opcode::OP_1NEGATE => Some(-1),
            Opcode(value @ 0x51..=0x60) => Some(value as i64 - 0x50),
            _ => None,
        }
    }
}

impl From<u8> for Opcode {
    fn from(value: u8) -> Self { Opcode(value) }
}

impl From<Opcode> for u8 {
    fn from(opcode: Opcode) -> Self { opcode.0 }
}

impl Display for Opcode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match (self.name(), self.pushed_bytes()) {
            (Some(name), _) => f.write_str(name),
            (None, Some(len)) => write!(f, "OP_PUSHBYTES_{}", len),
            (None, None) => write!(f, "OP_UNKNOWN_{:#04x}", self.0),
        }
    }
}

/// Generates a push instruction header for data of the given length, using
/// the smallest suitable push opcode.
pub fn op_push(len: usize) -> Result<Vec<u8>, PushError> {
    Ok(match len {
        0..=0x4B => vec![len as u8],
        0x4C..=0xFF => vec![Opcode::OP_PUSHDATA1.0, len as u8],
        0x100..=0xFFFF => {
            let mut header = vec![Opcode::OP_PUSHDATA2.0];
            header.extend((len as u16).to_le_bytes());
            header
        }
        _ => {
            let len = u32::try_from(len).map_err(|_| PushError::TooLarge(len))?;
            let mut header = vec![Opcode::OP_PUSHDATA4.0];
            header.extend(len.to_le_bytes());
            header
        }
    })
}

/// Returns the opcode pushing the given small number onto the stack.
pub fn op_number(n: i64) -> Result<Opcode, PushError> {
    match n {
        0 => Ok(Opcode::OP_0),
        -1 => Ok(Opcode::OP_1NEGATE),
        1..=16 => Ok(Opcode(Opcode::OP_1.0 + n as u8 - 1)),
        _ => Err(PushError::InvalidNumber(n)),
    }
}

/// Prefixes the data with the push instruction of the appropriate size.
pub fn build_op_push(data: &[u8]) -> Result<Vec<u8>, PushError> {
    let mut script = op_push(data.len())?;
    script.extend_from_slice(data);
    Ok(script)
}

/// Parses push header at the start of `script`, returning the length of the
/// header and the declared length of pushed data.
fn parse_push_header(script: &[u8]) -> Result<(usize, usize), PushError> {
    let header = *script.first().ok_or(PushError::Empty)?;
    let (offset, len) = match header {
        0x00..=0x4B => (1, header as usize),
        0x4C if script.len() >= 2 => (2, script[1] as usize),
        0x4D if script.len() >= 3 => (3, u16::from_le_bytes([script[1], script[2]]) as usize),
        0x4E if script.len() >= 5 => {
            let len = u32::from_le_bytes([script[1], script[2], script[3], script[4]]);
            (5, len as usize)
        }
        _ => return Err(PushError::InvalidHeader(header)),
    };
    Ok((offset, len))
}

/// Extracts the data from a script consisting of exactly one data push.
pub fn extract_op_push(script: &[u8]) -> Result<&[u8], PushError> {
    let (offset, len) = parse_push_header(script)?;
    let actual = script.len() - offset;
    if actual != len {
        return Err(PushError::LengthMismatch {
            expected: len,
            actual,
        });
    }
    Ok(&script[offset..])
}

/// Renders script in assembly form, with pushed data shown as hex strings.
pub fn disassemble(script: &[u8]) -> Result<String, PushError> {
    let mut items = Vec::new();
    let mut pos = 0usize;
    while pos < script.len() {
        let opcode = Opcode(script[pos]);
        if opcode == Opcode::OP_0 || opcode.0 > Opcode::OP_PUSHDATA4.0 {
            items.push(opcode.to_string());
            pos += 1;
            continue;
        }
        let (offset, len) =
            parse_push_header(&script[pos..]).map_err(|_| PushError::Truncated(pos))?;
        let end = pos
            .checked_add(offset + len)
            .filter(|end| *end <= script.len())
            .ok_or(PushError::Truncated(pos))?;
        items.push(script[pos + offset..end].to_hex());
        pos = end;
    }
    Ok(items.join(" "))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn push_headers() {
        assert_eq!(op_push(0).unwrap(), vec![0x00]);
        assert_eq!(op_push(0x4B).unwrap(), vec![0x4B]);
        assert_eq!(op_push(0x4C).unwrap(), vec![0x4C, 0x4C]);
        assert_eq!(op_push(0xFF).unwrap(), vec![0x4C, 0xFF]);
        assert_eq!(op_push(0x100).unwrap(), vec![0x4D, 0x00, 0x01]);
        assert_eq!(op_push(0x1_0000).unwrap(), vec![0x4E, 0x00, 0x00, 0x01, 0x00]);
        if usize::MAX as u64 > u32::MAX as u64 {
            assert_eq!(op_push(usize::MAX), Err(PushError::TooLarge(usize::MAX)));
        }
    }

    #[test]
    fn small_numbers() {
        assert_eq!(op_number(0), Ok(Opcode::OP_FALSE));
        assert_eq!(op_number(1), Ok(Opcode::OP_TRUE));
        assert_eq!(op_number(16), Ok(Opcode::OP_16));
        assert_eq!(op_number(-1), Ok(Opcode::OP_1NEGATE));
        assert_eq!(op_number(17), Err(PushError::InvalidNumber(17)));
        assert_eq!(op_number(-2), Err(PushError::InvalidNumber(-2)));
        for n in -1..=16 {
            assert_eq!(op_number(n).unwrap().small_number(), Some(n));
        }
        assert_eq!(Opcode::OP_NOP.small_number(), None);
    }

    #[test]
    fn push_roundtrip() {
        for len in [0usize, 1, 75, 76, 255, 256, 70_000] {
            let data = vec![0xA5u8; len];
            let script = build_op_push(&data).unwrap();
            assert_eq!(extract_op_push(&script).unwrap(), &data[..]);
        }
    }

    #[test]
    fn push_extraction_failures() {
        assert_eq!(extract_op_push(&[]), Err(PushError::Empty));
        assert_eq!(
            extract_op_push(&[0x02, 0xAA]),
            Err(PushError::LengthMismatch {
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(
            extract_op_push(&[0x01, 0xAA, 0xBB]),
            Err(PushError::LengthMismatch {
                expected: 1,
                actual: 2
            })
        );
        assert_eq!(extract_op_push(&[0x4D, 0x01]), Err(PushError::InvalidHeader(0x4D)));
        assert_eq!(extract_op_push(&[0x76]), Err(PushError::InvalidHeader(0x76)));
    }

    #[test]
    fn names() {
        assert_eq!(Opcode::OP_CHECKLOCKTIMEVERIFY.to_string(), "OP_NOP2");
        assert_eq!(Opcode::OP_TRUE.to_string(), "OP_1");
        assert_eq!(Opcode(0x14).to_string(), "OP_PUSHBYTES_20");
        assert_eq!(Opcode(0xBA).to_string(), "OP_UNKNOWN_0xba");
    }

    #[test]
    fn disassembly() {
        let script = [
            0x76, 0xA9, 0x14, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19,
            20, 0x88, 0xAC,
        ];
        assert_eq!(
            disassemble(&script).unwrap(),
            "OP_DUP OP_HASH160 0102030405060708090a0b0c0d0e0f1011121314 OP_EQUALVERIFY OP_CHECKSIG"
        );
        assert_eq!(disassemble(&[0x00, 0x51]).unwrap(), "OP_0 OP_1");
        assert_eq!(disassemble(&[0x6A, 0x05, 0x01]), Err(PushError::Truncated(1)));
    }
}

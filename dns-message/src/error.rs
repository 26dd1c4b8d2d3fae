use nom::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MessageError {
    /// The message framing could not be read. `offset` is where in the
    /// message the failing parser stopped.
    #[error("malformed message at offset {offset} ({kind:?})")]
    ParsingError { offset: usize, kind: ErrorKind },

    /// A fixed width read ran past the end of the data it was bounded to.
    #[error("truncated: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("name pointer {0} is outside the message")]
    BadPointer(u16),

    #[error("{0}")]
    CircularReference(String),

    /// RFC1035 - a name fits in 255 octets, so a longer pointer chain
    /// cannot be a real name.
    #[error("name follows more than {0} compression pointers")]
    PointerChain(usize),

    /// RFC1035 - names are limited to 255 octets on the wire.
    #[error("name of {0} octets exceeds 255")]
    NameTooLong(usize),

    #[error("edns0 option {code} declares {length} bytes, {remaining} remaining")]
    OptionOverrun {
        code: u16,
        length: u16,
        remaining: usize,
    },

    #[error("edns0 client subnet option of {0} bytes is too short")]
    ShortClientSubnet(usize),
}

impl MessageError {
    /// Converts a nom error raised while parsing a slice that ends at `end`
    /// in the message.
    pub(crate) fn from_nom(end: usize, error: nom::Err<nom::error::Error<&[u8]>>) -> Self {
        match error {
            nom::Err::Error(e) | nom::Err::Failure(e) => MessageError::ParsingError {
                offset: end.saturating_sub(e.input.len()),
                kind: e.code,
            },
            nom::Err::Incomplete(_) => MessageError::ParsingError {
                offset: end,
                kind: ErrorKind::Eof,
            },
        }
    }
}

use crate::error::MessageError;
use crate::Result;
use nom::bytes::complete::take as take_bytes;
use nom::number::complete::{be_u16, be_u32, be_u8};
use nom::IResult;
use tracing::trace;

/// A bounded, big-endian reader over a slice of rdata.
///
/// Every read checks the remaining length first and leaves the position
/// untouched when it fails.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    fn truncated(&self, needed: usize) -> MessageError {
        MessageError::Truncated {
            needed,
            remaining: self.remaining(),
        }
    }

    /// Fails unless at least `n` bytes remain.
    pub fn ensure(&self, n: usize) -> Result<()> {
        if self.remaining() < n {
            return Err(self.truncated(n));
        }
        Ok(())
    }

    fn read<O>(
        &mut self,
        width: usize,
        parser: fn(&'a [u8]) -> IResult<&'a [u8], O>,
    ) -> Result<O> {
        let (_, value) = parser(self.rest()).map_err(|_| self.truncated(width))?;
        self.pos += width;
        Ok(value)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.read(1, be_u8)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        trace!("reading u16 at {}", self.pos);
        self.read(2, be_u16)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        trace!("reading u32 at {}", self.pos);
        self.read(4, be_u32)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let (_, bytes) = take_bytes::<_, _, nom::error::Error<_>>(n)(self.rest())
            .map_err(|_| self.truncated(n))?;
        self.pos += n;
        Ok(bytes)
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read_bytes(n).map(|_| ())
    }
}

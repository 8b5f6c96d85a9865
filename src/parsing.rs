// This Source Code Form is subject to the terms of the Mozilla Public License,
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at https://mozilla.org/MPL/2.0/.

use thiserror_no_std::Error;

use crate::FdtError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct BigEndianU32(u32);

impl BigEndianU32 {
    pub const fn from_ne(n: u32) -> Self {
        Self(n.to_be())
    }

    pub const fn from_be(n: u32) -> Self {
        Self(n)
    }

    pub const fn to_ne(self) -> u32 {
        u32::from_be(self.0)
    }

    /// Reads the first four bytes of `bytes`, if there are that many
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [a, b, c, d, ..] => Some(Self::from_be(u32::from_ne_bytes([*a, *b, *c, *d]))),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct BigEndianToken(pub(crate) BigEndianU32);

impl BigEndianToken {
    pub const BEGIN_NODE: Self = Self(BigEndianU32::from_ne(1));
    pub const END_NODE: Self = Self(BigEndianU32::from_ne(2));
    pub const PROP: Self = Self(BigEndianU32::from_ne(3));
    pub const NOP: Self = Self(BigEndianU32::from_ne(4));
    pub const END: Self = Self(BigEndianU32::from_ne(9));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("u32 value too large for usize (this should only occur on 16-bit platforms)")]
    NumericConversionError,
    #[error("cstr was either non-terminated or invalid ASCII")]
    InvalidCStrValue,
    #[error("invalid property value")]
    InvalidPropertyValue,
    #[error("encountered invalid FDT token value while parsing")]
    InvalidTokenValue,
    #[error("encountered an unexpected FDT token value while parsing")]
    UnexpectedToken,
    #[error("encountered end of data while parsing but expected more")]
    UnexpectedEndOfData,
    #[error("node nesting exceeds the supported depth")]
    NestingTooDeep,
}

/// Cursor over the structure block that remembers its byte offset, which is
/// what node handles are made of.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FdtData<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> FdtData<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub(crate) fn at(data: &'a [u8], offset: usize) -> Result<Self, FdtError> {
        match offset <= data.len() {
            true => Ok(Self { data, offset }),
            false => Err(ParseError::UnexpectedEndOfData.into()),
        }
    }

    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    pub(crate) fn remaining(&self) -> &'a [u8] {
        self.data.get(self.offset..).unwrap_or_default()
    }

    pub(crate) fn advance_u32(&mut self) -> Result<BigEndianU32, FdtError> {
        let n = BigEndianU32::from_bytes(self.remaining()).ok_or(ParseError::UnexpectedEndOfData)?;
        self.offset += 4;

        Ok(n)
    }

    pub(crate) fn peek_u32(&self) -> Result<BigEndianU32, FdtError> {
        self.clone().advance_u32()
    }

    /// Next raw token, `FDT_NOP` included
    pub(crate) fn advance_token(&mut self) -> Result<BigEndianToken, FdtError> {
        match BigEndianToken(self.advance_u32()?) {
            token @ (BigEndianToken::BEGIN_NODE
            | BigEndianToken::END_NODE
            | BigEndianToken::PROP
            | BigEndianToken::NOP
            | BigEndianToken::END) => Ok(token),
            _ => Err(ParseError::InvalidTokenValue.into()),
        }
    }

    pub(crate) fn skip_nops(&mut self) -> Result<(), FdtError> {
        while BigEndianToken(self.peek_u32()?) == BigEndianToken::NOP {
            self.offset += 4;
        }

        Ok(())
    }

    pub(crate) fn advance_cstr(&mut self) -> Result<&'a str, FdtError> {
        let cstr = core::ffi::CStr::from_bytes_until_nul(self.remaining())
            .map_err(|_| ParseError::InvalidCStrValue)?;

        self.advance_aligned(cstr.to_bytes_with_nul().len());

        cstr.to_str().map_err(|_| ParseError::InvalidCStrValue.into())
    }

    pub(crate) fn advance_aligned(&mut self, n: usize) {
        // Round up to the next multiple of 4, if necessary
        self.offset = self.offset.saturating_add((n + 3) & !3).min(self.data.len());
    }

    /// Parses the body of a property whose `FDT_PROP` token was already
    /// consumed. Properties are in the format: <data len> <name offset> <data...>
    pub(crate) fn parse_raw_property(&mut self) -> Result<(usize, &'a [u8]), FdtError> {
        let len = usize::try_from(self.advance_u32()?.to_ne()).map_err(|_| ParseError::NumericConversionError)?;
        let name_offset =
            usize::try_from(self.advance_u32()?.to_ne()).map_err(|_| ParseError::NumericConversionError)?;
        let data = self.remaining().get(..len).ok_or(ParseError::UnexpectedEndOfData)?;

        self.advance_aligned(data.len());

        Ok((name_offset, data))
    }
}

#[derive(Debug, Clone, Copy)]
#[repr(transparent)]
pub struct StringsBlock<'a>(pub(crate) &'a [u8]);

impl<'a> StringsBlock<'a> {
    pub fn offset_at(self, offset: usize) -> Result<&'a str, FdtError> {
        core::ffi::CStr::from_bytes_until_nul(self.0.get(offset..).ok_or(ParseError::UnexpectedEndOfData)?)
            .map_err(|_| ParseError::InvalidCStrValue)?
            .to_str()
            .map_err(|_| ParseError::InvalidCStrValue.into())
    }
}

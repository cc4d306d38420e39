use std::os::raw::c_int;

use thiserror::Error;

use crate::ffi;

/// Errors returned by encoder, decoder and packet operations.
///
/// Each variant except [`Error::CodecFault`] corresponds to one libopus
/// status code. Codes libopus may add later surface as `CodecFault`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    #[error("opus: bad argument")]
    BadArgument,

    #[error("opus: buffer too small")]
    BufferTooSmall,

    #[error("opus: internal error")]
    InternalFault,

    #[error("opus: invalid or corrupt packet")]
    InvalidPacket,

    #[error("opus: request not implemented")]
    Unimplemented,

    #[error("opus: encoder or decoder in invalid state")]
    InvalidState,

    #[error("opus: memory allocation failed")]
    AllocationFailure,

    #[error("opus: codec error {0}")]
    CodecFault(i32),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Translates a negative libopus status code.
    ///
    /// Non-negative codes are not errors; passing one yields `CodecFault`
    /// so a success code can never be mistaken for a specific failure.
    pub fn from_code(code: c_int) -> Self {
        match code {
            ffi::OPUS_BAD_ARG => Self::BadArgument,
            ffi::OPUS_BUFFER_TOO_SMALL => Self::BufferTooSmall,
            ffi::OPUS_INTERNAL_ERROR => Self::InternalFault,
            ffi::OPUS_INVALID_PACKET => Self::InvalidPacket,
            ffi::OPUS_UNIMPLEMENTED => Self::Unimplemented,
            ffi::OPUS_INVALID_STATE => Self::InvalidState,
            ffi::OPUS_ALLOC_FAIL => Self::AllocationFailure,
            other => Self::CodecFault(other),
        }
    }

    /// Returns the libopus status code this error represents.
    pub fn code(&self) -> c_int {
        match self {
            Self::BadArgument => ffi::OPUS_BAD_ARG,
            Self::BufferTooSmall => ffi::OPUS_BUFFER_TOO_SMALL,
            Self::InternalFault => ffi::OPUS_INTERNAL_ERROR,
            Self::InvalidPacket => ffi::OPUS_INVALID_PACKET,
            Self::Unimplemented => ffi::OPUS_UNIMPLEMENTED,
            Self::InvalidState => ffi::OPUS_INVALID_STATE,
            Self::AllocationFailure => ffi::OPUS_ALLOC_FAIL,
            Self::CodecFault(code) => *code,
        }
    }
}

/// Passes a non-negative byte or sample count through, translating
/// negative status codes.
pub(crate) fn check(code: c_int) -> Result<usize> {
    if code < 0 {
        return Err(Error::from_code(code));
    }
    Ok(code as usize)
}

/// Allocates a zeroed buffer of exactly `len` elements, reporting failure
/// instead of aborting.
pub(crate) fn alloc_zeroed<T: Copy + Default>(len: usize) -> Result<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| Error::AllocationFailure)?;
    buf.resize(len, T::default());
    Ok(buf)
}

/// Gets the libopus message for a status code.
pub fn error_string(code: c_int) -> String {
    ffi::error_string(code)
}

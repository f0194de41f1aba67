// Scopeline
// Copyright (c) 2025 The Project Scopeline Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `errors` module defines the common error type.

use std::error::Error as StdError;
use std::fmt;
use std::result;

/// `Error` provides an enumeration of all possible errors reported by Scopeline.
#[derive(Debug)]
pub enum Error {
    /// A caller-supplied argument was invalid: a bad backend index, a channel count the layout
    /// conversion cannot satisfy, or an otherwise malformed request.
    InvalidArgument(&'static str),
    /// A sample or channel index was beyond the extents of the buffer.
    OutOfRange(&'static str),
    /// The value format of the buffer is not implemented by the requested operation.
    Unsupported(&'static str),
    /// The backing allocator could not provide the requested auxiliary storage.
    AllocationFailed(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::InvalidArgument(msg) => {
                write!(f, "invalid argument: {}", msg)
            }
            Error::OutOfRange(msg) => {
                write!(f, "out of range: {}", msg)
            }
            Error::Unsupported(feature) => {
                write!(f, "unsupported feature: {}", feature)
            }
            Error::AllocationFailed(msg) => {
                write!(f, "allocation failed: {}", msg)
            }
        }
    }
}

impl StdError for Error {}

pub type Result<T> = result::Result<T, Error>;

/// Convenience function to create an invalid argument error.
pub fn invalid_argument_error<T>(msg: &'static str) -> Result<T> {
    Err(Error::InvalidArgument(msg))
}

/// Convenience function to create an out-of-range error.
pub fn out_of_range_error<T>(msg: &'static str) -> Result<T> {
    Err(Error::OutOfRange(msg))
}

/// Convenience function to create an unsupported feature error.
pub fn unsupported_error<T>(feature: &'static str) -> Result<T> {
    Err(Error::Unsupported(feature))
}

/// Convenience function to create an allocation failure error.
pub fn alloc_error<T>(msg: &'static str) -> Result<T> {
    Err(Error::AllocationFailed(msg))
}

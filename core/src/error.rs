/*
 * error.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Rivolo, an incremental HTTP client.
 *
 * Rivolo is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Rivolo is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Rivolo.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Transfer errors and the not-ready marker.
//!
//! A `TransferError` is the terminal value of a failed exchange; it is
//! returned from `reduce`, never thrown mid-sequence. `NotReady` marks data
//! the transport cannot expose yet and stays internal to the producer.

use std::fmt;

/// Transport-level failure, surfaced only as the terminal value of an
/// exchange's sequence. Consumers inspect the `reduce` result rather than
/// relying on propagation from emission callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// Generic transport failure (connect refused, reset, protocol error).
    Message(String),
    /// The configured transfer timeout elapsed.
    Timeout,
}

impl TransferError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self::Message(msg.into())
    }
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::Message(m) => write!(f, "{}", m),
            TransferError::Timeout => write!(f, "transfer timed out"),
        }
    }
}

impl std::error::Error for TransferError {}

/// Header block or body text not yet retrievable from the transport.
///
/// Transports collapse any internal fault from a mid-flight read into this
/// marker; the producer treats it as "nothing to emit this notification" and
/// retries on the next one. It never reaches consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotReady;

impl fmt::Display for NotReady {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not yet available")
    }
}

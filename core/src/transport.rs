/*
 * transport.rs
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

//! The transport capability one exchange is driven over.
//!
//! The producer opens the transport, sends, then awaits `notified()` and
//! handles one state change at a time; once it detaches it never awaits
//! again, so a transport sees at most one in-flight handler. Reads that
//! cannot be satisfied yet return `NotReady` rather than failing the
//! exchange.

use std::future::Future;
use std::io;
use std::time::Duration;

use crate::error::{NotReady, TransferError};

/// Coarse progress of one exchange, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    Unsent,
    Opened,
    HeadersReceived,
    Loading,
    /// Transfer finished: completed, failed, or aborted. Final.
    Done,
}

/// One single-fire exchange transport.
///
/// Setup calls arrive in a fixed order: `open`, optional setters, then
/// `send` exactly once. After `send`, the driver awaits `notified()` in a
/// loop; each resolution means the transport's observable state may have
/// changed. `response_text` is cumulative and append-only, so a previously
/// observed length is always a valid offset into the current text.
pub trait Transport {
    /// Open the exchange. Credentials, when given, are presented at open
    /// time; the transport is additionally flagged via
    /// `set_with_credentials`.
    fn open(
        &mut self,
        method: &str,
        uri: &str,
        user: Option<&str>,
        password: Option<&str>,
    ) -> io::Result<()>;

    /// Response type hint. Optional capability.
    fn set_response_type(&mut self, response_type: &str) {
        let _ = response_type;
    }

    /// Apply one request header entry. Called once per value for
    /// multi-valued headers, in list order.
    fn set_request_header(&mut self, name: &str, value: &str);

    /// Override the response MIME type. Optional capability.
    fn override_mime_type(&mut self, mime_type: &str) {
        let _ = mime_type;
    }

    /// Include credentials with the transfer. Optional capability.
    fn set_with_credentials(&mut self, with_credentials: bool) {
        let _ = with_credentials;
    }

    /// Overall transfer timeout. Optional capability.
    fn set_timeout(&mut self, timeout: Duration) {
        let _ = timeout;
    }

    /// Initiate the transfer with the request payload.
    fn send(&mut self, body: &str) -> io::Result<()>;

    /// Abort the in-flight transfer. Called at most once per exchange.
    fn abort(&mut self);

    /// Resolves at the next state change. The driver calls this only while
    /// the exchange is live; it must make progress toward `Done`.
    fn notified(&mut self) -> impl Future<Output = ()>;

    fn ready_state(&self) -> ReadyState;

    /// Status code; meaningful once headers are readable.
    fn status(&self) -> u16;

    /// The raw CRLF/LF-delimited "Name: value" header block, or `NotReady`
    /// while headers are unavailable (including any internal fault).
    fn raw_headers(&self) -> Result<String, NotReady>;

    /// Cumulative body text received so far, or `NotReady` (including any
    /// internal fault).
    fn response_text(&self) -> Result<&str, NotReady>;

    /// The transport-level error recorded for the transfer, if any.
    /// Read once, at completion.
    fn take_error(&mut self) -> Option<TransferError>;
}

/*
 * lib.rs
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

//! Rivolo: one HTTP exchange as a pull-driven sequence of events.
//!
//! `connect` takes a URI or a [`Request`] and returns a lazy, single-shot
//! [`Response`] sequence: at most one [`Head`], then body [`Event::Chunk`]s
//! as they arrive, then a terminal outcome — `Ok` with the final consumer
//! state, or `Err` with the transport's [`TransferError`]. Drive it with
//! [`Reducible::reduce`]; return [`Reduction::Reduced`] from the step to
//! stop early (the transfer is aborted, the sequence still ends cleanly).
//!
//! ```no_run
//! use rivolo_core::{read_body, Reducible, Reduction};
//!
//! # async fn demo() -> Result<(), rivolo_core::TransferError> {
//! let body = read_body("http://localhost:8082/stream")
//!     .reduce(String::new(), |mut text, chunk| {
//!         text.push_str(&chunk);
//!         Reduction::Continue(text)
//!     })
//!     .await?;
//! # let _ = body;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod event;
pub mod exchange;
pub mod headers;
pub mod reduce;
pub mod request;
pub mod tcp;
pub mod transport;
pub mod uri;

pub use client::{
    connect, connect_with, read_body, read_body_with, read_head, read_head_with, read_headers,
    read_headers_with,
};
pub use error::{NotReady, TransferError};
pub use event::{Event, Head};
pub use exchange::Response;
pub use headers::{is_header_allowed, parse_header_block, HeaderValue, Headers};
pub use reduce::{map, skip, take, Map, Reducible, Reduction, Skip, Take};
pub use request::{Credentials, Request};
pub use tcp::TcpTransport;
pub use transport::{ReadyState, Transport};

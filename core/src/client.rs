/*
 * client.rs
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

//! Connect and the derived views. `connect` accepts a bare URI string or a
//! full `Request` and returns the raw event sequence; the `read_*`
//! operations narrow it to the head, the header map, or the body chunks.
//! All views are pure compositions over the producer.

use crate::error::TransferError;
use crate::event::Event;
use crate::exchange::Response;
use crate::headers::Headers;
use crate::reduce::{map, skip, take, Reducible};
use crate::request::Request;
use crate::tcp::TcpTransport;
use crate::transport::Transport;

/// Connect over the bundled TCP transport.
pub fn connect(request: impl Into<Request>) -> Response<TcpTransport> {
    connect_with(request, TcpTransport::new())
}

/// Connect over a caller-supplied transport.
pub fn connect_with<T: Transport>(request: impl Into<Request>, transport: T) -> Response<T> {
    Response::new(request.into(), transport)
}

/// The sequence limited to its first element: the head, for any exchange
/// that produces one.
pub fn read_head(
    request: impl Into<Request>,
) -> impl Reducible<Item = Event, Error = TransferError> {
    read_head_with(request, TcpTransport::new())
}

pub fn read_head_with<T: Transport>(
    request: impl Into<Request>,
    transport: T,
) -> impl Reducible<Item = Event, Error = TransferError> {
    take(connect_with(request, transport), 1)
}

/// The head view narrowed to just its header mapping.
pub fn read_headers(
    request: impl Into<Request>,
) -> impl Reducible<Item = Headers, Error = TransferError> {
    read_headers_with(request, TcpTransport::new())
}

pub fn read_headers_with<T: Transport>(
    request: impl Into<Request>,
    transport: T,
) -> impl Reducible<Item = Headers, Error = TransferError> {
    map(read_head_with(request, transport), |event| {
        event.into_head().map(|head| head.headers).unwrap_or_default()
    })
}

/// The body view: the head skipped, each remaining event its chunk text.
pub fn read_body(
    request: impl Into<Request>,
) -> impl Reducible<Item = String, Error = TransferError> {
    read_body_with(request, TcpTransport::new())
}

pub fn read_body_with<T: Transport>(
    request: impl Into<Request>,
    transport: T,
) -> impl Reducible<Item = String, Error = TransferError> {
    map(skip(connect_with(request, transport), 1), |event| {
        event.into_chunk().unwrap_or_default()
    })
}

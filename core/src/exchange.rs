/*
 * exchange.rs
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

//! The sequence producer: one transport, one reducible sequence of events.
//!
//! `Response` is the lazy single-shot sequence `connect` returns; nothing
//! touches the network until `reduce` is called. The `Exchange` state
//! machine handles one transport notification at a time: parse the head
//! once it is readable, then deliver each newly arrived body fragment,
//! then the terminal outcome. The consumer's reduction state is checked
//! after every emission; a reduced state detaches the handler, aborts the
//! transfer, and still ends the sequence with the success marker.

use std::future::Future;
use std::io;

use crate::error::TransferError;
use crate::event::{Event, Head};
use crate::headers::{is_header_allowed, parse_header_block, HeaderValue};
use crate::reduce::{Reducible, Reduction};
use crate::request::Request;
use crate::transport::{ReadyState, Transport};

/// The event sequence of one exchange. Lazy: the transport is opened and
/// the request sent only when `reduce` starts driving.
pub struct Response<T> {
    request: Request,
    transport: T,
}

impl<T> Response<T> {
    pub(crate) fn new(request: Request, transport: T) -> Self {
        Self { request, transport }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }
}

impl<T: Transport> Reducible for Response<T> {
    type Item = Event;
    type Error = TransferError;

    fn reduce<S, F>(self, seed: S, step: F) -> impl Future<Output = Result<S, TransferError>>
    where
        F: FnMut(S, Event) -> Reduction<S>,
    {
        let Response {
            request,
            mut transport,
        } = self;
        async move {
            if let Err(error) = start(&request, &mut transport) {
                return Err(TransferError::new(error.to_string()));
            }
            let mut exchange = Exchange::new(seed, step);
            while !exchange.detached() {
                transport.notified().await;
                exchange.notify(&mut transport);
            }
            exchange.finish()
        }
    }
}

/// Open the transport and initiate the transfer, in the documented order:
/// open (credentials at open time), response type, headers minus the
/// denylist, MIME override, with-credentials flag, timeout, send.
fn start<T: Transport>(request: &Request, transport: &mut T) -> io::Result<()> {
    let uri = request.formatted_uri();
    match &request.credentials {
        Some(credentials) => transport.open(
            &request.method,
            &uri,
            Some(&credentials.user),
            Some(&credentials.password),
        )?,
        None => transport.open(&request.method, &uri, None, None)?,
    }
    if let Some(response_type) = &request.response_type {
        transport.set_response_type(response_type);
    }
    for (name, value) in request.headers.iter() {
        if !is_header_allowed(name) {
            continue;
        }
        match value {
            HeaderValue::Single(v) => transport.set_request_header(name, v),
            HeaderValue::Multiple(vs) => {
                for v in vs {
                    transport.set_request_header(name, v);
                }
            }
            HeaderValue::Flag => {}
        }
    }
    if let Some(mime_type) = &request.mime_type {
        transport.override_mime_type(mime_type);
    }
    if request.credentials.is_some() {
        transport.set_with_credentials(true);
    }
    if let Some(timeout) = request.timeout {
        transport.set_timeout(timeout);
    }
    transport.send(&request.body)
}

/// Per-exchange notification handler. Private, mutable state owned by one
/// drive of one sequence; nothing is shared across exchanges.
struct Exchange<S, F> {
    step: F,
    state: Option<S>,
    reduced: bool,
    /// Byte offset into the cumulative response text already delivered.
    position: usize,
    head_seen: bool,
    detached: bool,
    failure: Option<TransferError>,
}

impl<S, F> Exchange<S, F>
where
    F: FnMut(S, Event) -> Reduction<S>,
{
    fn new(seed: S, step: F) -> Self {
        Self {
            step,
            state: Some(seed),
            reduced: false,
            position: 0,
            head_seen: false,
            detached: false,
            failure: None,
        }
    }

    fn detached(&self) -> bool {
        self.detached
    }

    /// Handle one transport state change. Zero or one emission, then the
    /// completion and cancellation checks. Once detached this is a no-op,
    /// so detaching is idempotent and the transfer is aborted at most once.
    fn notify<T: Transport>(&mut self, transport: &mut T) {
        if self.detached {
            return;
        }

        if !self.head_seen {
            if let Ok(raw) = transport.raw_headers() {
                let head = Head {
                    status_code: transport.status(),
                    headers: parse_header_block(&raw),
                };
                self.head_seen = true;
                self.emit(Event::Head(head));
            }
        } else if let Ok(text) = transport.response_text() {
            if text.len() > self.position {
                let chunk = text[self.position..].to_string();
                self.position += chunk.len();
                self.emit(Event::Chunk(chunk));
            }
        }

        if transport.ready_state() == ReadyState::Done {
            self.detached = true;
            self.failure = transport.take_error();
        } else if self.reduced {
            self.detached = true;
            transport.abort();
        }
    }

    fn emit(&mut self, event: Event) {
        if let Some(state) = self.state.take() {
            match (self.step)(state, event) {
                Reduction::Continue(state) => self.state = Some(state),
                Reduction::Reduced(state) => {
                    self.state = Some(state);
                    self.reduced = true;
                }
            }
        }
    }

    /// The terminal outcome: the transport's recorded failure, or the
    /// success end marker carrying the final consumer state.
    fn finish(mut self) -> Result<S, TransferError> {
        if let Some(failure) = self.failure.take() {
            return Err(failure);
        }
        match self.state.take() {
            Some(state) => Ok(state),
            None => Err(TransferError::new("exchange lost its reduction state")),
        }
    }
}

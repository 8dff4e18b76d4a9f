/*
 * mod.rs
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

//! Bundled transport: one plain-TCP HTTP/1.1 exchange per instance.
//!
//! The socket is opened and the request written on the first
//! `notified()`; each later call performs one read and advances the
//! response parser, so every resolution is one observable state change.
//! `Connection: close` is always sent — a transport instance is
//! single-fire and never reuses its connection.

mod parser;

use std::future::Future;
use std::io;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::error::{NotReady, TransferError};
use crate::transport::{ReadyState, Transport};
use crate::uri::{split_uri, SplitUri};

use parser::ResponseParser;

/// Plain-TCP `http:` transport. Create one per exchange.
pub struct TcpTransport {
    method: String,
    split: Option<SplitUri>,
    credentials: Option<(String, String)>,
    timeout: Option<Duration>,
    request_headers: Vec<(String, String)>,
    body: String,
    stream: Option<TcpStream>,
    buf: BytesMut,
    parser: ResponseParser,
    started: bool,
    ready: ReadyState,
    error: Option<TransferError>,
}

impl TcpTransport {
    pub fn new() -> Self {
        Self {
            method: String::new(),
            split: None,
            credentials: None,
            timeout: None,
            request_headers: Vec::new(),
            body: String::new(),
            stream: None,
            buf: BytesMut::with_capacity(8192),
            parser: ResponseParser::new(false),
            started: false,
            ready: ReadyState::Unsent,
            error: None,
        }
    }

    /// Record a failure and finish the transfer.
    fn fail(&mut self, error: TransferError) {
        self.error = Some(error);
        self.ready = ReadyState::Done;
        self.stream = None;
    }

    /// Advance the observable state after parser progress. Completion is
    /// staged: headers must have been observable on an earlier notification
    /// before `Done` shows, so a head is never announced and completed in
    /// the same state change (the final body fragment, by contrast, is
    /// consumed on the `Done` notification itself).
    fn settle(&mut self) {
        if self.parser.is_complete() {
            if self.ready >= ReadyState::HeadersReceived {
                self.ready = ReadyState::Done;
                self.stream = None;
            } else {
                self.ready = ReadyState::HeadersReceived;
            }
        } else if self.parser.headers_done() {
            self.ready = if self.parser.body_text().is_empty() {
                ReadyState::HeadersReceived
            } else {
                ReadyState::Loading
            };
        }
    }

    /// Connect and write the serialized request.
    async fn establish(&mut self) -> io::Result<()> {
        let split = self.split.clone().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, "transport was not opened")
        })?;
        let addr = format!("{}:{}", split.host, split.port);
        let mut stream = TcpStream::connect(&addr).await?;
        stream.write_all(&self.serialize_request(&split)).await?;
        stream.flush().await?;
        self.stream = Some(stream);
        Ok(())
    }

    fn serialize_request(&self, split: &SplitUri) -> Vec<u8> {
        let host_header = if split.port != 80 {
            format!("{}:{}", split.host, split.port)
        } else {
            split.host.clone()
        };
        let mut request = format!(
            "{} {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n",
            self.method, split.target, host_header
        );
        for (name, value) in &self.request_headers {
            request.push_str(name);
            request.push_str(": ");
            request.push_str(value);
            request.push_str("\r\n");
        }
        if let Some((user, password)) = &self.credentials {
            let already_set = self
                .request_headers
                .iter()
                .any(|(name, _)| name.eq_ignore_ascii_case("authorization"));
            if !already_set {
                let token = BASE64.encode(format!("{}:{}", user, password));
                request.push_str("Authorization: Basic ");
                request.push_str(&token);
                request.push_str("\r\n");
            }
        }
        if !self.body.is_empty() {
            request.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
        }
        request.push_str("\r\n");
        let mut bytes = request.into_bytes();
        bytes.extend_from_slice(self.body.as_bytes());
        bytes
    }

    /// Run one async step under the configured timeout, if any.
    async fn with_timeout<T>(
        limit: Option<Duration>,
        work: impl Future<Output = io::Result<T>>,
    ) -> Result<io::Result<T>, TransferError> {
        match limit {
            Some(limit) => timeout(limit, work).await.map_err(|_| TransferError::Timeout),
            None => Ok(work.await),
        }
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for TcpTransport {
    fn open(
        &mut self,
        method: &str,
        uri: &str,
        user: Option<&str>,
        password: Option<&str>,
    ) -> io::Result<()> {
        let split = split_uri(uri)?;
        if split.scheme != "http" {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("unsupported scheme: {}", split.scheme),
            ));
        }
        self.method = method.to_string();
        self.parser = ResponseParser::new(method.eq_ignore_ascii_case("HEAD"));
        self.split = Some(split);
        if let (Some(user), Some(password)) = (user, password) {
            self.credentials = Some((user.to_string(), password.to_string()));
        }
        self.ready = ReadyState::Opened;
        Ok(())
    }

    fn set_request_header(&mut self, name: &str, value: &str) {
        self.request_headers
            .push((name.to_string(), value.to_string()));
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = Some(timeout);
    }

    fn send(&mut self, body: &str) -> io::Result<()> {
        if self.ready != ReadyState::Opened {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "transport was not opened",
            ));
        }
        self.body = body.to_string();
        Ok(())
    }

    fn abort(&mut self) {
        self.stream = None;
        self.ready = ReadyState::Done;
    }

    fn notified(&mut self) -> impl Future<Output = ()> {
        async move {
            if self.ready == ReadyState::Done {
                return;
            }

            if !self.started {
                self.started = true;
                match Self::with_timeout(self.timeout, self.establish()).await {
                    Ok(Ok(())) => {}
                    Ok(Err(error)) => self.fail(TransferError::new(error.to_string())),
                    Err(timed_out) => self.fail(timed_out),
                }
                return;
            }

            // a finished parse still owes staged state changes; no read
            if self.parser.is_complete() {
                self.settle();
                return;
            }

            let limit = self.timeout;
            let Some(stream) = self.stream.as_mut() else {
                self.ready = ReadyState::Done;
                return;
            };
            let mut tmp = [0u8; 8192];
            let read = match Self::with_timeout(limit, stream.read(&mut tmp)).await {
                Ok(result) => result,
                Err(timed_out) => {
                    self.fail(timed_out);
                    return;
                }
            };
            match read {
                Err(error) => self.fail(TransferError::new(error.to_string())),
                Ok(0) => match self.parser.finish_eof() {
                    Ok(()) => self.settle(),
                    Err(error) => self.fail(TransferError::new(error.to_string())),
                },
                Ok(n) => {
                    self.buf.extend_from_slice(&tmp[..n]);
                    match self.parser.receive(&mut self.buf) {
                        Ok(()) => self.settle(),
                        Err(error) => self.fail(TransferError::new(error.to_string())),
                    }
                }
            }
        }
    }

    fn ready_state(&self) -> ReadyState {
        self.ready
    }

    fn status(&self) -> u16 {
        self.parser.status()
    }

    fn raw_headers(&self) -> Result<String, NotReady> {
        if self.parser.headers_done() {
            Ok(self.parser.raw_headers().to_string())
        } else {
            Err(NotReady)
        }
    }

    fn response_text(&self) -> Result<&str, NotReady> {
        if self.parser.headers_done() {
            Ok(self.parser.body_text())
        } else {
            Err(NotReady)
        }
    }

    fn take_error(&mut self) -> Option<TransferError> {
        self.error.take()
    }
}

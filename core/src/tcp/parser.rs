/*
 * parser.rs
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

//! HTTP/1.1 response parser feeding the transport's accumulated view:
//! status code, raw header block kept verbatim, cumulative body text.
//! Body framing: Content-Length, chunked, or read-until-close.

use bytes::{Buf, BytesMut};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    StatusLine,
    Headers,
    Body,
    ChunkSize,
    ChunkData,
    ChunkTrailer,
    Done,
}

/// Incremental parser. Feed bytes via `receive`; read the accumulated
/// response through the accessors. Partial data stays in the caller's
/// buffer between calls.
pub(crate) struct ResponseParser {
    state: ParseState,
    head_request: bool,
    status: u16,
    /// Header lines as received, CRLF-joined, for the raw-block accessor.
    raw_headers: String,
    headers_done: bool,
    /// Cumulative body text; append-only.
    body: String,
    /// Bytes not yet decodable as UTF-8 (a character split across reads).
    pending: Vec<u8>,
    content_length: Option<u64>,
    body_received: u64,
    chunked: bool,
    chunk_remaining: u64,
    read_to_close: bool,
}

impl ResponseParser {
    pub fn new(head_request: bool) -> Self {
        Self {
            state: ParseState::StatusLine,
            head_request,
            status: 0,
            raw_headers: String::new(),
            headers_done: false,
            body: String::new(),
            pending: Vec::new(),
            content_length: None,
            body_received: 0,
            chunked: false,
            chunk_remaining: 0,
            read_to_close: false,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers_done(&self) -> bool {
        self.headers_done
    }

    pub fn raw_headers(&self) -> &str {
        &self.raw_headers
    }

    pub fn body_text(&self) -> &str {
        &self.body
    }

    pub fn is_complete(&self) -> bool {
        self.state == ParseState::Done
    }

    /// Find CRLF in buf; bytes up to the start of CRLF, or None.
    fn find_crlf(buf: &[u8]) -> Option<usize> {
        let mut i = 0;
        while i + 1 < buf.len() {
            if buf[i] == b'\r' && buf[i + 1] == b'\n' {
                return Some(i);
            }
            i += 1;
        }
        None
    }

    /// Consume and parse as much as possible from buf; partial tokens stay
    /// for the next call.
    pub fn receive(&mut self, buf: &mut BytesMut) -> io::Result<()> {
        while !buf.is_empty() {
            match self.state {
                ParseState::StatusLine => {
                    let line_end = match Self::find_crlf(buf) {
                        Some(n) => n,
                        None => return Ok(()),
                    };
                    let line = buf.split_to(line_end + 2);
                    let line_str = std::str::from_utf8(&line[..line_end]).map_err(|_| {
                        io::Error::new(io::ErrorKind::InvalidData, "invalid status line UTF-8")
                    })?;
                    // HTTP/1.1 200 OK or HTTP/1.1 200
                    let parts: Vec<&str> = line_str.splitn(3, ' ').collect();
                    self.status = parts
                        .get(1)
                        .and_then(|s| s.parse::<u16>().ok())
                        .unwrap_or(0);
                    self.state = ParseState::Headers;
                }
                ParseState::Headers => {
                    let line_end = match Self::find_crlf(buf) {
                        Some(n) => n,
                        None => return Ok(()),
                    };
                    if line_end == 0 {
                        buf.advance(2);
                        self.headers_done = true;
                        self.enter_body_state();
                        continue;
                    }
                    let line = buf.split_to(line_end + 2);
                    let line_str = std::str::from_utf8(&line[..line_end]).map_err(|_| {
                        io::Error::new(io::ErrorKind::InvalidData, "invalid header UTF-8")
                    })?;
                    self.raw_headers.push_str(line_str);
                    self.raw_headers.push_str("\r\n");
                    if let Some(colon) = line_str.find(':') {
                        let name = line_str[..colon].trim();
                        let value = line_str[colon + 1..].trim();
                        if name.eq_ignore_ascii_case("content-length") {
                            self.content_length = value.parse::<u64>().ok();
                        } else if name.eq_ignore_ascii_case("transfer-encoding")
                            && value.to_ascii_lowercase().contains("chunked")
                        {
                            self.chunked = true;
                        }
                    }
                }
                ParseState::Body => {
                    if self.read_to_close {
                        let chunk = buf.split_to(buf.len());
                        self.append_body(&chunk);
                        // connection close will signal the end
                        return Ok(());
                    }
                    let remaining =
                        (self.content_length.unwrap_or(0) - self.body_received) as usize;
                    let to_read = remaining.min(buf.len());
                    if to_read > 0 {
                        let chunk = buf.split_to(to_read);
                        self.append_body(&chunk);
                        self.body_received += to_read as u64;
                    }
                    if self.body_received >= self.content_length.unwrap_or(0) {
                        self.finish_body();
                    }
                }
                ParseState::ChunkSize => {
                    let line_end = match Self::find_crlf(buf) {
                        Some(n) => n,
                        None => return Ok(()),
                    };
                    let line = buf.split_to(line_end + 2);
                    let line_str = std::str::from_utf8(&line[..line_end]).map_err(|_| {
                        io::Error::new(io::ErrorKind::InvalidData, "invalid chunk size")
                    })?;
                    let hex_part = line_str.split(';').next().unwrap_or(line_str).trim();
                    self.chunk_remaining = u64::from_str_radix(hex_part, 16).unwrap_or(0);
                    if self.chunk_remaining == 0 {
                        self.state = ParseState::ChunkTrailer;
                    } else {
                        self.state = ParseState::ChunkData;
                    }
                }
                ParseState::ChunkData => {
                    let to_read = (self.chunk_remaining as usize).min(buf.len());
                    if to_read > 0 {
                        let chunk = buf.split_to(to_read);
                        self.append_body(&chunk);
                        self.chunk_remaining -= to_read as u64;
                    }
                    if self.chunk_remaining == 0 {
                        // consume the CRLF after the chunk data
                        if buf.len() >= 2 {
                            buf.advance(2);
                            self.state = ParseState::ChunkSize;
                        } else {
                            return Ok(());
                        }
                    } else {
                        return Ok(());
                    }
                }
                ParseState::ChunkTrailer => {
                    let line_end = match Self::find_crlf(buf) {
                        Some(n) => n,
                        None => return Ok(()),
                    };
                    if line_end == 0 {
                        buf.advance(2);
                        self.finish_body();
                    } else {
                        // trailers are not part of the raw header block
                        buf.advance(line_end + 2);
                    }
                }
                ParseState::Done => return Ok(()),
            }
        }
        Ok(())
    }

    /// The connection closed. Read-until-close bodies end here; anywhere
    /// else mid-response is a truncated transfer.
    pub fn finish_eof(&mut self) -> io::Result<()> {
        match self.state {
            ParseState::Done => Ok(()),
            ParseState::Body if self.read_to_close => {
                self.finish_body();
                Ok(())
            }
            _ => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed before the response completed",
            )),
        }
    }

    fn enter_body_state(&mut self) {
        if self.head_request || self.status == 204 || self.status == 304 {
            self.state = ParseState::Done;
        } else if self.chunked {
            self.state = ParseState::ChunkSize;
        } else if let Some(length) = self.content_length {
            if length == 0 {
                self.state = ParseState::Done;
            } else {
                self.state = ParseState::Body;
            }
        } else {
            self.read_to_close = true;
            self.state = ParseState::Body;
        }
    }

    fn finish_body(&mut self) {
        if !self.pending.is_empty() {
            self.pending.clear();
            self.body.push('\u{FFFD}');
        }
        self.state = ParseState::Done;
    }

    /// Append raw bytes as text. Only whole UTF-8 characters reach the
    /// body so the cumulative text stays append-only; a character split
    /// across reads waits in `pending` for its remaining bytes.
    fn append_body(&mut self, data: &[u8]) {
        self.pending.extend_from_slice(data);
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(valid) => {
                    self.body.push_str(valid);
                    self.pending.clear();
                    break;
                }
                Err(error) => {
                    let valid_len = error.valid_up_to();
                    if let Ok(valid) = std::str::from_utf8(&self.pending[..valid_len]) {
                        self.body.push_str(valid);
                    }
                    match error.error_len() {
                        Some(bad) => {
                            self.body.push('\u{FFFD}');
                            self.pending.drain(..valid_len + bad);
                        }
                        None => {
                            self.pending.drain(..valid_len);
                            break;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(parser: &mut ResponseParser, data: &[u8]) {
        let mut buf = BytesMut::from(data);
        parser.receive(&mut buf).unwrap();
    }

    #[test]
    fn parses_status_headers_and_content_length_body() {
        let mut parser = ResponseParser::new(false);
        feed(
            &mut parser,
            b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 4\r\n\r\nboop",
        );
        assert_eq!(parser.status(), 200);
        assert!(parser.headers_done());
        assert_eq!(
            parser.raw_headers(),
            "Content-Type: text/plain\r\nContent-Length: 4\r\n"
        );
        assert_eq!(parser.body_text(), "boop");
        assert!(parser.is_complete());
    }

    #[test]
    fn tolerates_arbitrary_split_points() {
        let raw =
            b"HTTP/1.1 200 OK\r\nContent-Length: 11\r\n\r\nhello world".as_slice();
        for split in 1..raw.len() {
            let mut parser = ResponseParser::new(false);
            let mut buf = BytesMut::new();
            buf.extend_from_slice(&raw[..split]);
            parser.receive(&mut buf).unwrap();
            buf.extend_from_slice(&raw[split..]);
            parser.receive(&mut buf).unwrap();
            assert_eq!(parser.body_text(), "hello world", "split at {}", split);
            assert!(parser.is_complete());
        }
    }

    #[test]
    fn parses_chunked_body_across_feeds() {
        let mut parser = ResponseParser::new(false);
        feed(
            &mut parser,
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n",
        );
        assert!(parser.headers_done());
        assert!(!parser.is_complete());

        feed(&mut parser, b"5\r\nhello\r\n");
        assert_eq!(parser.body_text(), "hello");
        feed(&mut parser, b"6\r\n world\r\n");
        assert_eq!(parser.body_text(), "hello world");
        feed(&mut parser, b"0\r\n\r\n");
        assert!(parser.is_complete());
    }

    #[test]
    fn read_until_close_ends_at_eof() {
        let mut parser = ResponseParser::new(false);
        feed(&mut parser, b"HTTP/1.1 200 OK\r\n\r\nbye bye");
        assert_eq!(parser.body_text(), "bye bye");
        assert!(!parser.is_complete());
        parser.finish_eof().unwrap();
        assert!(parser.is_complete());
    }

    #[test]
    fn eof_mid_response_is_an_error() {
        let mut parser = ResponseParser::new(false);
        feed(&mut parser, b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nhal");
        assert!(parser.finish_eof().is_err());
    }

    #[test]
    fn head_request_has_no_body() {
        let mut parser = ResponseParser::new(true);
        feed(
            &mut parser,
            b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n",
        );
        assert!(parser.is_complete());
        assert_eq!(parser.body_text(), "");
    }

    #[test]
    fn status_without_reason_parses() {
        let mut parser = ResponseParser::new(false);
        feed(&mut parser, b"HTTP/1.1 204\r\n\r\n");
        assert_eq!(parser.status(), 204);
        assert!(parser.is_complete());
    }

    #[test]
    fn multibyte_character_split_across_reads_stays_intact() {
        let mut parser = ResponseParser::new(false);
        feed(&mut parser, b"HTTP/1.1 200 OK\r\nContent-Length: 4\r\n\r\n");
        // U+00E9 is 0xC3 0xA9; split between the two bytes
        feed(&mut parser, b"a\xC3");
        assert_eq!(parser.body_text(), "a");
        feed(&mut parser, b"\xA9b");
        assert_eq!(parser.body_text(), "a\u{00E9}b");
        assert!(parser.is_complete());
    }

    #[test]
    fn duplicate_header_lines_stay_verbatim_in_the_raw_block() {
        let mut parser = ResponseParser::new(false);
        feed(
            &mut parser,
            b"HTTP/1.1 200 OK\r\nbling: blong\r\nbling: blong\r\nContent-Length: 0\r\n\r\n",
        );
        assert_eq!(
            parser.raw_headers(),
            "bling: blong\r\nbling: blong\r\nContent-Length: 0\r\n"
        );
        assert!(parser.is_complete());
    }
}

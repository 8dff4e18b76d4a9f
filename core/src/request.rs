/*
 * request.rs
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

//! Request descriptor: everything one exchange needs, with documented
//! defaults (method GET, protocol "http:", path "/"). Build with the
//! chained setters, then hand to `connect`; the descriptor is not touched
//! again once the exchange starts.

use std::time::Duration;

use crate::headers::Headers;
use crate::uri::format_uri;

/// Username/password pair passed to the transport at open time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

/// Description of one exchange. `uri`, when unset, is formatted from the
/// URL components on demand.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: String,
    /// Scheme with trailing colon, e.g. "http:".
    pub protocol: String,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub pathname: String,
    pub query: String,
    pub hash: String,
    pub headers: Headers,
    pub body: String,
    pub response_type: Option<String>,
    pub mime_type: Option<String>,
    pub credentials: Option<Credentials>,
    pub timeout: Option<Duration>,
    pub uri: Option<String>,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            method: "GET".to_string(),
            protocol: "http:".to_string(),
            host: None,
            port: None,
            pathname: "/".to_string(),
            query: String::new(),
            hash: String::new(),
            headers: Headers::new(),
            body: String::new(),
            response_type: None,
            mime_type: None,
            credentials: None,
            timeout: None,
            uri: None,
        }
    }
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    /// A request for an already-formatted URI.
    pub fn with_uri(uri: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            ..Self::default()
        }
    }

    /// Set the method, uppercased.
    pub fn method(&mut self, method: &str) -> &mut Self {
        self.method = method.to_ascii_uppercase();
        self
    }

    pub fn host(&mut self, host: impl Into<String>) -> &mut Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(&mut self, port: u16) -> &mut Self {
        self.port = Some(port);
        self
    }

    pub fn pathname(&mut self, pathname: impl Into<String>) -> &mut Self {
        self.pathname = pathname.into();
        self
    }

    pub fn query(&mut self, query: impl Into<String>) -> &mut Self {
        self.query = query.into();
        self
    }

    pub fn hash(&mut self, hash: impl Into<String>) -> &mut Self {
        self.hash = hash.into();
        self
    }

    /// Set a header to a single value, replacing any previous one.
    pub fn header(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.headers.set(name, value);
        self
    }

    /// Set a header to an ordered list; the transport receives one entry
    /// per value, in order.
    pub fn header_values(&mut self, name: &str, values: Vec<String>) -> &mut Self {
        self.headers.set_values(name, values);
        self
    }

    pub fn body(&mut self, body: impl Into<String>) -> &mut Self {
        self.body = body.into();
        self
    }

    pub fn response_type(&mut self, response_type: impl Into<String>) -> &mut Self {
        self.response_type = Some(response_type.into());
        self
    }

    pub fn mime_type(&mut self, mime_type: impl Into<String>) -> &mut Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn credentials(&mut self, user: impl Into<String>, password: impl Into<String>) -> &mut Self {
        self.credentials = Some(Credentials {
            user: user.into(),
            password: password.into(),
        });
        self
    }

    pub fn timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeout = Some(timeout);
        self
    }

    /// The URI the transport is opened with: the explicit one if supplied,
    /// otherwise formatted from the components.
    pub fn formatted_uri(&self) -> String {
        match &self.uri {
            Some(uri) => uri.clone(),
            None => format_uri(
                &self.protocol,
                self.host.as_deref().unwrap_or(""),
                self.port,
                &self.pathname,
                &self.query,
                &self.hash,
            ),
        }
    }
}

impl From<&str> for Request {
    fn from(uri: &str) -> Self {
        Request::with_uri(uri)
    }
}

impl From<String> for Request {
    fn from(uri: String) -> Self {
        Request::with_uri(uri)
    }
}

/*
 * event.rs
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

//! Events emitted by one exchange: at most one head, then body chunks.
//! The terminal outcome is the `reduce` result, not an event.

use crate::headers::Headers;

/// Status code and header mapping, available before the body has arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Head {
    pub status_code: u16,
    pub headers: Headers,
}

/// One emission of an exchange's sequence. The head, when present, is
/// always first; chunks partition the body text in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Head(Head),
    Chunk(String),
}

impl Event {
    pub fn is_head(&self) -> bool {
        matches!(self, Event::Head(_))
    }

    pub fn into_head(self) -> Option<Head> {
        match self {
            Event::Head(head) => Some(head),
            Event::Chunk(_) => None,
        }
    }

    pub fn into_chunk(self) -> Option<String> {
        match self {
            Event::Chunk(chunk) => Some(chunk),
            Event::Head(_) => None,
        }
    }
}

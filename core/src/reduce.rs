/*
 * reduce.rs
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

//! Pull-driven reducible sequences.
//!
//! A `Reducible` is driven once: `reduce` feeds every item through a
//! synchronous step function that threads consumer state, and resolves to
//! the terminal outcome (`Ok` end marker or the producer's error value).
//! Returning `Reduction::Reduced` from the step is the one and only way a
//! consumer stops a producer early; producers check for it after every
//! emission. The `take`/`skip`/`map` combinators derive narrowed sequences
//! without adding state of their own.

use std::future::Future;

/// Consumer state after one reduction step. `Reduced` tells the producer
/// to stop feeding items; the sequence still terminates normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction<S> {
    Continue(S),
    Reduced(S),
}

impl<S> Reduction<S> {
    pub fn is_reduced(&self) -> bool {
        matches!(self, Reduction::Reduced(_))
    }

    pub fn into_inner(self) -> S {
        match self {
            Reduction::Continue(state) | Reduction::Reduced(state) => state,
        }
    }
}

/// A single-shot sequence of items ending in a terminal outcome.
///
/// `reduce` consumes the sequence; it cannot be driven twice. The step
/// function runs synchronously per item; the future suspends between items
/// while the producer waits for more data.
pub trait Reducible: Sized {
    type Item;
    type Error;

    fn reduce<S, F>(self, seed: S, step: F) -> impl Future<Output = Result<S, Self::Error>>
    where
        F: FnMut(S, Self::Item) -> Reduction<S>;
}

/// Limit a sequence to its first `n` items. See [`take`].
pub struct Take<R> {
    inner: R,
    n: usize,
}

/// Limit `inner` to its first `n` items; the consumer state is marked
/// reduced once the quota is delivered, which stops the producer early.
pub fn take<R: Reducible>(inner: R, n: usize) -> Take<R> {
    Take { inner, n }
}

impl<R: Reducible> Reducible for Take<R> {
    type Item = R::Item;
    type Error = R::Error;

    fn reduce<S, F>(self, seed: S, mut step: F) -> impl Future<Output = Result<S, Self::Error>>
    where
        F: FnMut(S, Self::Item) -> Reduction<S>,
    {
        let Take { inner, n } = self;
        let mut remaining = n;
        async move {
            if remaining == 0 {
                return Ok(seed);
            }
            inner
                .reduce(seed, move |state, item| match step(state, item) {
                    Reduction::Reduced(state) => Reduction::Reduced(state),
                    Reduction::Continue(state) => {
                        remaining -= 1;
                        if remaining == 0 {
                            Reduction::Reduced(state)
                        } else {
                            Reduction::Continue(state)
                        }
                    }
                })
                .await
        }
    }
}

/// Drop the first `n` items of a sequence. See [`skip`].
pub struct Skip<R> {
    inner: R,
    n: usize,
}

/// Suppress the first `n` items of `inner`, passing the rest through.
pub fn skip<R: Reducible>(inner: R, n: usize) -> Skip<R> {
    Skip { inner, n }
}

impl<R: Reducible> Reducible for Skip<R> {
    type Item = R::Item;
    type Error = R::Error;

    fn reduce<S, F>(self, seed: S, mut step: F) -> impl Future<Output = Result<S, Self::Error>>
    where
        F: FnMut(S, Self::Item) -> Reduction<S>,
    {
        let Skip { inner, n } = self;
        let mut remaining = n;
        async move {
            inner
                .reduce(seed, move |state, item| {
                    if remaining > 0 {
                        remaining -= 1;
                        Reduction::Continue(state)
                    } else {
                        step(state, item)
                    }
                })
                .await
        }
    }
}

/// Transform each item of a sequence. See [`map`].
pub struct Map<R, F> {
    inner: R,
    f: F,
}

/// Apply `f` to every item of `inner`.
pub fn map<R, F, T>(inner: R, f: F) -> Map<R, F>
where
    R: Reducible,
    F: FnMut(R::Item) -> T,
{
    Map { inner, f }
}

impl<R, F, T> Reducible for Map<R, F>
where
    R: Reducible,
    F: FnMut(R::Item) -> T,
{
    type Item = T;
    type Error = R::Error;

    fn reduce<S, G>(self, seed: S, mut step: G) -> impl Future<Output = Result<S, Self::Error>>
    where
        G: FnMut(S, Self::Item) -> Reduction<S>,
    {
        let Map { inner, mut f } = self;
        async move {
            inner
                .reduce(seed, move |state, item| step(state, f(item)))
                .await
        }
    }
}

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

//! C FFI for rivolo core. Exchanges are identified by URI; events are
//! delivered through extern "C" callbacks on a worker thread (the UI must
//! marshal to its own thread). A callback returning nonzero marks the
//! consumer state reduced: the transfer is aborted and the completion
//! callback still fires with ok = 1.
//! All string parameters are UTF-8 NUL-terminated. Strings returned to
//! callbacks are valid only for the duration of the call.

use std::ffi::{CStr, CString};
use std::ptr;
use std::thread;

use libc::{c_char, c_int, c_void, size_t};

use rivolo_core::{connect, read_body, Event, Reducible, Reduction, TransferError};

/// Head callback: status code plus the header map as a JSON object
/// (string | array | true values). Return nonzero to stop the exchange.
pub type RivoloOnHead = extern "C" fn(u16, *const c_char, *mut c_void) -> c_int;

/// Chunk callback: one body fragment, not NUL-terminated. Return nonzero
/// to stop the exchange.
pub type RivoloOnChunk = extern "C" fn(*const u8, size_t, *mut c_void) -> c_int;

/// Completion callback: ok = 1 with error NULL on success (including
/// consumer-cancelled exchanges), ok = 0 with an error message on a
/// transport failure.
pub type RivoloOnComplete = extern "C" fn(c_int, *const c_char, *mut c_void);

/// Wrapper so *mut c_void can be moved into Send closures (thread::spawn).
/// C callbacks are invoked from worker threads.
struct SendableUserData(*mut c_void);
unsafe impl Send for SendableUserData {}
unsafe impl Sync for SendableUserData {}

/// Shared tokio runtime for all exchanges.
fn runtime() -> &'static tokio::runtime::Runtime {
    static RUNTIME: once_cell::sync::OnceCell<tokio::runtime::Runtime> =
        once_cell::sync::OnceCell::new();
    RUNTIME.get_or_init(|| {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("failed to create tokio runtime")
    })
}

fn ptr_to_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string()) }
}

fn complete(on_complete: RivoloOnComplete, outcome: Result<(), TransferError>, user_data: *mut c_void) {
    match outcome {
        Ok(()) => on_complete(1, ptr::null(), user_data),
        Err(error) => {
            let message = CString::new(error.to_string())
                .unwrap_or_else(|_| CString::new("transfer failed").unwrap_or_default());
            on_complete(0, message.as_ptr(), user_data);
        }
    }
}

fn deliver_head(on_head: RivoloOnHead, head: &rivolo_core::Head, user_data: *mut c_void) -> c_int {
    let json = serde_json::to_string(&head.headers).unwrap_or_else(|_| "{}".to_string());
    match CString::new(json) {
        Ok(json) => on_head(head.status_code, json.as_ptr(), user_data),
        Err(_) => on_head(head.status_code, ptr::null(), user_data),
    }
}

/// Drive the raw sequence of an exchange: head callback (may be NULL),
/// then a chunk callback per body fragment (may be NULL), then exactly one
/// completion callback. Returns 0 if the exchange was started, -1 on bad
/// arguments.
#[no_mangle]
pub extern "C" fn rivolo_connect(
    uri: *const c_char,
    on_head: Option<RivoloOnHead>,
    on_chunk: Option<RivoloOnChunk>,
    on_complete: RivoloOnComplete,
    user_data: *mut c_void,
) -> c_int {
    let uri = match ptr_to_str(uri) {
        Some(uri) => uri,
        None => return -1,
    };
    let user_data = SendableUserData(user_data);
    thread::spawn(move || {
        let user_data = user_data;
        let outcome = runtime().block_on(async {
            connect(uri.as_str())
                .reduce((), |_, event| {
                    let stop = match event {
                        Event::Head(head) => match on_head {
                            Some(on_head) => deliver_head(on_head, &head, user_data.0),
                            None => 0,
                        },
                        Event::Chunk(chunk) => match on_chunk {
                            Some(on_chunk) => {
                                on_chunk(chunk.as_ptr(), chunk.len() as size_t, user_data.0)
                            }
                            None => 0,
                        },
                    };
                    if stop != 0 {
                        Reduction::Reduced(())
                    } else {
                        Reduction::Continue(())
                    }
                })
                .await
        });
        complete(on_complete, outcome, user_data.0);
    });
    0
}

/// Read only the head of an exchange: the head callback fires at most
/// once, then completion. Returns 0 if started, -1 on bad arguments.
#[no_mangle]
pub extern "C" fn rivolo_read_head(
    uri: *const c_char,
    on_head: RivoloOnHead,
    on_complete: RivoloOnComplete,
    user_data: *mut c_void,
) -> c_int {
    let uri = match ptr_to_str(uri) {
        Some(uri) => uri,
        None => return -1,
    };
    let user_data = SendableUserData(user_data);
    thread::spawn(move || {
        let user_data = user_data;
        let outcome = runtime().block_on(async {
            rivolo_core::read_head(uri.as_str())
                .reduce((), |_, event| {
                    if let Event::Head(head) = event {
                        deliver_head(on_head, &head, user_data.0);
                    }
                    Reduction::Continue(())
                })
                .await
        });
        complete(on_complete, outcome, user_data.0);
    });
    0
}

/// Read the body of an exchange: one chunk callback per fragment, then
/// completion. Returns 0 if started, -1 on bad arguments.
#[no_mangle]
pub extern "C" fn rivolo_read_body(
    uri: *const c_char,
    on_chunk: RivoloOnChunk,
    on_complete: RivoloOnComplete,
    user_data: *mut c_void,
) -> c_int {
    let uri = match ptr_to_str(uri) {
        Some(uri) => uri,
        None => return -1,
    };
    let user_data = SendableUserData(user_data);
    thread::spawn(move || {
        let user_data = user_data;
        let outcome = runtime().block_on(async {
            read_body(uri.as_str())
                .reduce((), |_, chunk: String| {
                    let stop = on_chunk(chunk.as_ptr(), chunk.len() as size_t, user_data.0);
                    if stop != 0 {
                        Reduction::Reduced(())
                    } else {
                        Reduction::Continue(())
                    }
                })
                .await
        });
        complete(on_complete, outcome, user_data.0);
    });
    0
}

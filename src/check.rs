// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `hello-quad`.
//
// `hello-quad` is free software: you can redistribute it and/or modify it under the
// terms of either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
//   version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `hello-quad` is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR
// PURPOSE. See the GNU Lesser General Public License or the Mozilla Public License for more
// details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `hello-quad`. If not, see <https://www.gnu.org/licenses/>.

//! Checked driver calls.
//!
//! OpenGL reports failures through a global error queue instead of return values. [`checked`]
//! empties that queue, runs a call, then collects whatever the call raised.

use crate::driver::GraphicsDriver;
use crate::error::{error_name, ErrorCodes};
use crate::Error;

use std::panic::Location;

/// Upper bound on the codes drained at once; a lost context reports errors forever.
const MAX_DRAINED: usize = 16;

/// Run `f` against the driver and turn any error it raised into [`Error::Call`].
///
/// Codes left over from earlier, unchecked calls are discarded before `f` runs, so they are
/// never blamed on `call`.
#[track_caller]
pub fn checked<D, T>(driver: &D, call: &'static str, f: impl FnOnce(&D) -> T) -> Result<T, Error>
where
    D: GraphicsDriver + ?Sized,
{
    let location = Location::caller();

    let stale = drain(driver);
    if !stale.is_empty() {
        tracing::debug!("discarding stale driver errors before `{call}`: {stale}");
    }

    let value = f(driver);

    let codes = drain(driver);
    if codes.is_empty() {
        return Ok(value);
    }

    for code in &codes.0 {
        tracing::error!(
            "[OpenGL Error] ({code}) {} in `{call}` at {location}",
            error_name(*code)
        );
    }

    Err(Error::Call {
        call,
        location,
        codes,
    })
}

/// Pop pending error codes until the queue is empty.
pub fn drain<D: GraphicsDriver + ?Sized>(driver: &D) -> ErrorCodes {
    let mut codes = Vec::new();

    while codes.len() < MAX_DRAINED {
        match driver.next_error() {
            Some(code) => codes.push(code),
            None => break,
        }
    }

    ErrorCodes(codes)
}

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

//! The error type shared by every part of the crate.

use crate::frame::LoopState;
use crate::source::Stage;

use std::fmt;
use std::io;
use std::panic::Location;
use std::path::PathBuf;

/// An error that can occur while loading, building or drawing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A shader or configuration file could not be read.
    #[error("failed to read {}", .path.display())]
    Io {
        /// The path that was being read.
        path: PathBuf,

        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// A stage failed to compile.
    #[error("failed to compile {stage} shader: {log}")]
    Compile {
        /// The stage that failed.
        stage: Stage,

        /// The diagnostic log provided by the driver.
        log: String,
    },

    /// The program failed to link.
    #[error("failed to link shader program: {log}")]
    Link {
        /// The diagnostic log provided by the driver.
        log: String,
    },

    /// A uniform is not declared, or is optimized out, in the program.
    #[error("uniform `{name}` is not active in the shader program")]
    UniformNotFound {
        /// The name that was looked up.
        name: String,
    },

    /// A driver call raised one or more error codes.
    #[error("`{call}` at {location} raised {codes}")]
    Call {
        /// The name of the call.
        call: &'static str,

        /// Where the call was made.
        location: &'static Location<'static>,

        /// The raised codes, oldest first.
        codes: ErrorCodes,
    },

    /// The driver could not create an object.
    #[error("driver error: {0}")]
    Driver(String),

    /// The configuration file is malformed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// An operation was attempted in the wrong frame loop state.
    #[error("frame loop is {found:?}, expected {expected:?}")]
    InvalidState {
        /// The state the operation requires.
        expected: LoopState,

        /// The state the loop was in.
        found: LoopState,
    },
}

/// A list of raw driver error codes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorCodes(pub Vec<u32>);

impl ErrorCodes {
    /// Whether no code was raised.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ErrorCodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, code) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }

            write!(f, "{} (0x{:04X})", error_name(*code), code)?;
        }

        Ok(())
    }
}

/// Get the symbolic name of a driver error code.
pub fn error_name(code: u32) -> &'static str {
    match code {
        0x0500 => "GL_INVALID_ENUM",
        0x0501 => "GL_INVALID_VALUE",
        0x0502 => "GL_INVALID_OPERATION",
        0x0503 => "GL_STACK_OVERFLOW",
        0x0504 => "GL_STACK_UNDERFLOW",
        0x0505 => "GL_OUT_OF_MEMORY",
        0x0506 => "GL_INVALID_FRAMEBUFFER_OPERATION",
        0x0507 => "GL_CONTEXT_LOST",
        _ => "Unknown GL error",
    }
}

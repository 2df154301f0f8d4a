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

//! Building blocks for a minimal OpenGL program: parse a combined shader file, compile and
//! link it, upload a quad and draw it with an animated color.
//!
//! The crate never talks to OpenGL directly. Everything goes through the [`GraphicsDriver`]
//! trait, which is implemented for [`glow`] contexts by the `hello-quad-glow` crate.
//!
//! ```no_run
//! use hello_quad::{ShaderSource, Stage};
//!
//! let source = ShaderSource::from_path("res/shaders/Basic.shader")?;
//! println!("{}", source.stage(Stage::Fragment));
//! # Ok::<(), hello_quad::Error>(())
//! ```
//!
//! [`glow`]: https://crates.io/crates/glow

mod check;
mod config;
mod driver;
mod error;
mod frame;
mod mesh;
mod oscillator;
mod program;
mod source;

#[cfg(test)]
mod mock;

pub use check::{checked, drain};
pub use config::{Config, RenderConfig, WaveConfig, WindowConfig};
pub use driver::{BufferTarget, DrawCall, GraphicsDriver, VertexAttribute};
pub use error::{error_name, Error, ErrorCodes};
pub use frame::{FrameLoop, LoopState};
pub use mesh::{
    GpuMesh, Mesh, MeshKind, Vertex, POSITION_ATTRIBUTE, QUAD_INDICES, QUAD_VERTICES,
    TRIANGLE_VERTICES,
};
pub use oscillator::TriangleWave;
pub use program::{compile_shader, ShaderProgram};
pub use source::{ShaderSource, Stage};

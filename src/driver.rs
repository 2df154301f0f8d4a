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

//! Defines the graphics driver boundary for hello-quad.

use crate::source::Stage;

use std::fmt;

/// The backend that talks to the GPU.
///
/// Every method assumes that the underlying context is current. Implementations are expected
/// to map each method onto the corresponding OpenGL call without adding behavior of their own;
/// sequencing and error checking live in this crate.
pub trait GraphicsDriver {
    /// A compiled shader object.
    type Shader: Copy + fmt::Debug;

    /// A program object.
    type Program: Copy + fmt::Debug;

    /// The location of a uniform inside a linked program.
    type UniformLocation: fmt::Debug;

    /// A buffer object.
    type Buffer: Copy + fmt::Debug;

    /// A vertex array object.
    type VertexArray: Copy + fmt::Debug;

    /// Create an empty shader object for the given stage.
    fn create_shader(&self, stage: Stage) -> Result<Self::Shader, String>;

    /// Replace the source of a shader object.
    fn shader_source(&self, shader: Self::Shader, source: &str);

    /// Compile a shader object.
    fn compile_shader(&self, shader: Self::Shader);

    /// Whether the last compilation succeeded.
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;

    /// The diagnostic log of the last compilation.
    fn shader_info_log(&self, shader: Self::Shader) -> String;

    /// Delete a shader object.
    fn delete_shader(&self, shader: Self::Shader);

    /// Create an empty program object.
    fn create_program(&self) -> Result<Self::Program, String>;

    /// Attach a shader object to a program.
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);

    /// Detach a shader object from a program.
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);

    /// Link a program.
    fn link_program(&self, program: Self::Program);

    /// Whether the last link succeeded.
    fn program_link_status(&self, program: Self::Program) -> bool;

    /// Check whether a program can run in the current state.
    fn validate_program(&self, program: Self::Program);

    /// Whether the last validation succeeded.
    fn program_validate_status(&self, program: Self::Program) -> bool;

    /// The diagnostic log of the last link or validation.
    fn program_info_log(&self, program: Self::Program) -> String;

    /// Bind a program for drawing, or unbind with `None`.
    fn use_program(&self, program: Option<Self::Program>);

    /// Delete a program object.
    fn delete_program(&self, program: Self::Program);

    /// Look up an active uniform.
    fn uniform_location(&self, program: Self::Program, name: &str)
        -> Option<Self::UniformLocation>;

    /// Write a `vec4` uniform of the bound program.
    fn uniform_4_f32(&self, location: &Self::UniformLocation, value: [f32; 4]);

    /// Create a buffer object.
    fn create_buffer(&self) -> Result<Self::Buffer, String>;

    /// Bind a buffer to a target, or unbind with `None`.
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Self::Buffer>);

    /// Upload static data into the buffer bound to a target.
    fn buffer_data(&self, target: BufferTarget, data: &[u8]);

    /// Delete a buffer object.
    fn delete_buffer(&self, buffer: Self::Buffer);

    /// Create a vertex array object.
    fn create_vertex_array(&self) -> Result<Self::VertexArray, String>;

    /// Bind a vertex array, or unbind with `None`.
    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>);

    /// Delete a vertex array object.
    fn delete_vertex_array(&self, vertex_array: Self::VertexArray);

    /// Enable a vertex attribute and describe its layout in the bound array buffer.
    fn vertex_attribute(&self, attribute: &VertexAttribute);

    /// Clear the color buffer.
    fn clear(&self, color: [f32; 4]);

    /// Submit a draw call using the bound program and vertex array.
    fn draw(&self, call: DrawCall);

    /// Pop the oldest pending error code, if any.
    fn next_error(&self) -> Option<u32>;
}

/// The binding point of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Vertex data.
    Array,

    /// Index data.
    ElementArray,
}

/// The layout of a floating point vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// The attribute index in the vertex shader.
    pub index: u32,

    /// The number of `f32` components.
    pub components: i32,

    /// The distance in bytes between two vertices.
    pub stride: i32,

    /// The offset in bytes of the attribute inside a vertex.
    pub offset: i32,
}

/// A triangle draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCall {
    /// Draw `count` vertices in order.
    Arrays {
        /// The number of vertices.
        count: i32,
    },

    /// Draw `count` 32-bit indices from the bound element array buffer.
    Elements {
        /// The number of indices.
        count: i32,
    },
}

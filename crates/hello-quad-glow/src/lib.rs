// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `hello-quad-glow`.
//
// `hello-quad-glow` is free software: you can redistribute it and/or modify it under the
// terms of either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
//   version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `hello-quad-glow` is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR
// PURPOSE. See the GNU Lesser General Public License or the Mozilla Public License for more
// details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `hello-quad-glow`. If not, see <https://www.gnu.org/licenses/>.

//! A [`GraphicsDriver`] for `hello-quad` that uses the [`glow`] crate.
//!
//! [`glow`]: https://crates.io/crates/glow

use glow::HasContext;

use hello_quad::{BufferTarget, DrawCall, GraphicsDriver, Stage, VertexAttribute};

use std::ffi::{c_void, CStr, CString};
use std::fmt;
use std::ptr;

/// The error returned when a context cannot be used.
#[derive(Debug)]
pub struct GlError(String);

impl From<String> for GlError {
    fn from(s: String) -> Self {
        GlError(s)
    }
}

impl fmt::Display for GlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gl error: {}", self.0)
    }
}

impl std::error::Error for GlError {}

impl From<GlError> for hello_quad::Error {
    fn from(err: GlError) -> Self {
        hello_quad::Error::Driver(err.0)
    }
}

/// A wrapper around a [`glow`] context.
pub struct GlowDriver {
    /// The underlying context.
    context: glow::Context,

    /// Whether `glValidateProgram` was loaded.
    can_validate: bool,
}

impl fmt::Debug for GlowDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let version = self.context.version();

        f.debug_struct("GlowDriver")
            .field("major", &version.major)
            .field("minor", &version.minor)
            .field("is_embedded", &version.is_embedded)
            .field("can_validate", &self.can_validate)
            .finish_non_exhaustive()
    }
}

impl GlowDriver {
    /// Load OpenGL through `loader` and wrap the resulting context.
    ///
    /// # Safety
    ///
    /// The context `loader` belongs to must be current while calling this, and whenever the
    /// driver is used or dropped.
    pub unsafe fn from_loader_function_cstr<F>(mut loader: F) -> Result<Self, GlError>
    where
        F: FnMut(&CStr) -> *const c_void,
    {
        // glow has no entry point for program validation.
        gl::load_with(|name| match CString::new(name) {
            Ok(name) => loader(&name),
            Err(_) => ptr::null(),
        });

        let context = glow::Context::from_loader_function_cstr(|name| loader(name));
        Self::new(context)
    }

    /// Wrap an existing [`glow`] context.
    ///
    /// Program validation is only performed if the `gl` function pointers were loaded as well,
    /// as [`GlowDriver::from_loader_function_cstr`] does.
    ///
    /// # Safety
    ///
    /// The context must be current while calling this, and whenever the driver is used or
    /// dropped.
    pub unsafe fn new(context: glow::Context) -> Result<Self, GlError> {
        let version = context.version();
        tracing::info!("{}", context.get_parameter_string(glow::VERSION));

        if !has_supported_version(version.major, version.minor, version.is_embedded) {
            return Err(GlError(
                "OpenGL version 3.3 (or 3.0 ES) or higher is required".into(),
            ));
        }

        let can_validate = gl::ValidateProgram::is_loaded() && gl::GetProgramiv::is_loaded();
        if !can_validate {
            tracing::debug!("glValidateProgram is not loaded, programs will not be validated");
        }

        Ok(Self {
            context,
            can_validate,
        })
    }

    /// Get a reference to the underlying [`glow`] context.
    pub fn context(&self) -> &glow::Context {
        &self.context
    }

    /// Get a mutable reference to the underlying [`glow`] context.
    pub fn context_mut(&mut self) -> &mut glow::Context {
        &mut self.context
    }
}

impl GraphicsDriver for GlowDriver {
    type Shader = glow::NativeShader;
    type Program = glow::NativeProgram;
    type UniformLocation = glow::NativeUniformLocation;
    type Buffer = glow::NativeBuffer;
    type VertexArray = glow::NativeVertexArray;

    fn create_shader(&self, stage: Stage) -> Result<Self::Shader, String> {
        unsafe { self.context.create_shader(shader_type(stage)) }
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        unsafe { self.context.shader_source(shader, source) }
    }

    fn compile_shader(&self, shader: Self::Shader) {
        unsafe { self.context.compile_shader(shader) }
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { self.context.get_shader_compile_status(shader) }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { self.context.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { self.context.delete_shader(shader) }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { self.context.create_program() }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.context.attach_shader(program, shader) }
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.context.detach_shader(program, shader) }
    }

    fn link_program(&self, program: Self::Program) {
        unsafe { self.context.link_program(program) }
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        unsafe { self.context.get_program_link_status(program) }
    }

    fn validate_program(&self, program: Self::Program) {
        if self.can_validate {
            unsafe { gl::ValidateProgram(program.0.get()) }
        }
    }

    fn program_validate_status(&self, program: Self::Program) -> bool {
        if !self.can_validate {
            return true;
        }

        let mut status = 0;
        unsafe { gl::GetProgramiv(program.0.get(), gl::VALIDATE_STATUS, &mut status) };
        status != gl::FALSE as i32
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.context.get_program_info_log(program) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { self.context.use_program(program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { self.context.delete_program(program) }
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.context.get_uniform_location(program, name) }
    }

    fn uniform_4_f32(&self, location: &Self::UniformLocation, [x, y, z, w]: [f32; 4]) {
        unsafe { self.context.uniform_4_f32(Some(location), x, y, z, w) }
    }

    fn create_buffer(&self) -> Result<Self::Buffer, String> {
        unsafe { self.context.create_buffer() }
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Self::Buffer>) {
        unsafe { self.context.bind_buffer(buffer_target(target), buffer) }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8]) {
        unsafe {
            self.context
                .buffer_data_u8_slice(buffer_target(target), data, glow::STATIC_DRAW)
        }
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        unsafe { self.context.delete_buffer(buffer) }
    }

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String> {
        unsafe { self.context.create_vertex_array() }
    }

    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>) {
        unsafe { self.context.bind_vertex_array(vertex_array) }
    }

    fn delete_vertex_array(&self, vertex_array: Self::VertexArray) {
        unsafe { self.context.delete_vertex_array(vertex_array) }
    }

    fn vertex_attribute(&self, attribute: &VertexAttribute) {
        unsafe {
            self.context.enable_vertex_attrib_array(attribute.index);
            self.context.vertex_attrib_pointer_f32(
                attribute.index,
                attribute.components,
                glow::FLOAT,
                false,
                attribute.stride,
                attribute.offset,
            );
        }
    }

    fn clear(&self, [r, g, b, a]: [f32; 4]) {
        unsafe {
            self.context.clear_color(r, g, b, a);
            self.context.clear(glow::COLOR_BUFFER_BIT);
        }
    }

    fn draw(&self, call: DrawCall) {
        unsafe {
            match call {
                DrawCall::Arrays { count } => self.context.draw_arrays(glow::TRIANGLES, 0, count),
                DrawCall::Elements { count } => {
                    self.context
                        .draw_elements(glow::TRIANGLES, count, glow::UNSIGNED_INT, 0)
                }
            }
        }
    }

    fn next_error(&self) -> Option<u32> {
        match unsafe { self.context.get_error() } {
            glow::NO_ERROR => None,
            err => Some(err),
        }
    }
}

fn shader_type(stage: Stage) -> u32 {
    match stage {
        Stage::Vertex => glow::VERTEX_SHADER,
        Stage::Fragment => glow::FRAGMENT_SHADER,
    }
}

fn buffer_target(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Array => glow::ARRAY_BUFFER,
        BufferTarget::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
    }
}

/// Vertex array objects and `#version 330 core` need 3.3, or 3.0 on embedded profiles.
fn has_supported_version(major: u32, minor: u32, is_embedded: bool) -> bool {
    if is_embedded {
        major >= 3
    } else {
        major >= 4 || (major >= 3 && minor >= 3)
    }
}

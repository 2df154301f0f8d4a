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

//! A recording driver that stands in for a GPU in tests.

use crate::driver::{BufferTarget, DrawCall, GraphicsDriver, VertexAttribute};
use crate::source::Stage;

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug)]
struct MockShader {
    stage: Stage,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Debug, Default)]
struct MockProgram {
    attached: Vec<u32>,
    linked: bool,
    log: String,
    uniforms: Vec<String>,
}

#[derive(Debug, Default)]
struct State {
    next_id: u32,
    calls: Vec<&'static str>,
    shaders: HashMap<u32, MockShader>,
    programs: HashMap<u32, MockProgram>,
    buffers: HashSet<u32>,
    vertex_arrays: HashSet<u32>,
    bound_program: Option<u32>,
    uploads: Vec<(BufferTarget, Vec<u8>)>,
    attributes: Vec<VertexAttribute>,
    uniform_writes: Vec<(i32, [f32; 4])>,
    draws: Vec<DrawCall>,
    errors: VecDeque<u32>,
    inject: HashMap<&'static str, u32>,
    fail_create: HashSet<&'static str>,
    fail_validation: bool,
    context_lost: bool,
}

/// A driver that records every call and emulates just enough of GLSL to be useful.
///
/// A stage fails to compile when its source contains an `#error` directive. A program fails
/// to link unless both stages are attached and each one defines `main`. A uniform is active
/// when a line of a stage that was linked into the program starts with `uniform` and mentions
/// its name; the program keeps its uniforms after the stages are detached and deleted.
#[derive(Debug, Default)]
pub(crate) struct MockDriver {
    state: RefCell<State>,
}

impl MockDriver {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Raise `code` the next time `call` is made.
    pub(crate) fn inject_error(&self, call: &'static str, code: u32) {
        self.state.borrow_mut().inject.insert(call, code);
    }

    /// Queue an error code as if an earlier call had raised it.
    pub(crate) fn push_error(&self, code: u32) {
        self.state.borrow_mut().errors.push_back(code);
    }

    /// Make the object creation `call` fail.
    pub(crate) fn fail_create(&self, call: &'static str) {
        self.state.borrow_mut().fail_create.insert(call);
    }

    pub(crate) fn fail_validation(&self) {
        self.state.borrow_mut().fail_validation = true;
    }

    /// Report `GL_CONTEXT_LOST` forever.
    pub(crate) fn lose_context(&self) {
        self.state.borrow_mut().context_lost = true;
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.state.borrow().calls.clone()
    }

    pub(crate) fn count(&self, call: &str) -> usize {
        self.state.borrow().calls.iter().filter(|c| **c == call).count()
    }

    pub(crate) fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub(crate) fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub(crate) fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub(crate) fn live_vertex_arrays(&self) -> usize {
        self.state.borrow().vertex_arrays.len()
    }

    pub(crate) fn bound_program(&self) -> Option<u32> {
        self.state.borrow().bound_program
    }

    pub(crate) fn attached(&self, program: u32) -> Vec<u32> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.attached.clone())
            .unwrap_or_default()
    }

    pub(crate) fn uploads(&self) -> Vec<(BufferTarget, Vec<u8>)> {
        self.state.borrow().uploads.clone()
    }

    pub(crate) fn attributes(&self) -> Vec<VertexAttribute> {
        self.state.borrow().attributes.clone()
    }

    pub(crate) fn uniform_writes(&self) -> Vec<(i32, [f32; 4])> {
        self.state.borrow().uniform_writes.clone()
    }

    pub(crate) fn draws(&self) -> Vec<DrawCall> {
        self.state.borrow().draws.clone()
    }

    fn record(&self, call: &'static str) {
        let mut state = self.state.borrow_mut();
        state.calls.push(call);
        if let Some(code) = state.inject.remove(call) {
            state.errors.push_back(code);
        }
    }

    fn allocate(&self, call: &'static str) -> Result<u32, String> {
        self.record(call);
        let mut state = self.state.borrow_mut();
        if state.fail_create.contains(call) {
            return Err(format!("{call} failed: out of handles"));
        }

        state.next_id += 1;
        Ok(state.next_id)
    }
}

impl GraphicsDriver for MockDriver {
    type Shader = u32;
    type Program = u32;
    type UniformLocation = i32;
    type Buffer = u32;
    type VertexArray = u32;

    fn create_shader(&self, stage: Stage) -> Result<u32, String> {
        let id = self.allocate("create_shader")?;
        self.state.borrow_mut().shaders.insert(
            id,
            MockShader {
                stage,
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );
        Ok(id)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        self.record("shader_source");
        if let Some(shader) = self.state.borrow_mut().shaders.get_mut(&shader) {
            shader.source = source.to_owned();
        }
    }

    fn compile_shader(&self, shader: u32) {
        self.record("compile_shader");
        if let Some(shader) = self.state.borrow_mut().shaders.get_mut(&shader) {
            let failing = shader
                .source
                .lines()
                .enumerate()
                .find(|(_, line)| line.trim_start().starts_with("#error"));

            match failing {
                Some((number, line)) => {
                    shader.compiled = false;
                    shader.log = format!(
                        "ERROR: 0:{}: '#error' : {}",
                        number + 1,
                        line.trim_start().trim_start_matches("#error").trim()
                    );
                }
                None => {
                    shader.compiled = true;
                    shader.log.clear();
                }
            }
        }
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.record("shader_compile_status");
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map_or(false, |s| s.compiled)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        self.record("shader_info_log");
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: u32) {
        self.record("delete_shader");
        self.state.borrow_mut().shaders.remove(&shader);
    }

    fn create_program(&self) -> Result<u32, String> {
        let id = self.allocate("create_program")?;
        self.state
            .borrow_mut()
            .programs
            .insert(id, MockProgram::default());
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        self.record("attach_shader");
        if let Some(program) = self.state.borrow_mut().programs.get_mut(&program) {
            program.attached.push(shader);
        }
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        self.record("detach_shader");
        if let Some(program) = self.state.borrow_mut().programs.get_mut(&program) {
            program.attached.retain(|s| *s != shader);
        }
    }

    fn link_program(&self, program: u32) {
        self.record("link_program");
        let mut state = self.state.borrow_mut();
        let State {
            shaders, programs, ..
        } = &mut *state;

        if let Some(program) = programs.get_mut(&program) {
            let stages = program
                .attached
                .iter()
                .filter_map(|id| shaders.get(id))
                .filter(|s| s.compiled)
                .collect::<Vec<_>>();

            let missing = Stage::ALL
                .into_iter()
                .find(|stage| !stages.iter().any(|s| s.stage == *stage));
            let no_main = stages.iter().find(|s| !s.source.contains("void main"));

            // Active uniforms belong to the linked program, not to its stages.
            let uniforms = stages
                .iter()
                .flat_map(|s| s.source.lines())
                .map(str::trim)
                .filter(|line| line.starts_with("uniform"))
                .map(str::to_owned)
                .collect::<Vec<_>>();

            program.linked = false;
            program.uniforms.clear();
            program.log = match (missing, no_main) {
                (Some(stage), _) => format!("error: no {stage} shader attached"),
                (None, Some(shader)) => {
                    format!("error: {} shader lacks `main` function", shader.stage)
                }
                (None, None) => {
                    program.linked = true;
                    program.uniforms = uniforms;
                    String::new()
                }
            };
        }
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.record("program_link_status");
        self.state
            .borrow()
            .programs
            .get(&program)
            .map_or(false, |p| p.linked)
    }

    fn validate_program(&self, program: u32) {
        self.record("validate_program");
        let mut state = self.state.borrow_mut();
        let fail = state.fail_validation;
        if let Some(program) = state.programs.get_mut(&program) {
            if fail {
                program.log = "validation failed: no vertex array bound".into();
            }
        }
    }

    fn program_validate_status(&self, program: u32) -> bool {
        self.record("program_validate_status");
        let state = self.state.borrow();
        !state.fail_validation && state.programs.get(&program).map_or(false, |p| p.linked)
    }

    fn program_info_log(&self, program: u32) -> String {
        self.record("program_info_log");
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn use_program(&self, program: Option<u32>) {
        self.record("use_program");
        self.state.borrow_mut().bound_program = program;
    }

    fn delete_program(&self, program: u32) {
        self.record("delete_program");
        let mut state = self.state.borrow_mut();
        state.programs.remove(&program);
        if state.bound_program == Some(program) {
            state.bound_program = None;
        }
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<i32> {
        self.record("uniform_location");
        let state = self.state.borrow();
        let program = state.programs.get(&program).filter(|p| p.linked)?;

        program
            .uniforms
            .iter()
            .position(|line| line.contains(name))
            .map(|index| index as i32 + 1)
    }

    fn uniform_4_f32(&self, location: &i32, value: [f32; 4]) {
        self.record("uniform_4_f32");
        self.state
            .borrow_mut()
            .uniform_writes
            .push((*location, value));
    }

    fn create_buffer(&self) -> Result<u32, String> {
        let id = self.allocate("create_buffer")?;
        self.state.borrow_mut().buffers.insert(id);
        Ok(id)
    }

    fn bind_buffer(&self, _target: BufferTarget, _buffer: Option<u32>) {
        self.record("bind_buffer");
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8]) {
        self.record("buffer_data");
        self.state
            .borrow_mut()
            .uploads
            .push((target, data.to_vec()));
    }

    fn delete_buffer(&self, buffer: u32) {
        self.record("delete_buffer");
        self.state.borrow_mut().buffers.remove(&buffer);
    }

    fn create_vertex_array(&self) -> Result<u32, String> {
        let id = self.allocate("create_vertex_array")?;
        self.state.borrow_mut().vertex_arrays.insert(id);
        Ok(id)
    }

    fn bind_vertex_array(&self, _vertex_array: Option<u32>) {
        self.record("bind_vertex_array");
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        self.record("delete_vertex_array");
        self.state.borrow_mut().vertex_arrays.remove(&vertex_array);
    }

    fn vertex_attribute(&self, attribute: &VertexAttribute) {
        self.record("vertex_attribute");
        self.state.borrow_mut().attributes.push(*attribute);
    }

    fn clear(&self, _color: [f32; 4]) {
        self.record("clear");
    }

    fn draw(&self, call: DrawCall) {
        self.record("draw");
        self.state.borrow_mut().draws.push(call);
    }

    fn next_error(&self) -> Option<u32> {
        let mut state = self.state.borrow_mut();
        if state.context_lost {
            return Some(0x0507);
        }

        state.errors.pop_front()
    }
}

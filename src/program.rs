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

//! Compiling and linking shader programs.

use crate::driver::GraphicsDriver;
use crate::source::{ShaderSource, Stage};
use crate::Error;

use std::fmt;
use std::mem;

/// A linked and validated shader program.
///
/// The program is not deleted on drop, since that needs the driver; call
/// [`ShaderProgram::delete`] at shutdown.
pub struct ShaderProgram<D: GraphicsDriver + ?Sized> {
    program: D::Program,
}

impl<D: GraphicsDriver + ?Sized> fmt::Debug for ShaderProgram<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("program", &self.program)
            .finish()
    }
}

impl<D: GraphicsDriver + ?Sized> ShaderProgram<D> {
    /// Build a program from the stages of a parsed shader file.
    pub fn from_source(driver: &D, source: &ShaderSource) -> Result<Self, Error> {
        Self::build(driver, source.vertex(), source.fragment())
    }

    /// Compile both stages, then link and validate them into a program.
    ///
    /// Both intermediate shader objects are deleted before returning, whether or not the
    /// build succeeded. A stage that fails to compile is never attached.
    pub fn build(driver: &D, vertex: &str, fragment: &str) -> Result<Self, Error> {
        let vertex = compile_shader(driver, Stage::Vertex, vertex)?;
        let _delete_vertex = CallOnDrop(|| driver.delete_shader(vertex));

        let fragment = compile_shader(driver, Stage::Fragment, fragment)?;
        let _delete_fragment = CallOnDrop(|| driver.delete_shader(fragment));

        let program = driver.create_program().map_err(Error::Driver)?;
        let delete_program = CallOnDrop(|| driver.delete_program(program));

        driver.attach_shader(program, vertex);
        driver.attach_shader(program, fragment);
        let _detach = CallOnDrop(|| {
            driver.detach_shader(program, vertex);
            driver.detach_shader(program, fragment);
        });

        driver.link_program(program);
        if !driver.program_link_status(program) {
            let log = driver.program_info_log(program);
            tracing::error!("Failed to link shader program.\n{log}");
            return Err(Error::Link { log });
        }

        driver.validate_program(program);
        if !driver.program_validate_status(program) {
            let log = driver.program_info_log(program);
            tracing::warn!("shader program failed validation: {log}");
        }

        mem::forget(delete_program);
        tracing::debug!("linked shader program {program:?}");
        Ok(Self { program })
    }

    /// The raw program handle.
    pub fn handle(&self) -> D::Program {
        self.program
    }

    /// Bind this program for drawing.
    pub fn bind(&self, driver: &D) {
        driver.use_program(Some(self.program));
    }

    /// Look up an active uniform by name.
    pub fn uniform_location(&self, driver: &D, name: &str) -> Result<D::UniformLocation, Error> {
        driver
            .uniform_location(self.program, name)
            .ok_or_else(|| Error::UniformNotFound { name: name.into() })
    }

    /// Unbind and delete the program.
    pub fn delete(self, driver: &D) {
        driver.use_program(None);
        driver.delete_program(self.program);
        tracing::debug!("deleted shader program {:?}", self.program);
    }
}

/// Compile one stage, returning the shader object only if compilation succeeded.
pub fn compile_shader<D: GraphicsDriver + ?Sized>(
    driver: &D,
    stage: Stage,
    source: &str,
) -> Result<D::Shader, Error> {
    let shader = driver.create_shader(stage).map_err(Error::Driver)?;
    let call_on_drop = CallOnDrop(|| driver.delete_shader(shader));

    driver.shader_source(shader, source);
    driver.compile_shader(shader);

    if !driver.shader_compile_status(shader) {
        let log = driver.shader_info_log(shader);
        tracing::error!("Failed to compile {stage} shader.\n{log}");
        return Err(Error::Compile { stage, log });
    }

    mem::forget(call_on_drop);
    Ok(shader)
}

struct CallOnDrop<F: FnMut()>(F);

impl<F: FnMut()> Drop for CallOnDrop<F> {
    fn drop(&mut self) {
        (self.0)();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDriver;

    const VERTEX: &str = "\
#version 330 core
layout(location = 0) in vec4 position;
void main() { gl_Position = position; }
";

    const FRAGMENT: &str = "\
#version 330 core
uniform vec4 u_Color;
out vec4 color;
void main() { color = u_Color; }
";

    #[test]
    fn builds_linked_program() {
        let driver = MockDriver::new();
        let program = ShaderProgram::build(&driver, VERTEX, FRAGMENT).unwrap();

        assert_ne!(program.handle(), 0);
        assert_ne!(program.uniform_location(&driver, "u_Color").unwrap(), 0);

        // Intermediate shaders are detached and released.
        assert_eq!(driver.live_shaders(), 0);
        assert!(driver.attached(program.handle()).is_empty());
        assert_eq!(driver.live_programs(), 1);
    }

    #[test]
    fn steps_run_in_order() {
        let driver = MockDriver::new();
        ShaderProgram::build(&driver, VERTEX, FRAGMENT).unwrap();

        let calls = driver.calls();
        let position = |name: &str| calls.iter().position(|c| *c == name).unwrap();
        let last = |name: &str| calls.iter().rposition(|c| *c == name).unwrap();

        assert!(last("create_shader") < position("create_program"));
        assert!(position("create_program") < position("attach_shader"));
        assert!(last("attach_shader") < position("link_program"));
        assert!(position("link_program") < position("validate_program"));
        assert!(position("validate_program") < position("delete_shader"));
        assert_eq!(driver.count("delete_shader"), 2);
    }

    #[test]
    fn vertex_compile_error_is_reported() {
        let driver = MockDriver::new();
        let broken = "#version 330 core\n#error unexpected token\nvoid main() {}\n";

        match ShaderProgram::build(&driver, broken, FRAGMENT) {
            Err(Error::Compile { stage, log }) => {
                assert_eq!(stage, Stage::Vertex);
                assert!(log.contains("unexpected token"), "log was {log:?}");
                assert!(Error::Compile { stage, log }
                    .to_string()
                    .contains("vertex"));
            }
            other => panic!("expected a compile error, got {other:?}"),
        }

        // Nothing was attached, linked or leaked.
        assert_eq!(driver.count("create_program"), 0);
        assert_eq!(driver.count("attach_shader"), 0);
        assert_eq!(driver.live_shaders(), 0);
        assert_eq!(driver.live_programs(), 0);
    }

    #[test]
    fn fragment_compile_error_releases_vertex_shader() {
        let driver = MockDriver::new();

        let err = ShaderProgram::build(&driver, VERTEX, "#error nope\n").unwrap_err();
        assert!(matches!(err, Error::Compile { stage: Stage::Fragment, .. }));
        assert_eq!(driver.live_shaders(), 0);
        assert_eq!(driver.count("delete_shader"), 2);
    }

    #[test]
    fn empty_fragment_fails_at_link() {
        let driver = MockDriver::new();
        let source = ShaderSource::parse(&format!("#shader vertex\n{VERTEX}"));

        match ShaderProgram::from_source(&driver, &source) {
            Err(Error::Link { log }) => assert!(log.contains("fragment"), "log was {log:?}"),
            other => panic!("expected a link error, got {other:?}"),
        }

        assert_eq!(driver.live_shaders(), 0);
        assert_eq!(driver.live_programs(), 0);
    }

    #[test]
    fn validation_failure_is_not_fatal() {
        let driver = MockDriver::new();
        driver.fail_validation();

        let program = ShaderProgram::build(&driver, VERTEX, FRAGMENT).unwrap();
        assert_eq!(driver.count("program_info_log"), 1);
        program.delete(&driver);
        assert_eq!(driver.live_programs(), 0);
    }

    #[test]
    fn driver_refusing_objects() {
        let driver = MockDriver::new();
        driver.fail_create("create_program");

        let err = ShaderProgram::build(&driver, VERTEX, FRAGMENT).unwrap_err();
        assert!(matches!(err, Error::Driver(_)));
        assert_eq!(driver.live_shaders(), 0);
    }

    #[test]
    fn uniform_survives_stage_deletion() {
        let driver = MockDriver::new();
        let program = ShaderProgram::build(
            &driver,
            "void main() {}\n",
            "uniform vec4 u_Color;\nvoid main() {}\n",
        )
        .unwrap();

        assert_eq!(driver.live_shaders(), 0);
        assert!(driver.attached(program.handle()).is_empty());
        assert_eq!(program.uniform_location(&driver, "u_Color").unwrap(), 1);
    }

    #[test]
    fn validation_log_is_fetched_without_subscriber() {
        let driver = MockDriver::new();
        driver.fail_validation();

        ShaderProgram::build(&driver, VERTEX, FRAGMENT).unwrap();
        let calls = driver.calls();
        let status = calls
            .iter()
            .position(|c| *c == "program_validate_status")
            .unwrap();
        assert_eq!(calls[status + 1], "program_info_log");
    }

    #[test]
    fn unknown_uniform() {
        let driver = MockDriver::new();
        let program = ShaderProgram::build(&driver, VERTEX, FRAGMENT).unwrap();

        match program.uniform_location(&driver, "u_Missing") {
            Err(Error::UniformNotFound { name }) => assert_eq!(name, "u_Missing"),
            other => panic!("expected a missing uniform, got {other:?}"),
        }
    }

    #[test]
    fn delete_unbinds() {
        let driver = MockDriver::new();
        let program = ShaderProgram::build(&driver, VERTEX, FRAGMENT).unwrap();
        program.bind(&driver);
        assert_eq!(driver.bound_program(), Some(program.handle()));

        program.delete(&driver);
        assert_eq!(driver.bound_program(), None);
    }
}

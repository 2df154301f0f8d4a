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

//! The per-frame state machine.
//!
//! The windowing layer owns the event loop and the surface. It drives a [`FrameLoop`] through
//! three calls: [`FrameLoop::initialize`] once the context is current,
//! [`FrameLoop::frame`] before every present, and [`FrameLoop::shutdown`] when the window is
//! asked to close.

use crate::check::checked;
use crate::config::RenderConfig;
use crate::driver::GraphicsDriver;
use crate::mesh::{GpuMesh, Mesh};
use crate::oscillator::TriangleWave;
use crate::program::ShaderProgram;
use crate::source::ShaderSource;
use crate::Error;

/// Where a [`FrameLoop`] is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopState {
    /// GPU resources have not been created yet.
    Initializing,

    /// Frames can be drawn.
    Running,

    /// GPU resources have been released.
    ShuttingDown,
}

/// GPU objects owned while running.
struct Resources<D: GraphicsDriver + ?Sized> {
    program: ShaderProgram<D>,
    color: D::UniformLocation,
    mesh: GpuMesh<D>,
}

/// Draws the animated mesh, one frame per call.
pub struct FrameLoop<D: GraphicsDriver + ?Sized> {
    /// What to draw.
    config: RenderConfig,

    /// The current state.
    state: LoopState,

    /// GPU objects, present only while running.
    resources: Option<Resources<D>>,

    /// The red channel animation.
    wave: TriangleWave,

    /// Number of frames drawn.
    frames: u64,
}

impl<D: GraphicsDriver + ?Sized> FrameLoop<D> {
    /// Create a loop in the [`LoopState::Initializing`] state.
    pub fn new(config: RenderConfig) -> Self {
        Self {
            wave: TriangleWave::from(&config.wave),
            config,
            state: LoopState::Initializing,
            resources: None,
            frames: 0,
        }
    }

    /// The current state.
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Number of frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// The value the next frame will write into the red channel.
    pub fn wave(&self) -> &TriangleWave {
        &self.wave
    }

    /// Upload the mesh, build the program and bind it.
    ///
    /// On failure the loop releases whatever it created and stays in
    /// [`LoopState::Initializing`].
    pub fn initialize(&mut self, driver: &D, source: &ShaderSource) -> Result<(), Error> {
        self.expect_state(LoopState::Initializing)?;

        let mesh = GpuMesh::upload(driver, &Mesh::builtin(self.config.mesh))?;
        let program = match ShaderProgram::from_source(driver, source) {
            Ok(program) => program,
            Err(err) => {
                mesh.delete(driver);
                return Err(err);
            }
        };

        let color = match self.bind_color(driver, &program) {
            Ok(color) => color,
            Err(err) => {
                program.delete(driver);
                mesh.delete(driver);
                return Err(err);
            }
        };

        self.resources = Some(Resources {
            program,
            color,
            mesh,
        });
        self.state = LoopState::Running;
        tracing::debug!("frame loop running");

        Ok(())
    }

    fn bind_color(
        &self,
        driver: &D,
        program: &ShaderProgram<D>,
    ) -> Result<D::UniformLocation, Error> {
        checked(driver, "use_program", |d| program.bind(d))?;

        let color = program.uniform_location(driver, &self.config.uniform)?;
        checked(driver, "uniform_4_f32", |d| {
            d.uniform_4_f32(&color, self.config.color)
        })?;

        Ok(color)
    }

    /// Draw one frame and advance the animation.
    ///
    /// Returns the red channel value that was drawn. Presenting the frame is up to the caller.
    pub fn frame(&mut self, driver: &D) -> Result<f32, Error> {
        self.expect_state(LoopState::Running)?;
        let resources = match &self.resources {
            Some(resources) => resources,
            None => {
                return Err(Error::InvalidState {
                    expected: LoopState::Running,
                    found: self.state,
                })
            }
        };

        driver.clear(self.config.clear_color);

        let red = self.wave.value();
        let [_, g, b, a] = self.config.color;
        checked(driver, "uniform_4_f32", |d| {
            d.uniform_4_f32(&resources.color, [red, g, b, a])
        })?;
        resources.mesh.draw(driver)?;

        self.wave.advance();
        self.frames += 1;

        Ok(red)
    }

    /// Release GPU objects and stop.
    ///
    /// Safe to call in any state, and more than once.
    pub fn shutdown(&mut self, driver: &D) {
        if let Some(resources) = self.resources.take() {
            resources.program.delete(driver);
            resources.mesh.delete(driver);
            tracing::debug!("frame loop stopped after {} frames", self.frames);
        }

        self.state = LoopState::ShuttingDown;
    }

    fn expect_state(&self, expected: LoopState) -> Result<(), Error> {
        if self.state == expected {
            Ok(())
        } else {
            Err(Error::InvalidState {
                expected,
                found: self.state,
            })
        }
    }
}

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

//! Vertex data and its upload to the GPU.

use crate::check::checked;
use crate::driver::{BufferTarget, DrawCall, GraphicsDriver, VertexAttribute};
use crate::Error;

use serde::Deserialize;

use std::fmt;
use std::mem;

/// A vertex with a 2D position.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Vertex {
    /// Position in normalized device coordinates.
    pub position: [f32; 2],
}

const fn vertex(x: f32, y: f32) -> Vertex {
    Vertex { position: [x, y] }
}

/// The quad, drawn with an index buffer.
pub const QUAD_VERTICES: [Vertex; 4] = [
    vertex(-0.5, -0.5),
    vertex(0.5, -0.5),
    vertex(0.5, 0.5),
    vertex(-0.5, 0.5),
];

/// Two triangles covering [`QUAD_VERTICES`].
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

/// A single triangle, drawn without indices.
pub const TRIANGLE_VERTICES: [Vertex; 3] = [vertex(-0.5, -0.5), vertex(0.0, 0.5), vertex(0.5, -0.5)];

/// The shape to draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeshKind {
    /// An indexed quad.
    #[default]
    Quad,

    /// A non-indexed triangle.
    Triangle,
}

/// CPU-side geometry.
#[derive(Debug, Clone, Copy)]
pub struct Mesh<'a> {
    /// The vertices.
    pub vertices: &'a [Vertex],

    /// The indices, if the mesh is drawn indexed.
    pub indices: Option<&'a [u32]>,
}

impl Mesh<'static> {
    /// Get one of the built-in meshes.
    pub fn builtin(kind: MeshKind) -> Self {
        match kind {
            MeshKind::Quad => Mesh {
                vertices: &QUAD_VERTICES,
                indices: Some(&QUAD_INDICES),
            },
            MeshKind::Triangle => Mesh {
                vertices: &TRIANGLE_VERTICES,
                indices: None,
            },
        }
    }
}

impl Mesh<'_> {
    /// The draw call that renders this mesh.
    pub fn draw_call(&self) -> DrawCall {
        match self.indices {
            Some(indices) => DrawCall::Elements {
                count: indices.len() as i32,
            },
            None => DrawCall::Arrays {
                count: self.vertices.len() as i32,
            },
        }
    }
}

/// The layout of [`Vertex`] at attribute 0.
pub const POSITION_ATTRIBUTE: VertexAttribute = VertexAttribute {
    index: 0,
    components: 2,
    stride: mem::size_of::<Vertex>() as i32,
    offset: 0,
};

/// A mesh living in GPU buffers.
pub struct GpuMesh<D: GraphicsDriver + ?Sized> {
    /// The vertex array object.
    vao: D::VertexArray,

    /// The vertex buffer.
    vbo: D::Buffer,

    /// The index buffer, for indexed meshes.
    ibo: Option<D::Buffer>,

    /// How to draw the contents.
    draw_call: DrawCall,
}

impl<D: GraphicsDriver + ?Sized> fmt::Debug for GpuMesh<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuMesh")
            .field("vao", &self.vao)
            .field("vbo", &self.vbo)
            .field("ibo", &self.ibo)
            .field("draw_call", &self.draw_call)
            .finish()
    }
}

impl<D: GraphicsDriver + ?Sized> GpuMesh<D> {
    /// Upload a mesh.
    ///
    /// The vertex array stays bound afterward, along with the buffers it captured. On failure
    /// every object created so far is deleted.
    pub fn upload(driver: &D, mesh: &Mesh<'_>) -> Result<Self, Error> {
        let vao = driver.create_vertex_array().map_err(Error::Driver)?;
        let mut partial = Partial {
            driver,
            vao: Some(vao),
            buffers: Vec::with_capacity(2),
        };

        checked(driver, "bind_vertex_array", |d| d.bind_vertex_array(Some(vao)))?;

        // Vertex buffer and its layout.
        let vbo = driver.create_buffer().map_err(Error::Driver)?;
        partial.buffers.push(vbo);
        checked(driver, "bind_buffer", |d| {
            d.bind_buffer(BufferTarget::Array, Some(vbo))
        })?;
        checked(driver, "buffer_data", |d| {
            d.buffer_data(BufferTarget::Array, bytemuck::cast_slice(mesh.vertices))
        })?;
        checked(driver, "vertex_attribute", |d| {
            d.vertex_attribute(&POSITION_ATTRIBUTE)
        })?;

        // Index buffer.
        let ibo = match mesh.indices {
            Some(indices) => {
                let ibo = driver.create_buffer().map_err(Error::Driver)?;
                partial.buffers.push(ibo);
                checked(driver, "bind_buffer", |d| {
                    d.bind_buffer(BufferTarget::ElementArray, Some(ibo))
                })?;
                checked(driver, "buffer_data", |d| {
                    d.buffer_data(BufferTarget::ElementArray, bytemuck::cast_slice(indices))
                })?;
                Some(ibo)
            }
            None => None,
        };

        partial.vao = None;
        partial.buffers.clear();

        Ok(Self {
            vao,
            vbo,
            ibo,
            draw_call: mesh.draw_call(),
        })
    }

    /// Bind the vertex array and submit the draw call.
    pub fn draw(&self, driver: &D) -> Result<(), Error> {
        checked(driver, "bind_vertex_array", |d| {
            d.bind_vertex_array(Some(self.vao))
        })?;
        checked(driver, "draw", |d| d.draw(self.draw_call))
    }

    /// The draw call used by [`GpuMesh::draw`].
    pub fn draw_call(&self) -> DrawCall {
        self.draw_call
    }

    /// Delete the GPU objects.
    pub fn delete(self, driver: &D) {
        driver.bind_vertex_array(None);
        driver.delete_vertex_array(self.vao);
        driver.delete_buffer(self.vbo);
        if let Some(ibo) = self.ibo {
            driver.delete_buffer(ibo);
        }
    }
}

/// Objects of an upload in progress, deleted unless the upload completes.
struct Partial<'a, D: GraphicsDriver + ?Sized> {
    driver: &'a D,
    vao: Option<D::VertexArray>,
    buffers: Vec<D::Buffer>,
}

impl<D: GraphicsDriver + ?Sized> Drop for Partial<'_, D> {
    fn drop(&mut self) {
        for buffer in self.buffers.drain(..) {
            self.driver.delete_buffer(buffer);
        }

        if let Some(vao) = self.vao.take() {
            self.driver.bind_vertex_array(None);
            self.driver.delete_vertex_array(vao);
        }
    }
}

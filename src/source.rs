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

//! Parsing of combined shader files.
//!
//! A combined shader file holds both stages of a program. Each stage starts at a marker line
//! containing `#shader` and a stage keyword:
//!
//! ```text
//! #shader vertex
//! #version 330 core
//! ...
//! #shader fragment
//! #version 330 core
//! ...
//! ```
//!
//! Everything between one marker and the next belongs to the stage named by the first marker.
//! Lines before the first marker are dropped.

use crate::Error;

use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// The token that marks the start of a new section.
const MARKER: &str = "#shader";

/// One of the two compilation units of a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// The vertex stage.
    Vertex,

    /// The fragment stage.
    Fragment,
}

impl Stage {
    /// Both stages, in the order they are built.
    pub const ALL: [Stage; 2] = [Stage::Vertex, Stage::Fragment];

    /// The keyword that names this stage on a marker line.
    pub fn keyword(self) -> &'static str {
        match self {
            Stage::Vertex => "vertex",
            Stage::Fragment => "fragment",
        }
    }

    /// Figure out which stage a marker line refers to.
    fn from_marker(line: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|stage| line.contains(stage.keyword()))
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// The source text of both stages of a program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderSource {
    /// Source of the vertex stage.
    vertex: String,

    /// Source of the fragment stage.
    fragment: String,
}

impl ShaderSource {
    /// Create a shader source from already separated stages.
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// Split the text of a combined shader file into its stages.
    ///
    /// Every line kept is terminated with `\n`, whatever terminator it had in the input. A
    /// missing section yields an empty string rather than an error; the driver reports the
    /// problem when the empty stage is compiled.
    pub fn parse(text: &str) -> Self {
        let mut source = Self::default();

        // `None` discards lines until the first recognized marker.
        let mut active: Option<Stage> = None;

        for line in text.lines() {
            if line.contains(MARKER) {
                match Stage::from_marker(line) {
                    Some(stage) => active = Some(stage),
                    None => tracing::warn!("ignoring shader marker without a stage: {line:?}"),
                }

                continue;
            }

            if let Some(stage) = active {
                let buffer = source.buffer_mut(stage);
                buffer.push_str(line);
                buffer.push('\n');
            }
        }

        source
    }

    /// Read and split a combined shader file from a reader.
    ///
    /// Bytes that are not valid UTF-8 are replaced with `U+FFFD` instead of failing the read.
    pub fn from_reader(mut reader: impl Read) -> io::Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(Self::parse(&String::from_utf8_lossy(&bytes)))
    }

    /// Read and split a combined shader file from the filesystem.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();

        let source = fs::File::open(path)
            .and_then(Self::from_reader)
            .map_err(|source| Error::Io {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::debug!(
            "parsed {}: {} vertex bytes, {} fragment bytes",
            path.display(),
            source.vertex.len(),
            source.fragment.len()
        );

        Ok(source)
    }

    /// The vertex stage source.
    pub fn vertex(&self) -> &str {
        &self.vertex
    }

    /// The fragment stage source.
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// The source of the given stage.
    pub fn stage(&self, stage: Stage) -> &str {
        match stage {
            Stage::Vertex => &self.vertex,
            Stage::Fragment => &self.fragment,
        }
    }

    fn buffer_mut(&mut self, stage: Stage) -> &mut String {
        match stage {
            Stage::Vertex => &mut self.vertex,
            Stage::Fragment => &mut self.fragment,
        }
    }
}

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

//! Configuration, read from TOML.
//!
//! Every field is optional. The defaults reproduce the plain "Hello Quad": a 640x480 window
//! with vsync, `res/shaders/Basic.shader`, and a magenta quad whose red channel pulses.

use crate::mesh::MeshKind;
use crate::Error;

use serde::Deserialize;

use std::fs;
use std::path::{Path, PathBuf};

/// The top level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,

    /// Path of the combined shader file.
    pub shader: PathBuf,

    /// What to draw.
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            shader: PathBuf::from("res/shaders/Basic.shader"),
            render: RenderConfig::default(),
        }
    }
}

impl Config {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        Ok(toml::from_str(text)?)
    }

    /// Read a configuration file.
    ///
    /// A relative shader path is resolved against the directory of the configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_toml_str(&text)?;
        if config.shader.is_relative() {
            if let Some(dir) = path.parent() {
                config.shader = dir.join(&config.shader);
            }
        }

        tracing::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }
}

/// Window settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    /// The window title.
    pub title: String,

    /// Initial width in logical pixels.
    pub width: u32,

    /// Initial height in logical pixels.
    pub height: u32,

    /// Wait for one vertical blank per presented frame.
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Hello World".into(),
            width: 640,
            height: 480,
            vsync: true,
        }
    }
}

/// Settings for the drawn scene.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// The shape to draw.
    pub mesh: MeshKind,

    /// The `vec4` color uniform declared by the fragment stage.
    pub uniform: String,

    /// The color written to the uniform; the red channel is replaced by the wave.
    pub color: [f32; 4],

    /// The color the frame is cleared to.
    pub clear_color: [f32; 4],

    /// The red channel animation.
    pub wave: WaveConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mesh: MeshKind::Quad,
            uniform: "u_Color".into(),
            color: [0.8, 0.3, 0.8, 1.0],
            clear_color: [0.0, 0.0, 0.0, 1.0],
            wave: WaveConfig::default(),
        }
    }
}

/// Settings of a [`TriangleWave`](crate::TriangleWave).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaveConfig {
    /// The first value.
    pub start: f32,

    /// The distance moved per frame.
    pub step: f32,

    /// The value below which the wave turns up.
    pub low: f32,

    /// The value above which the wave turns down.
    pub high: f32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            start: 0.0,
            step: 0.05,
            low: 0.0,
            high: 1.0,
        }
    }
}

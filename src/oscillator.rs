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

//! A fixed-step triangle wave used to animate the quad color.

use crate::config::WaveConfig;

/// A value that bounces between two bounds by a fixed step.
///
/// The bounds are checked before stepping, so the value may overshoot either bound by one
/// step before it turns around.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleWave {
    value: f32,
    increment: f32,
    low: f32,
    high: f32,
}

impl TriangleWave {
    /// Create a wave starting at `start` and rising by `step`.
    pub fn new(start: f32, step: f32, low: f32, high: f32) -> Self {
        Self {
            value: start,
            increment: step.abs(),
            low,
            high,
        }
    }

    /// The current value.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Whether the wave is currently rising.
    pub fn is_rising(&self) -> bool {
        self.increment >= 0.0
    }

    /// Move one step and return the new value.
    pub fn advance(&mut self) -> f32 {
        if self.value > self.high {
            self.increment = -self.increment.abs();
        } else if self.value < self.low {
            self.increment = self.increment.abs();
        }

        self.value += self.increment;
        self.value
    }
}

impl From<&WaveConfig> for TriangleWave {
    fn from(config: &WaveConfig) -> Self {
        Self::new(config.start, config.step, config.low, config.high)
    }
}

impl Default for TriangleWave {
    fn default() -> Self {
        Self::from(&WaveConfig::default())
    }
}

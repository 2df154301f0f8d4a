//! Draws a quad whose color pulses, using the shader file from `res/shaders`.
//!
//! Run with an optional configuration file:
//!
//! ```text
//! cargo run -p hello-quad-glow --example quad -- res/quad.toml
//! ```

mod util {
    include!("util/setup_context.rs");
}

use hello_quad::{Config, FrameLoop, ShaderSource};

use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    util::init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => Config::load(path)?,
        None => Config {
            shader: Path::new(env!("CARGO_MANIFEST_DIR")).join("../../res/shaders/Basic.shader"),
            ..Config::default()
        },
    };

    let source = ShaderSource::from_path(&config.shader)?;
    tracing::debug!("vertex stage:\n{}", source.vertex());
    tracing::debug!("fragment stage:\n{}", source.fragment());

    util::run_frame_loop(config.window, source, FrameLoop::new(config.render))
}

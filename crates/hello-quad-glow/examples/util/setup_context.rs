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

// Sets up a window and an OpenGL context for the examples with glutin and winit, then drives
// a `FrameLoop` from the window's events.

pub(crate) fn init() {
    tracing_subscriber::fmt::init();
}

pub(crate) mod glutin_impl {
    use hello_quad::{FrameLoop, LoopState, ShaderSource, WindowConfig};
    use hello_quad_glow::GlowDriver;

    use glow::HasContext;

    use glutin::config::{Config, ConfigTemplateBuilder};
    use glutin::context::{
        ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentContext,
        PossiblyCurrentContext, Version,
    };
    use glutin::display::{Display, GetGlDisplay};
    use glutin::prelude::*;

    use glutin::surface::{Surface, SwapInterval, WindowSurface};
    use glutin_winit::{DisplayBuilder, GlWindow};

    use raw_window_handle::HasRawWindowHandle;

    use std::error::Error;
    use std::mem;
    use std::num::NonZeroU32;

    use winit::dpi::LogicalSize;
    use winit::event::{Event, WindowEvent};
    use winit::event_loop::{EventLoop, EventLoopWindowTarget};
    use winit::window::{Window, WindowBuilder};

    pub(crate) struct GlutinSetup {
        display: Display,
        config: Config,
        context: ContextType,
        window: Option<Window>,
        window_config: WindowConfig,
    }

    #[derive(Default)]
    enum ContextType {
        NotCurrent(NotCurrentContext),
        Current {
            context: PossiblyCurrentContext,
            window: Window,
            surface: Surface<WindowSurface>,
        },
        #[default]
        Hole,
    }

    fn make_window_builder(window_config: &WindowConfig) -> WindowBuilder {
        WindowBuilder::new()
            .with_title(&window_config.title)
            .with_inner_size(LogicalSize::new(window_config.width, window_config.height))
    }

    impl GlutinSetup {
        pub(crate) fn new<T>(
            event_loop: &EventLoopWindowTarget<T>,
            window_config: WindowConfig,
        ) -> Result<Self, Box<dyn Error>> {
            // Start building a window.
            let window = if cfg!(windows) {
                Some(make_window_builder(&window_config))
            } else {
                None
            };

            // Use the window builder to start building a display.
            let display = DisplayBuilder::new().with_window_builder(window);

            // Prefer the config with the most samples.
            let (window, gl_config) =
                display.build(event_loop, ConfigTemplateBuilder::new(), |configs| {
                    configs
                        .reduce(|accum, config| {
                            if config.num_samples() > accum.num_samples() {
                                config
                            } else {
                                accum
                            }
                        })
                        .unwrap()
                })?;

            tracing::debug!("Config: {:?}", &gl_config);
            tracing::debug!("Samples: {:?}", gl_config.num_samples());
            tracing::debug!("Api: {:?}", gl_config.api());

            // Try a core 3.3 context first, then fall back to whatever the platform offers.
            let window_handle = window.as_ref().map(|w| w.raw_window_handle());
            let contexts = [
                ContextAttributesBuilder::new()
                    .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
                    .with_profile(GlProfile::Core)
                    .build(window_handle),
                ContextAttributesBuilder::new().build(window_handle),
                ContextAttributesBuilder::new()
                    .with_context_api(ContextApi::Gles(Some(Version::new(3, 0))))
                    .build(window_handle),
            ];

            let display = gl_config.display();
            let gl_context = contexts
                .iter()
                .find_map(|attributes| unsafe {
                    display.create_context(&gl_config, attributes).ok()
                })
                .ok_or_else(|| Box::<dyn Error>::from("Could not create a context"))?;

            Ok(Self {
                display,
                config: gl_config,
                context: ContextType::NotCurrent(gl_context),
                window,
                window_config,
            })
        }

        fn make_current<T>(
            &mut self,
            window_target: &EventLoopWindowTarget<T>,
        ) -> Result<GlowDriver, Box<dyn Error>> {
            let window = match self.window.take() {
                Some(window) => window,
                None => glutin_winit::finalize_window(
                    window_target,
                    make_window_builder(&self.window_config),
                    &self.config,
                )?,
            };

            let attrs = window.build_surface_attributes(<_>::default());
            let gl_surface = unsafe {
                self.display.create_window_surface(&self.config, &attrs)?
            };

            // Make it current.
            let gl_context = match mem::take(&mut self.context) {
                ContextType::NotCurrent(context) => context.make_current(&gl_surface)?,
                _ => return Err("context is already current".into()),
            };

            let interval = if self.window_config.vsync {
                SwapInterval::Wait(NonZeroU32::new(1).unwrap())
            } else {
                SwapInterval::DontWait
            };
            if let Err(res) = gl_surface.set_swap_interval(&gl_context, interval) {
                tracing::warn!("Error setting swap interval: {res:?}");
            }

            self.context = ContextType::Current {
                context: gl_context,
                window,
                surface: gl_surface,
            };

            // SAFETY: The context was just made current and stays current.
            let mut driver = unsafe {
                GlowDriver::from_loader_function_cstr(|s| {
                    self.display.get_proc_address(s) as *const _
                })?
            };

            #[cfg(not(target_vendor = "apple"))]
            unsafe {
                driver.context_mut().enable(glow::DEBUG_OUTPUT);
                driver
                    .context_mut()
                    .debug_message_callback(debug_message_callback);
            }

            Ok(driver)
        }

        fn run<T>(
            mut self,
            evl: EventLoop<T>,
            source: ShaderSource,
            mut frame_loop: FrameLoop<GlowDriver>,
        ) -> ! {
            let mut driver = None;

            evl.run(move |event, window_target, control_flow| {
                // Poll for and process events once per frame.
                control_flow.set_poll();

                match event {
                    Event::Resumed if driver.is_none() => {
                        let initialized = self
                            .make_current(window_target)
                            .and_then(|new_driver| {
                                frame_loop.initialize(&new_driver, &source)?;
                                Ok(new_driver)
                            });

                        match initialized {
                            Ok(new_driver) => driver = Some(new_driver),
                            Err(err) => {
                                tracing::error!("initialization failed: {err}");
                                control_flow.set_exit_with_code(1);
                            }
                        }
                    }
                    Event::WindowEvent { event, .. } => match event {
                        WindowEvent::Resized(size) => {
                            if size.width != 0 && size.height != 0 {
                                if let ContextType::Current {
                                    context, surface, ..
                                } = &self.context
                                {
                                    surface.resize(
                                        context,
                                        NonZeroU32::new(size.width).unwrap(),
                                        NonZeroU32::new(size.height).unwrap(),
                                    );
                                }

                                if let Some(driver) = &driver {
                                    unsafe {
                                        driver.context().viewport(
                                            0,
                                            0,
                                            size.width as i32,
                                            size.height as i32,
                                        )
                                    };
                                }
                            }
                        }
                        WindowEvent::CloseRequested => {
                            if let Some(driver) = &driver {
                                frame_loop.shutdown(driver);
                            }
                            control_flow.set_exit();
                        }
                        _ => (),
                    },
                    Event::RedrawEventsCleared => {
                        if let (
                            Some(driver),
                            ContextType::Current {
                                context: gl_context,
                                window,
                                surface: gl_surface,
                            },
                        ) = (&driver, &self.context)
                        {
                            if frame_loop.state() != LoopState::Running {
                                return;
                            }

                            if let Err(err) = frame_loop.frame(driver) {
                                tracing::error!("frame failed: {err}");
                                frame_loop.shutdown(driver);
                                control_flow.set_exit_with_code(1);
                                return;
                            }

                            window.request_redraw();

                            if let Err(err) = gl_surface.swap_buffers(gl_context) {
                                tracing::error!("failed to present: {err}");
                            }
                        }
                    }
                    Event::LoopDestroyed => {
                        if let Some(driver) = &driver {
                            frame_loop.shutdown(driver);
                        }
                    }
                    _ => (),
                }
            })
        }
    }

    /// Open a window and run `frame_loop` in it until the window is closed.
    pub(crate) fn run_frame_loop(
        window_config: WindowConfig,
        source: ShaderSource,
        frame_loop: FrameLoop<GlowDriver>,
    ) -> Result<(), Box<dyn Error>> {
        let event_loop = EventLoop::new();
        GlutinSetup::new(&event_loop, window_config)?.run(event_loop, source, frame_loop)
    }

    #[cfg(not(target_vendor = "apple"))]
    fn debug_message_callback(source: u32, ty: u32, id: u32, severity: u32, message: &str) {
        let source = match source {
            glow::DEBUG_SOURCE_API => "API",
            glow::DEBUG_SOURCE_WINDOW_SYSTEM => "Window System",
            glow::DEBUG_SOURCE_SHADER_COMPILER => "Shader Compiler",
            glow::DEBUG_SOURCE_THIRD_PARTY => "Third Party",
            glow::DEBUG_SOURCE_APPLICATION => "Application",
            glow::DEBUG_SOURCE_OTHER => "Other",
            _ => "Unknown",
        };

        let ty = match ty {
            glow::DEBUG_TYPE_ERROR => "Error",
            glow::DEBUG_TYPE_DEPRECATED_BEHAVIOR => "Deprecated Behavior",
            glow::DEBUG_TYPE_UNDEFINED_BEHAVIOR => "Undefined Behavior",
            glow::DEBUG_TYPE_PORTABILITY => "Portability",
            glow::DEBUG_TYPE_PERFORMANCE => "Performance",
            glow::DEBUG_TYPE_MARKER => "Marker",
            glow::DEBUG_TYPE_OTHER => "Other",
            _ => "Unknown",
        };

        match severity {
            glow::DEBUG_SEVERITY_HIGH => tracing::error!("{ty}-{id} ({source}): {message}"),
            glow::DEBUG_SEVERITY_MEDIUM => tracing::warn!("{ty}-{id} ({source}): {message}"),
            glow::DEBUG_SEVERITY_LOW => tracing::info!("{ty}-{id} ({source}): {message}"),
            glow::DEBUG_SEVERITY_NOTIFICATION => {
                tracing::debug!("{ty}-{id} ({source}): {message}")
            }
            _ => (),
        };
    }
}

pub(crate) use glutin_impl::run_frame_loop;

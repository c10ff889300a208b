use crate::config::AppConfig;
use crate::render::debug::gl_call;
use crate::render::{GlShaderApi, Mesh, ProgramBuilder, ShaderInput, ShaderProgram};
use anyhow::{anyhow, Context, Result};
use glam::Vec4;
use glutin::{
    config::ConfigTemplateBuilder,
    context::{ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version},
    display::{GetGlDisplay, GlDisplay},
    prelude::*,
    surface::{Surface, SwapInterval, WindowSurface},
};
use glutin_winit::{DisplayBuilder, GlWindow};
use log::{info, LevelFilter};
use raw_window_handle::HasRawWindowHandle;
use simple_logger::SimpleLogger;
use std::{
    ffi::{CStr, CString},
    num::NonZeroU32,
    ptr,
};
use winit::{
    dpi::LogicalSize,
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::{Window, WindowBuilder},
};

pub fn init_logger(level: LevelFilter) -> Result<()> {
    SimpleLogger::new().with_level(level).init()?;
    Ok(())
}

/// Opens a window, builds the program from `input` and draws until the
/// window is closed.
pub fn run(config: &AppConfig, input: &ShaderInput) -> Result<()> {
    let (app, event_loop) = App::new(config, input)?;
    app.run(event_loop)
}

pub struct App {
    // GL objects are declared first so they are dropped while the context
    // is still alive
    program: ShaderProgram,
    mesh: Mesh,
    gl_surface: Surface<WindowSurface>,
    gl_context: PossiblyCurrentContext,
    window: Window,
    clear_color: [f32; 4],
    color: Vec4,
}

impl App {
    pub fn new(config: &AppConfig, input: &ShaderInput) -> Result<(Self, EventLoop<()>)> {
        info!("Initializing window...");

        let event_loop = EventLoop::new().context("Failed to create event loop")?;
        let window_builder = WindowBuilder::new()
            .with_title(config.window.title.as_str())
            .with_inner_size(LogicalSize::new(config.window.width, config.window.height));

        let template = ConfigTemplateBuilder::new().with_alpha_size(8);

        let display_builder = DisplayBuilder::new().with_window_builder(Some(window_builder));

        let (window, gl_config) = display_builder
            .build(&event_loop, template, |configs| {
                configs
                    .reduce(|accum, config| {
                        if config.num_samples() > accum.num_samples() {
                            config
                        } else {
                            accum
                        }
                    })
                    // glutin fails before calling the picker when nothing matches
                    .expect("config picker called with no configs")
            })
            .map_err(|err| anyhow!("Failed to create window: {}", err))?;

        let window = window.context("Display builder did not create a window")?;
        let raw_window_handle = window.raw_window_handle();

        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .with_profile(GlProfile::Core)
            .build(Some(raw_window_handle));

        let gl_display = gl_config.display();

        let not_current = unsafe { gl_display.create_context(&gl_config, &context_attributes) }
            .context("Failed to create OpenGL context")?;

        let attrs = window.build_surface_attributes(Default::default());
        let gl_surface = unsafe { gl_display.create_window_surface(&gl_config, &attrs) }
            .context("Failed to create GL surface")?;

        let gl_context = not_current
            .make_current(&gl_surface)
            .context("Failed to make context current")?;

        // Load OpenGL functions
        gl::load_with(|symbol| match CString::new(symbol) {
            Ok(symbol) => gl_display.get_proc_address(symbol.as_c_str()) as *const _,
            Err(_) => ptr::null(),
        });
        info!("OpenGL version: {}", gl_string(gl::VERSION));

        let interval = if config.window.vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(err) = gl_surface.set_swap_interval(&gl_context, interval) {
            log::warn!("Failed to set swap interval: {}", err);
        }

        let source = input.load()?;
        let program = ProgramBuilder::new(GlShaderApi)
            .mode(config.shader.compile_mode)
            .build(&source)
            .context("Failed to build shader program")?;
        let mesh = Mesh::upload(config.render.shape);

        Ok((
            Self {
                program,
                mesh,
                gl_surface,
                gl_context,
                window,
                clear_color: config.render.clear_color,
                color: Vec4::from_array(config.render.color),
            },
            event_loop,
        ))
    }

    /// Polls and redraws continuously until the window is closed.
    pub fn run(mut self, event_loop: EventLoop<()>) -> Result<()> {
        let mut failure = None;

        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run(|event, elwt| match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(size) => self.resize(size.width, size.height),
                WindowEvent::RedrawRequested => {
                    if let Err(err) = self.draw() {
                        failure = Some(err);
                        elwt.exit();
                    }
                }
                _ => (),
            },
            Event::AboutToWait => self.window.request_redraw(),
            _ => (),
        })?;

        match failure {
            Some(err) => Err(err),
            None => {
                info!("Window closed");
                Ok(())
            }
        }
    }

    fn resize(&self, width: u32, height: u32) {
        // Minimized windows report a zero size
        if let (Some(w), Some(h)) = (NonZeroU32::new(width), NonZeroU32::new(height)) {
            self.gl_surface.resize(&self.gl_context, w, h);
            unsafe {
                gl::Viewport(0, 0, width as i32, height as i32);
            }
        }
    }

    fn draw(&mut self) -> Result<()> {
        let [r, g, b, a] = self.clear_color;
        unsafe {
            gl::ClearColor(r, g, b, a);
            gl_call!(gl::Clear(gl::COLOR_BUFFER_BIT));
        }

        self.program.set_uniform_vec4("uColor", self.color);
        self.mesh.draw();

        self.gl_surface
            .swap_buffers(&self.gl_context)
            .context("Failed to swap buffers")
    }
}

fn gl_string(name: gl::types::GLenum) -> String {
    let value = unsafe { gl::GetString(name) };
    if value.is_null() {
        return "unknown".to_string();
    }
    unsafe { CStr::from_ptr(value as *const _) }
        .to_string_lossy()
        .into_owned()
}

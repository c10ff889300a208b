use gl::types::*;
use std::ffi::CStr;
use std::ptr;

/// The subset of OpenGL the shader program builder talks to.
///
/// Every method maps onto a single GL entry point (or a status/log query
/// built from one) and expects the GL context to be current.
pub trait ShaderApi {
    fn create_shader(&self, kind: GLenum) -> GLuint;
    fn shader_source(&self, shader: GLuint, source: &CStr);
    fn compile_shader(&self, shader: GLuint);
    fn compile_status(&self, shader: GLuint) -> bool;
    fn shader_info_log(&self, shader: GLuint) -> String;
    fn delete_shader(&self, shader: GLuint);

    fn create_program(&self) -> GLuint;
    fn attach_shader(&self, program: GLuint, shader: GLuint);
    fn link_program(&self, program: GLuint);
    fn link_status(&self, program: GLuint) -> bool;
    fn validate_program(&self, program: GLuint);
    fn validate_status(&self, program: GLuint) -> bool;
    fn program_info_log(&self, program: GLuint) -> String;
    fn delete_program(&self, program: GLuint);

    fn use_program(&self, program: GLuint);
    fn uniform_location(&self, program: GLuint, name: &CStr) -> GLint;
    fn uniform_4f(&self, location: GLint, x: f32, y: f32, z: f32, w: f32);
}

/// [`ShaderApi`] backed by the loaded `gl` function pointers.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlShaderApi;

impl GlShaderApi {
    fn shader_param(shader: GLuint, pname: GLenum) -> GLint {
        let mut value = 0;
        unsafe {
            gl::GetShaderiv(shader, pname, &mut value);
        }
        value
    }

    fn program_param(program: GLuint, pname: GLenum) -> GLint {
        let mut value = 0;
        unsafe {
            gl::GetProgramiv(program, pname, &mut value);
        }
        value
    }
}

impl ShaderApi for GlShaderApi {
    fn create_shader(&self, kind: GLenum) -> GLuint {
        unsafe { gl::CreateShader(kind) }
    }

    fn shader_source(&self, shader: GLuint, source: &CStr) {
        unsafe {
            gl::ShaderSource(shader, 1, &source.as_ptr(), ptr::null());
        }
    }

    fn compile_shader(&self, shader: GLuint) {
        unsafe {
            gl::CompileShader(shader);
        }
    }

    fn compile_status(&self, shader: GLuint) -> bool {
        Self::shader_param(shader, gl::COMPILE_STATUS) != 0
    }

    fn shader_info_log(&self, shader: GLuint) -> String {
        let len = Self::shader_param(shader, gl::INFO_LOG_LENGTH);
        let mut buffer = info_log_buffer(len);
        let mut written = 0;
        unsafe {
            gl::GetShaderInfoLog(
                shader,
                buffer.len() as GLsizei,
                &mut written,
                buffer.as_mut_ptr() as *mut GLchar,
            );
        }
        info_log_to_string(buffer, written)
    }

    fn delete_shader(&self, shader: GLuint) {
        unsafe {
            gl::DeleteShader(shader);
        }
    }

    fn create_program(&self) -> GLuint {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe {
            gl::AttachShader(program, shader);
        }
    }

    fn link_program(&self, program: GLuint) {
        unsafe {
            gl::LinkProgram(program);
        }
    }

    fn link_status(&self, program: GLuint) -> bool {
        Self::program_param(program, gl::LINK_STATUS) != 0
    }

    fn validate_program(&self, program: GLuint) {
        unsafe {
            gl::ValidateProgram(program);
        }
    }

    fn validate_status(&self, program: GLuint) -> bool {
        Self::program_param(program, gl::VALIDATE_STATUS) != 0
    }

    fn program_info_log(&self, program: GLuint) -> String {
        let len = Self::program_param(program, gl::INFO_LOG_LENGTH);
        let mut buffer = info_log_buffer(len);
        let mut written = 0;
        unsafe {
            gl::GetProgramInfoLog(
                program,
                buffer.len() as GLsizei,
                &mut written,
                buffer.as_mut_ptr() as *mut GLchar,
            );
        }
        info_log_to_string(buffer, written)
    }

    fn delete_program(&self, program: GLuint) {
        unsafe {
            gl::DeleteProgram(program);
        }
    }

    fn use_program(&self, program: GLuint) {
        unsafe {
            gl::UseProgram(program);
        }
    }

    fn uniform_location(&self, program: GLuint, name: &CStr) -> GLint {
        unsafe { gl::GetUniformLocation(program, name.as_ptr()) }
    }

    fn uniform_4f(&self, location: GLint, x: f32, y: f32, z: f32, w: f32) {
        unsafe {
            gl::Uniform4f(location, x, y, z, w);
        }
    }
}

// INFO_LOG_LENGTH includes the NUL terminator
fn info_log_buffer(len: GLint) -> Vec<u8> {
    vec![0; len.max(1) as usize]
}

fn info_log_to_string(mut buffer: Vec<u8>, written: GLsizei) -> String {
    buffer.truncate(written.max(0) as usize);
    String::from_utf8_lossy(&buffer).trim_end().to_string()
}

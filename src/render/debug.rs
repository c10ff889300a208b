// debug.rs - Checked OpenGL calls

use gl::types::GLenum;

// A lost context can report errors forever
const MAX_QUEUED_ERRORS: usize = 32;

/// Reads the next code from the current context's error queue.
pub fn gl_error() -> GLenum {
    unsafe { gl::GetError() }
}

/// Pops codes from `next_error` until it reports `GL_NO_ERROR`.
pub fn drain_errors(mut next_error: impl FnMut() -> GLenum) -> Vec<GLenum> {
    let mut errors = Vec::new();
    while errors.len() < MAX_QUEUED_ERRORS {
        match next_error() {
            gl::NO_ERROR => break,
            code => errors.push(code),
        }
    }
    errors
}

/// Logs every queued error against the call that raised it. Returns `true`
/// when the queue was empty.
pub fn log_call_errors(
    call: &str,
    file: &str,
    line: u32,
    next_error: impl FnMut() -> GLenum,
) -> bool {
    let errors = drain_errors(next_error);
    for code in &errors {
        log::error!("[OpenGL error] ({}): {} {}:{}", code, call, file, line);
    }
    errors.is_empty()
}

/// Runs a GL call with a clean error queue and logs whatever it raised.
///
/// Expands in place, so it must be used inside the caller's `unsafe` block.
macro_rules! gl_call {
    ($call:expr) => {{
        $crate::render::debug::drain_errors($crate::render::debug::gl_error);
        let result = $call;
        $crate::render::debug::log_call_errors(
            stringify!($call),
            file!(),
            line!(),
            $crate::render::debug::gl_error,
        );
        result
    }};
}

pub(crate) use gl_call;

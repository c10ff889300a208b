// program.rs - Compiling shader stages and linking them into a program

use crate::render::backend::{GlShaderApi, ShaderApi};
use crate::render::shaders::{ShaderError, ShaderSource, ShaderStage};
use gl::types::*;
use glam::Vec4;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ffi::CString;

/// What the builder does when a stage fails to compile or the program fails
/// to link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompileMode {
    /// Report the failure as an error and release every GL object created.
    #[default]
    Strict,
    /// Log the driver diagnostic and keep going: a failed stage becomes a
    /// zero handle and the program is linked without it.
    Lenient,
}

pub struct ProgramBuilder<A: ShaderApi = GlShaderApi> {
    api: A,
    mode: CompileMode,
}

impl<A: ShaderApi + Clone> ProgramBuilder<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            mode: CompileMode::default(),
        }
    }

    pub fn mode(mut self, mode: CompileMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn build(&self, source: &ShaderSource) -> Result<ShaderProgram<A>, ShaderError> {
        let vertex = self.compile_stage(ShaderStage::Vertex, source.vertex())?;
        let fragment = match self.compile_stage(ShaderStage::Fragment, source.fragment()) {
            Ok(shader) => shader,
            Err(err) => {
                self.delete_shaders(&[vertex]);
                return Err(err);
            }
        };
        let shaders = [vertex, fragment];

        let program = self.api.create_program();
        for shader in shaders {
            // Attaching 0 is GL_INVALID_VALUE; a lenient failure is simply left out
            if shader != 0 {
                self.api.attach_shader(program, shader);
            }
        }
        self.api.link_program(program);

        if !self.api.link_status(program) {
            let log = self.api.program_info_log(program);
            match self.mode {
                CompileMode::Strict => {
                    self.delete_shaders(&shaders);
                    self.api.delete_program(program);
                    return Err(ShaderError::Linking(log));
                }
                CompileMode::Lenient => log::error!("Program linking failed: {}", log),
            }
        }

        self.api.validate_program(program);
        if !self.api.validate_status(program) {
            log::warn!(
                "Program {} failed validation: {}",
                program,
                self.api.program_info_log(program)
            );
        }

        self.delete_shaders(&shaders);
        log::debug!("Linked shader program {}", program);

        Ok(ShaderProgram::new(program, self.api.clone()))
    }

    /// Compiles one stage, returning its shader object.
    ///
    /// In lenient mode a compile failure yields `Ok(0)` after the diagnostic
    /// has been logged and the failed object deleted.
    pub fn compile_stage(&self, stage: ShaderStage, text: &str) -> Result<GLuint, ShaderError> {
        let c_source = CString::new(text.as_bytes())?;

        let shader = self.api.create_shader(stage.gl_kind());
        self.api.shader_source(shader, &c_source);
        self.api.compile_shader(shader);

        if self.api.compile_status(shader) {
            log::debug!("Compiled {} shader {}", stage, shader);
            return Ok(shader);
        }

        let log = self.api.shader_info_log(shader);
        log::error!("{} shader compilation failed: {}", stage, log);
        self.api.delete_shader(shader);

        match self.mode {
            CompileMode::Strict => Err(ShaderError::Compilation { stage, log }),
            CompileMode::Lenient => Ok(0),
        }
    }

    fn delete_shaders(&self, shaders: &[GLuint]) {
        for &shader in shaders.iter().filter(|&&shader| shader != 0) {
            self.api.delete_shader(shader);
        }
    }
}

/// A linked program object. Deleted on drop, so it must not outlive the GL
/// context it was created in.
pub struct ShaderProgram<A: ShaderApi = GlShaderApi> {
    id: GLuint,
    api: A,
    uniforms: HashMap<String, GLint>,
}

impl<A: ShaderApi> ShaderProgram<A> {
    fn new(id: GLuint, api: A) -> Self {
        Self {
            id,
            api,
            uniforms: HashMap::new(),
        }
    }

    pub fn id(&self) -> GLuint {
        self.id
    }

    pub fn use_program(&self) {
        self.api.use_program(self.id);
    }

    pub fn uniform_location(&mut self, name: &str) -> GLint {
        if let Some(location) = self.uniforms.get(name) {
            return *location;
        }

        let location = match CString::new(name) {
            Ok(cname) => self.api.uniform_location(self.id, &cname),
            Err(_) => -1,
        };

        if location == -1 {
            log::warn!("Uniform '{}' not found in shader", name);
        }

        self.uniforms.insert(name.to_string(), location);
        location
    }

    pub fn set_uniform_vec4(&mut self, name: &str, value: Vec4) {
        self.use_program();
        let location = self.uniform_location(name);
        self.api.uniform_4f(location, value.x, value.y, value.z, value.w);
    }
}

impl<A: ShaderApi> Drop for ShaderProgram<A> {
    fn drop(&mut self) {
        self.api.delete_program(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::shaders::basic_shaders;
    use std::cell::RefCell;
    use std::ffi::CStr;
    use std::rc::Rc;

    /// Marker the fake driver treats as a syntax error.
    const BROKEN: &str = "#error broken";

    #[derive(Debug, Default)]
    struct FakeDriver {
        next_id: GLuint,
        sources: HashMap<GLuint, String>,
        kinds: HashMap<GLuint, GLenum>,
        deleted_shaders: Vec<GLuint>,
        attached: Vec<(GLuint, GLuint)>,
        linked: Vec<GLuint>,
        validated: Vec<GLuint>,
        deleted_programs: Vec<GLuint>,
        used: Vec<GLuint>,
        uniform_queries: usize,
        uniform_values: Vec<(GLint, [f32; 4])>,
        shader_log_queries: Vec<GLuint>,
        program_log_queries: usize,
        fail_link: bool,
        fail_validate: bool,
    }

    /// Records every call; compiles succeed unless the source contains
    /// [`BROKEN`] or is empty.
    #[derive(Debug, Clone, Default)]
    struct FakeApi(Rc<RefCell<FakeDriver>>);

    impl FakeApi {
        fn alloc(&self) -> GLuint {
            let mut driver = self.0.borrow_mut();
            driver.next_id += 1;
            driver.next_id
        }
    }

    impl ShaderApi for FakeApi {
        fn create_shader(&self, kind: GLenum) -> GLuint {
            let id = self.alloc();
            self.0.borrow_mut().kinds.insert(id, kind);
            id
        }

        fn shader_source(&self, shader: GLuint, source: &CStr) {
            let text = source.to_string_lossy().into_owned();
            self.0.borrow_mut().sources.insert(shader, text);
        }

        fn compile_shader(&self, _shader: GLuint) {}

        fn compile_status(&self, shader: GLuint) -> bool {
            let driver = self.0.borrow();
            let source = &driver.sources[&shader];
            !source.is_empty() && !source.contains(BROKEN)
        }

        fn shader_info_log(&self, shader: GLuint) -> String {
            self.0.borrow_mut().shader_log_queries.push(shader);
            format!("0:1(1): error: shader {} is broken", shader)
        }

        fn delete_shader(&self, shader: GLuint) {
            self.0.borrow_mut().deleted_shaders.push(shader);
        }

        fn create_program(&self) -> GLuint {
            self.alloc()
        }

        fn attach_shader(&self, program: GLuint, shader: GLuint) {
            self.0.borrow_mut().attached.push((program, shader));
        }

        fn link_program(&self, program: GLuint) {
            self.0.borrow_mut().linked.push(program);
        }

        fn link_status(&self, _program: GLuint) -> bool {
            !self.0.borrow().fail_link
        }

        fn validate_program(&self, program: GLuint) {
            self.0.borrow_mut().validated.push(program);
        }

        fn validate_status(&self, _program: GLuint) -> bool {
            !self.0.borrow().fail_validate
        }

        fn program_info_log(&self, _program: GLuint) -> String {
            self.0.borrow_mut().program_log_queries += 1;
            "error: unresolved symbol".to_string()
        }

        fn delete_program(&self, program: GLuint) {
            self.0.borrow_mut().deleted_programs.push(program);
        }

        fn use_program(&self, program: GLuint) {
            self.0.borrow_mut().used.push(program);
        }

        fn uniform_location(&self, _program: GLuint, name: &CStr) -> GLint {
            self.0.borrow_mut().uniform_queries += 1;
            if name.to_bytes() == b"uColor" { 0 } else { -1 }
        }

        fn uniform_4f(&self, location: GLint, x: f32, y: f32, z: f32, w: f32) {
            self.0.borrow_mut().uniform_values.push((location, [x, y, z, w]));
        }
    }

    fn valid_source() -> ShaderSource {
        ShaderSource::new(basic_shaders::VERTEX_SRC, basic_shaders::FRAGMENT_SRC)
    }

    #[test]
    fn test_valid_sources_link_into_program() {
        let api = FakeApi::default();
        let program = ProgramBuilder::new(api.clone()).build(&valid_source()).unwrap();

        assert_ne!(program.id(), 0);
        let driver = api.0.borrow();
        assert_eq!(driver.kinds[&1], gl::VERTEX_SHADER);
        assert_eq!(driver.kinds[&2], gl::FRAGMENT_SHADER);
        assert_eq!(driver.attached, vec![(program.id(), 1), (program.id(), 2)]);
        assert_eq!(driver.linked, vec![program.id()]);
        assert_eq!(driver.validated, vec![program.id()]);
        // Only the program outlives the build
        assert_eq!(driver.deleted_shaders, vec![1, 2]);
        assert!(driver.deleted_programs.is_empty());
    }

    #[test]
    fn test_program_is_deleted_on_drop() {
        let api = FakeApi::default();
        let program = ProgramBuilder::new(api.clone()).build(&valid_source()).unwrap();
        let id = program.id();

        drop(program);
        assert_eq!(api.0.borrow().deleted_programs, vec![id]);
    }

    #[test]
    fn test_strict_compile_failure_is_reported() {
        let api = FakeApi::default();
        let source = ShaderSource::new(basic_shaders::VERTEX_SRC, BROKEN);

        match ProgramBuilder::new(api.clone()).build(&source) {
            Err(ShaderError::Compilation { stage, log }) => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(log.contains("broken"));
            }
            other => panic!("expected compilation error, got {:?}", other.map(|p| p.id())),
        }

        let driver = api.0.borrow();
        // Both the failed fragment and the good vertex shader are released
        assert_eq!(driver.deleted_shaders, vec![2, 1]);
        assert!(driver.linked.is_empty());
    }

    #[test]
    fn test_lenient_compile_failure_links_without_stage() {
        let api = FakeApi::default();
        let source = ShaderSource::new(BROKEN, basic_shaders::FRAGMENT_SRC);

        let program = ProgramBuilder::new(api.clone())
            .mode(CompileMode::Lenient)
            .build(&source)
            .unwrap();

        assert_ne!(program.id(), 0);
        let driver = api.0.borrow();
        assert_eq!(driver.attached, vec![(program.id(), 2)]);
        assert_eq!(driver.linked, vec![program.id()]);
        assert_eq!(driver.deleted_shaders, vec![1, 2]);
        // The diagnostic is read from the failed stage only
        assert_eq!(driver.shader_log_queries, vec![1]);
    }

    #[test]
    fn test_lenient_compile_stage_returns_zero_handle() {
        let api = FakeApi::default();
        let builder = ProgramBuilder::new(api.clone()).mode(CompileMode::Lenient);

        assert_eq!(builder.compile_stage(ShaderStage::Vertex, "").unwrap(), 0);
        assert_eq!(api.0.borrow().deleted_shaders, vec![1]);
    }

    #[test]
    fn test_strict_link_failure_releases_everything() {
        let api = FakeApi::default();
        api.0.borrow_mut().fail_link = true;

        let result = ProgramBuilder::new(api.clone()).build(&valid_source());
        assert!(matches!(result, Err(ShaderError::Linking(ref log)) if log.contains("unresolved")));

        let driver = api.0.borrow();
        assert_eq!(driver.deleted_shaders, vec![1, 2]);
        assert_eq!(driver.deleted_programs, vec![3]);
    }

    #[test]
    fn test_nul_in_source_is_rejected() {
        let api = FakeApi::default();
        let source = ShaderSource::new("void main() {}\0", basic_shaders::FRAGMENT_SRC);

        let result = ProgramBuilder::new(api.clone()).build(&source);
        assert!(matches!(result, Err(ShaderError::Nul(_))));
        assert!(api.0.borrow().kinds.is_empty());
    }

    #[test]
    fn test_uniform_locations_are_cached() {
        let api = FakeApi::default();
        let mut program = ProgramBuilder::new(api.clone()).build(&valid_source()).unwrap();

        program.set_uniform_vec4("uColor", Vec4::new(1.0, 0.5, 0.2, 1.0));
        program.set_uniform_vec4("uColor", Vec4::ONE);
        assert_eq!(program.uniform_location("missing"), -1);
        assert_eq!(program.uniform_location("missing"), -1);

        let driver = api.0.borrow();
        assert_eq!(driver.uniform_queries, 2);
        assert_eq!(driver.uniform_values[0], (0, [1.0, 0.5, 0.2, 1.0]));
        assert_eq!(driver.used, vec![program.id(), program.id()]);
    }

    #[test]
    fn test_lenient_link_failure_still_returns_program() {
        let api = FakeApi::default();
        api.0.borrow_mut().fail_link = true;

        let program = ProgramBuilder::new(api.clone())
            .mode(CompileMode::Lenient)
            .build(&valid_source())
            .unwrap();

        let driver = api.0.borrow();
        assert_eq!(driver.program_log_queries, 1);
        assert_eq!(driver.validated, vec![program.id()]);
        assert_eq!(driver.deleted_shaders, vec![1, 2]);
        assert!(driver.deleted_programs.is_empty());
    }

    #[test]
    fn test_validation_failure_is_not_fatal() {
        let api = FakeApi::default();
        api.0.borrow_mut().fail_validate = true;

        let program = ProgramBuilder::new(api.clone()).build(&valid_source()).unwrap();

        assert_ne!(program.id(), 0);
        let driver = api.0.borrow();
        // The validation log is fetched for the warning
        assert_eq!(driver.program_log_queries, 1);
        assert_eq!(driver.deleted_shaders, vec![1, 2]);
        assert!(driver.deleted_programs.is_empty());
    }
}

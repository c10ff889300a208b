pub mod backend;
pub mod debug;
pub mod mesh;
pub mod program;
pub mod shaders;

pub use backend::{GlShaderApi, ShaderApi};
pub use mesh::{Mesh, Shape, Vertex};
pub use program::{CompileMode, ProgramBuilder, ShaderProgram};
pub use shaders::{ShaderError, ShaderInput, ShaderSource, ShaderStage};

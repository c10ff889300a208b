pub mod app;
pub mod config;
pub mod render;

// Re-export commonly used types
pub use config::AppConfig;
pub use render::mesh::Shape;
pub use render::program::{CompileMode, ProgramBuilder, ShaderProgram};
pub use render::shaders::{ShaderError, ShaderInput, ShaderSource, ShaderStage};

use crate::render::{CompileMode, Shape};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub shape: Shape,
    pub clear_color: [f32; 4],
    /// Fed to the `uColor` uniform.
    pub color: [f32; 4],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            shape: Shape::default(),
            clear_color: [0.2, 0.3, 0.3, 1.0],
            color: [1.0, 0.5, 0.2, 1.0],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    pub compile_mode: CompileMode,
}

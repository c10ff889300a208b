// shaders.rs - Shader sources: stages, combined-file splitting and loading

use gl::types::GLenum;
use std::ffi::NulError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("Failed to read shader file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Null byte error: {0}")]
    Nul(#[from] NulError),
    #[error("{stage} shader compilation failed: {log}")]
    Compilation { stage: ShaderStage, log: String },
    #[error("Program linking failed: {0}")]
    Linking(String),
}

/// Pipeline stage a piece of GLSL belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub const ALL: [ShaderStage; 2] = [ShaderStage::Vertex, ShaderStage::Fragment];

    pub fn gl_kind(self) -> GLenum {
        match self {
            Self::Vertex => gl::VERTEX_SHADER,
            Self::Fragment => gl::FRAGMENT_SHADER,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Vertex and fragment GLSL text for one program.
///
/// Either stage may be empty when a combined file has no (or malformed)
/// marker lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderSource {
    vertex: String,
    fragment: String,
}

impl ShaderSource {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// Splits a combined shader file into its two stages.
    ///
    /// Any line containing `shader` is a marker: with `vertex` in it the
    /// following lines go to the vertex stage, with `fragment` to the
    /// fragment stage, otherwise the current target is kept. Every other
    /// line is appended, newline-terminated, to the current target. Lines
    /// before the first stage marker are dropped.
    pub fn parse(text: &str) -> Self {
        let mut source = Self::default();
        let mut target: Option<ShaderStage> = None;

        for line in text.lines() {
            if line.contains("shader") {
                if line.contains("vertex") {
                    target = Some(ShaderStage::Vertex);
                } else if line.contains("fragment") {
                    target = Some(ShaderStage::Fragment);
                }
                continue;
            }

            if let Some(stage) = target {
                let buffer = source.buffer_mut(stage);
                buffer.push_str(line);
                buffer.push('\n');
            }
        }

        source
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ShaderError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ShaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let source = Self::parse(&text);
        for stage in ShaderStage::ALL {
            if source.source(stage).is_empty() {
                log::warn!("{} has no {} shader section", path.display(), stage);
            }
        }
        Ok(source)
    }

    pub fn vertex(&self) -> &str {
        &self.vertex
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    pub fn source(&self, stage: ShaderStage) -> &str {
        match stage {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::Fragment => &self.fragment,
        }
    }

    fn buffer_mut(&mut self, stage: ShaderStage) -> &mut String {
        match stage {
            ShaderStage::Vertex => &mut self.vertex,
            ShaderStage::Fragment => &mut self.fragment,
        }
    }
}

/// Where a program's shader text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderInput {
    Inline {
        vertex: &'static str,
        fragment: &'static str,
    },
    File(PathBuf),
}

impl ShaderInput {
    pub fn load(&self) -> Result<ShaderSource, ShaderError> {
        match self {
            Self::Inline { vertex, fragment } => Ok(ShaderSource::new(*vertex, *fragment)),
            Self::File(path) => {
                log::info!("Loading shaders from {}", path.display());
                ShaderSource::from_file(path)
            }
        }
    }
}

/// Sources used by the inline triangle program.
pub mod basic_shaders {
    pub const VERTEX_SRC: &str = r#"#version 330 core
layout (location = 0) in vec2 aPos;

void main() {
    gl_Position = vec4(aPos, 0.0, 1.0);
}
"#;

    pub const FRAGMENT_SRC: &str = r#"#version 330 core
out vec4 FragColor;

uniform vec4 uColor;

void main() {
    FragColor = uColor;
}
"#;
}

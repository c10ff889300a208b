use crate::render::debug::gl_call;
use bytemuck::{Pod, Zeroable};
use gl::types::*;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::mem;
use std::ptr;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec2,
}

impl Vertex {
    pub const fn new(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
        }
    }
}

const TRIANGLE_VERTICES: [Vertex; 3] = [
    Vertex::new(-0.5, -0.5),
    Vertex::new(0.5, -0.5),
    Vertex::new(0.0, 0.5),
];

const RECTANGLE_VERTICES: [Vertex; 4] = [
    Vertex::new(0.5, 0.5),   // top right
    Vertex::new(0.5, -0.5),  // bottom right
    Vertex::new(-0.5, -0.5), // bottom left
    Vertex::new(-0.5, 0.5),  // top left
];

const RECTANGLE_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

/// 2D geometry the tutorial programs can draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Triangle,
    #[default]
    Rectangle,
}

impl Shape {
    pub fn vertices(self) -> &'static [Vertex] {
        match self {
            Self::Triangle => &TRIANGLE_VERTICES,
            Self::Rectangle => &RECTANGLE_VERTICES,
        }
    }

    /// Element indices, or `None` for shapes drawn straight from the vertex list.
    pub fn indices(self) -> Option<&'static [u32]> {
        match self {
            Self::Triangle => None,
            Self::Rectangle => Some(&RECTANGLE_INDICES),
        }
    }

    pub fn draw_count(self) -> usize {
        self.indices().map_or(self.vertices().len(), |indices| indices.len())
    }
}

/// A shape uploaded to the GPU: VAO, VBO and, for indexed shapes, an EBO.
pub struct Mesh {
    vao: GLuint,
    vbo: GLuint,
    ebo: Option<GLuint>,
    count: GLsizei,
}

impl Mesh {
    /// Requires a current GL context.
    pub fn upload(shape: Shape) -> Self {
        let vertices: &[u8] = bytemuck::cast_slice(shape.vertices());
        let mut vao = 0;
        let mut vbo = 0;
        let mut ebo = None;

        unsafe {
            gl::GenVertexArrays(1, &mut vao);
            gl::GenBuffers(1, &mut vbo);

            gl::BindVertexArray(vao);
            gl::BindBuffer(gl::ARRAY_BUFFER, vbo);
            gl_call!(gl::BufferData(
                gl::ARRAY_BUFFER,
                vertices.len() as GLsizeiptr,
                vertices.as_ptr() as *const _,
                gl::STATIC_DRAW,
            ));

            if let Some(indices) = shape.indices() {
                let indices: &[u8] = bytemuck::cast_slice(indices);
                let mut buffer = 0;
                gl::GenBuffers(1, &mut buffer);
                gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, buffer);
                gl_call!(gl::BufferData(
                    gl::ELEMENT_ARRAY_BUFFER,
                    indices.len() as GLsizeiptr,
                    indices.as_ptr() as *const _,
                    gl::STATIC_DRAW,
                ));
                ebo = Some(buffer);
            }

            // Position attribute
            gl_call!(gl::VertexAttribPointer(
                0,
                2,
                gl::FLOAT,
                gl::FALSE,
                mem::size_of::<Vertex>() as GLsizei,
                ptr::null(),
            ));
            gl::EnableVertexAttribArray(0);

            // The EBO binding is part of the VAO state, so only the VBO is unbound
            gl::BindBuffer(gl::ARRAY_BUFFER, 0);
            gl::BindVertexArray(0);
        }

        log::debug!("Uploaded {:?} mesh (vao {}, vbo {})", shape, vao, vbo);

        Self {
            vao,
            vbo,
            ebo,
            count: shape.draw_count() as GLsizei,
        }
    }

    pub fn draw(&self) {
        unsafe {
            gl::BindVertexArray(self.vao);
            match self.ebo {
                Some(_) => gl_call!(gl::DrawElements(
                    gl::TRIANGLES,
                    self.count,
                    gl::UNSIGNED_INT,
                    ptr::null()
                )),
                None => gl_call!(gl::DrawArrays(gl::TRIANGLES, 0, self.count)),
            }
            gl::BindVertexArray(0);
        }
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        unsafe {
            if let Some(ebo) = self.ebo {
                gl::DeleteBuffers(1, &ebo);
            }
            gl::DeleteBuffers(1, &self.vbo);
            gl::DeleteVertexArrays(1, &self.vao);
        }
    }
}

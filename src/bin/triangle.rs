use anyhow::Result;

use glpaint::{
    app, config,
    render::shaders::basic_shaders::{FRAGMENT_SRC, VERTEX_SRC},
    ShaderInput, Shape,
};

fn main() -> Result<()> {
    let mut config = config::load_or_create_config()?;
    app::init_logger(config.level_filter())?;

    config.render.shape = Shape::Triangle;
    app::run(
        &config,
        &ShaderInput::Inline {
            vertex: VERTEX_SRC,
            fragment: FRAGMENT_SRC,
        },
    )
}

use anyhow::{anyhow, Result};
use log::{error, info};

use glpaint::{
    app,
    config::{self, SHADER_ENV},
    ShaderInput,
};

fn main() -> Result<()> {
    let config = config::load_or_create_config()?;
    app::init_logger(config.level_filter())?;

    let Some(shader_path) = config::shader_path_from_env() else {
        error!("{} must name a shader file", SHADER_ENV);
        return Err(anyhow!("{} is not set", SHADER_ENV));
    };
    info!("Drawing {:?} with {}", config.render.shape, shader_path.display());

    app::run(&config, &ShaderInput::File(shader_path))
}

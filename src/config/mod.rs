pub mod core;
pub mod rendering;
pub mod window;

pub use self::core::{
    load_or_create_config, shader_path_from_env, AppConfig, CONFIG_ENV, SHADER_ENV,
    SHADER_ENV_ALIAS,
};
pub use rendering::{RenderConfig, ShaderConfig};
pub use window::WindowConfig;

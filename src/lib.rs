pub mod asset;
pub mod engine;
pub mod error;
pub mod io;
pub mod renderer;
pub mod scene;
pub mod settings;

pub use engine::Engine;
pub use error::{EngineError, Result};
pub use settings::EngineSettings;

/// Install the env_logger backend at Info, adjustable through `RUST_LOG`.
/// Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

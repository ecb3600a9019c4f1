mod deepseek;
mod traits;
mod types;

pub use deepseek::DeepSeekClient;
pub use traits::ModelProvider;
pub use types::{FragmentStream, ModelError, ModelRequest, StreamFragment};

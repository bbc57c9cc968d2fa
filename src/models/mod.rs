pub mod experiment;
pub mod segmenter;
pub mod settings;

pub use experiment::*;
pub use segmenter::*;
pub use settings::*;

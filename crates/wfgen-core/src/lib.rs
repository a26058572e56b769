pub mod config;
pub mod error;
pub mod io;
pub mod package;
pub mod paths;
pub mod pipeline;
pub mod render;
pub mod scanner;
pub mod sync;
pub mod template;
pub mod workspace;

pub use error::{Result, WfgenError};

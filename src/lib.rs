pub mod cli;
pub mod error;
pub mod export;
pub mod extract;
pub mod git;
pub mod language;
pub mod logging;
pub mod model;
pub mod upload;
pub mod util;

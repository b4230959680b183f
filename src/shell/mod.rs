mod completer;
mod error;
mod executor;
pub(crate) mod parser;
mod readline;
mod resolver;
mod session;
#[allow(clippy::module_inception)]
mod shell;

pub use shell::Shell;

pub mod ast;
pub mod lexer;
#[allow(clippy::module_inception)]
pub mod parser;

pub use ast::{CommandLine, RedirectMode, RedirectStream, RedirectionPlan};
pub use parser::{Parser, RedirectOrder};

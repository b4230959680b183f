mod builtins;
#[allow(clippy::module_inception)]
mod executor;

pub use builtins::Builtin;
pub use executor::Executor;

/// 一条命令执行后 shell 该做什么
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Exit(i32),
}

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// shell 报告给用户的所有错误，都不会结束会话
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("invalid redirection: expected `<command> <operator> <file>`")]
    InvalidRedirection,

    #[error("{name}: not found")]
    NotFound { name: String },

    #[error("{name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("{name}: terminated by {signal}")]
    Terminated { name: String, signal: String },

    #[error("{}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cd: {path}: No such file or directory")]
    Cd { path: String },

    #[error("write error: {0}")]
    Output(#[from] io::Error),

    #[error("type: usage: type <command>")]
    TypeUsage,

    #[error("unknown redirect order `{0}` (expected `left-to-right` or `operator-order`)")]
    RedirectOrder(String),
}

impl ShellError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ShellError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = ShellError::NotFound {
            name: String::from("nope"),
        };
        assert_eq!(err.to_string(), "nope: not found");

        let err = ShellError::Cd {
            path: String::from("nonexistent_dir"),
        };
        assert_eq!(
            err.to_string(),
            "cd: nonexistent_dir: No such file or directory"
        );

        let err = ShellError::io(
            "/tmp/out.txt",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "/tmp/out.txt: denied");
    }
}

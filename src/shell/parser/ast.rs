use std::fmt;
use std::path::PathBuf;

/// 解析后的一行输入，`args[0]` 总是命令名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub name: String,
    pub args: Vec<String>,
    pub redirect: Option<RedirectionPlan>,
}

impl CommandLine {
    /// `args` 为空时返回 `None`
    pub fn new(args: Vec<String>) -> Option<Self> {
        let name = args.first()?.clone();
        Some(Self {
            name,
            args,
            redirect: None,
        })
    }

    /// 不含命令名的参数
    pub fn arguments(&self) -> &[String] {
        &self.args[1..]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectStream {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectMode {
    Truncate,
    Append,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectionPlan {
    pub stream: RedirectStream,
    pub mode: RedirectMode,
    pub target: PathBuf,
}

impl RedirectionPlan {
    /// 从 `2>>` 这样的操作符构造重定向计划
    pub fn from_operator(operator: &str, target: impl Into<PathBuf>) -> Self {
        let stream = if operator.starts_with('2') {
            RedirectStream::Stderr
        } else {
            RedirectStream::Stdout
        };
        let mode = if operator.contains(">>") {
            RedirectMode::Append
        } else {
            RedirectMode::Truncate
        };
        Self {
            stream,
            mode,
            target: target.into(),
        }
    }
}

impl fmt::Display for RedirectionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fd = match self.stream {
            RedirectStream::Stdout => "1",
            RedirectStream::Stderr => "2",
        };
        let op = match self.mode {
            RedirectMode::Truncate => ">",
            RedirectMode::Append => ">>",
        };
        write!(f, "{}{} {}", fd, op, self.target.display())
    }
}

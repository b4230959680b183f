use std::env;
use std::path::{Path, PathBuf};

use crate::utils::path::{search_path, split_search_path};

/// 每个 shell 实例的可变状态：工作目录和家目录
#[derive(Debug, Clone)]
pub struct Session {
    pub cwd: PathBuf,
    pub home: Option<PathBuf>,
    /// 固定的 PATH 值；为 `None` 时每次都从环境变量读取
    pub path_override: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        Self::with_dirs(cwd, env::var_os("HOME").map(PathBuf::from))
    }

    pub fn with_dirs(cwd: impl Into<PathBuf>, home: Option<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            home,
            path_override: None,
        }
    }

    pub fn search_path(&self) -> Vec<PathBuf> {
        match &self.path_override {
            Some(value) => split_search_path(value, &self.cwd),
            None => search_path(&self.cwd),
        }
    }

    /// 相对路径以会话的工作目录为基准
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        self.cwd.join(path)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

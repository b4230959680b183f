use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use log::{debug, error, warn};

use crate::shell::executor::Builtin;
use crate::utils::path::{is_executable, regular_files};

const REPAIRED_MODE: u32 = 0o755;

/// 命令解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedCommand {
    Builtin(Builtin),
    External(PathBuf),
    /// 找到了同名文件，但没有可执行位
    NotExecutable(PathBuf),
    NotFound,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResolverOptions {
    pub repair_exec: bool,
    pub create_dirs: bool,
}

pub struct PathResolver {
    options: ResolverOptions,
}

impl PathResolver {
    pub fn new(options: ResolverOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ResolverOptions {
        self.options
    }

    /// 先查内建命令，再查 PATH
    pub fn resolve_command(&self, name: &str, search_path: &[PathBuf]) -> ResolvedCommand {
        match name.parse::<Builtin>() {
            Ok(builtin) => ResolvedCommand::Builtin(builtin),
            Err(_) => self.resolve(name, search_path),
        }
    }

    /// 按顺序搜索 `search_path`，第一个同名可执行文件胜出，后面的目录不再查看
    pub fn resolve(&self, name: &str, search_path: &[PathBuf]) -> ResolvedCommand {
        let mut not_executable = None;

        for dir in search_path {
            let entries = match regular_files(dir, self.options.create_dirs) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("扫描目录失败: {}: {}", dir.display(), e);
                    continue;
                }
            };

            for entry in entries.into_iter().filter(|entry| entry.name == name) {
                let metadata = match fs::metadata(&entry.path) {
                    Ok(metadata) => metadata,
                    Err(e) => {
                        error!("metadata error: {}: {}", entry.path.display(), e);
                        continue;
                    }
                };

                if is_executable(&metadata) {
                    debug!("找到命令: {} -> {}", name, entry.path.display());
                    return ResolvedCommand::External(entry.path);
                }

                if self.options.repair_exec {
                    match repair(&entry.path) {
                        Ok(()) => warn!("已修复可执行权限: {}", entry.path.display()),
                        Err(e) => warn!("修复可执行权限失败: {}: {}", entry.path.display(), e),
                    }
                }
                not_executable.get_or_insert(entry.path);
            }
        }

        match not_executable {
            Some(path) => ResolvedCommand::NotExecutable(path),
            None => ResolvedCommand::NotFound,
        }
    }
}

fn repair(path: &Path) -> io::Result<()> {
    fs::set_permissions(path, fs::Permissions::from_mode(REPAIRED_MODE))
}

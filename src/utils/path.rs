use std::env;
use std::fs::{self, Metadata};
use std::io::{self, ErrorKind};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use log::{debug, warn};

pub const EXEC_BITS: u32 = 0o111;

/// PATH 中的一个普通文件（目录以外的条目，符号链接会被跟随）
#[derive(Debug, Clone)]
pub struct PathEntry {
    pub name: String,
    pub path: PathBuf,
}

/// 每次调用都重新读取 PATH，不做缓存
pub fn search_path(cwd: &Path) -> Vec<PathBuf> {
    match env::var("PATH") {
        Ok(value) => split_search_path(&value, cwd),
        Err(e) => {
            warn!("读取 PATH 失败: {}", e);
            Vec::new()
        }
    }
}

pub fn split_search_path(value: &str, cwd: &Path) -> Vec<PathBuf> {
    value
        .split(':')
        .filter(|dir| !dir.is_empty())
        .map(|dir| cwd.join(dir))
        .collect()
}

pub fn is_executable(metadata: &Metadata) -> bool {
    metadata.permissions().mode() & EXEC_BITS != 0
}

/// 列出目录中的普通文件。`create` 为 true 时，不存在的目录会被创建；
/// 否则返回空列表。
pub fn regular_files(dir: &Path, create: bool) -> io::Result<Vec<PathEntry>> {
    if create && !dir.exists() {
        debug!("创建 PATH 目录: {}", dir.display());
        fs::create_dir_all(dir)?;
    }

    let list = match fs::read_dir(dir) {
        Ok(list) => list,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut entries = Vec::new();
    for entry in list.flatten() {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        let path = entry.path();
        // 失效的符号链接取不到 metadata，直接跳过
        match fs::metadata(&path) {
            Ok(meta) if !meta.is_dir() => entries.push(PathEntry { name, path }),
            _ => continue,
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_split_search_path() {
        let cwd = Path::new("/home/user");
        let dirs = split_search_path("/usr/bin::bin:/opt/tools", cwd);
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/usr/bin"),
                PathBuf::from("/home/user/bin"),
                PathBuf::from("/opt/tools"),
            ]
        );
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_regular_files_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("tool")).unwrap();
        fs::create_dir(dir.path().join("subdir")).unwrap();

        let entries = regular_files(dir.path(), false).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["tool"]);
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_regular_files_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        assert!(regular_files(&missing, false).unwrap().is_empty());
        assert!(!missing.exists());

        assert!(regular_files(&missing, true).unwrap().is_empty());
        assert!(missing.is_dir());
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_is_executable() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("script");
        File::create(&file).unwrap();

        fs::set_permissions(&file, fs::Permissions::from_mode(0o644)).unwrap();
        assert!(!is_executable(&fs::metadata(&file).unwrap()));

        fs::set_permissions(&file, fs::Permissions::from_mode(0o744)).unwrap();
        assert!(is_executable(&fs::metadata(&file).unwrap()));
    }
}

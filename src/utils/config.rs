use dotenv::dotenv;
use rustyline::EditMode;
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::shell::parser::RedirectOrder;

pub struct Config {
    pub name: String,
    pub config_dir: PathBuf,
    pub history_file: PathBuf,
    pub editor_mode: String,
    pub logger_level: String,
    pub logger_dir: PathBuf,
    pub color: bool,
    /// 查找命令时把同名但不可执行的文件 chmod 为 0755
    pub repair_exec: bool,
    /// 扫描 PATH 时创建不存在的目录
    pub create_path_dirs: bool,
    pub redirect_order: RedirectOrder,
}

impl Config {
    fn get_config_dir() -> PathBuf {
        if let Ok(home) = env::var("HOME") {
            PathBuf::from(home).join(".config/minish")
        } else {
            PathBuf::from("tmp")
        }
    }

    fn default() -> Self {
        let config_dir = Self::get_config_dir();
        Config {
            name: String::from("minish"),
            history_file: config_dir.join(".minish_history"),
            editor_mode: String::from("emacs"),
            logger_level: String::from("info"),
            logger_dir: config_dir.join("logs"),
            color: false,
            repair_exec: false,
            create_path_dirs: false,
            redirect_order: RedirectOrder::LeftToRight,
            config_dir,
        }
    }

    pub fn new() -> Self {
        // 优先加载环境变量文件
        if cfg!(debug_assertions) {
            dotenv::from_filename(".env.development").ok();
        } else {
            dotenv().ok();
        }

        let mut config = Config::default();

        if let Ok(editor) = env::var("MINISH_EDITOR") {
            config.editor_mode = editor;
        }

        if let Ok(history) = env::var("MINISH_HISTORY") {
            config.history_file = PathBuf::from(history);
        }

        if let Ok(level) = env::var("MINISH_LOG_LEVEL") {
            config.logger_level = level;
        }

        if let Ok(dir) = env::var("MINISH_LOG_DIR") {
            config.logger_dir = PathBuf::from(dir);
        }

        if let Some(color) = env_flag("MINISH_COLOR") {
            config.color = color;
        }

        if let Some(repair) = env_flag("MINISH_REPAIR_EXEC") {
            config.repair_exec = repair;
        }

        if let Some(create) = env_flag("MINISH_CREATE_PATH_DIRS") {
            config.create_path_dirs = create;
        }

        if let Ok(order) = env::var("MINISH_REDIRECT_ORDER") {
            match order.parse::<RedirectOrder>() {
                Ok(order) => config.redirect_order = order,
                Err(e) => eprintln!("minish: MINISH_REDIRECT_ORDER: {}", e),
            }
        }

        // 确保历史文件目录存在
        if let Some(parent) = config.history_file.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!(
                    "minish: cannot create history directory {}: {}",
                    parent.display(),
                    e
                );
            }
        }

        config
    }

    pub fn get_edit_mode(&self) -> EditMode {
        match self.editor_mode.to_lowercase().as_str() {
            "vi" => EditMode::Vi,
            _ => EditMode::Emacs,
        }
    }
}

fn env_flag(key: &str) -> Option<bool> {
    env::var(key).ok().and_then(|value| parse_flag(&value))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag("YES"), Some(true));
        assert_eq!(parse_flag(" on "), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag(""), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_edit_mode() {
        let mut config = Config::default();
        assert_eq!(config.get_edit_mode(), EditMode::Emacs);
        config.editor_mode = String::from("VI");
        assert_eq!(config.get_edit_mode(), EditMode::Vi);
    }

    #[test]
    fn test_defaults_are_conservative() {
        let config = Config::default();
        assert!(!config.repair_exec);
        assert!(!config.create_path_dirs);
        assert_eq!(config.redirect_order, RedirectOrder::LeftToRight);
        assert!(config.history_file.ends_with(".minish_history"));
    }
}

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::shell::executor::Builtin;
use crate::utils::path::{regular_files, search_path, split_search_path};

/// 一次 Tab 之后应该做的事
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionAction {
    /// 响铃，不补全
    Bell,
    /// 补全为唯一的候选（带结尾空格）
    Complete(String),
    /// 第二次连续 Tab：打印全部候选
    List(Vec<String>),
}

/// 连续 Tab 计数。补全上下文（光标前的文本）变化时清零。
#[derive(Debug, Default)]
pub struct CompletionState {
    tabs: usize,
    context: Option<String>,
}

impl CompletionState {
    pub fn tabs(&self) -> usize {
        self.tabs
    }

    pub fn advance(&mut self, context: &str, matches: Vec<String>) -> CompletionAction {
        if self.context.as_deref() != Some(context) {
            self.tabs = 0;
            self.context = Some(context.to_string());
        }

        match matches.as_slice() {
            [] => {
                self.tabs = 0;
                CompletionAction::Bell
            }
            [only] => {
                self.tabs = 0;
                CompletionAction::Complete(only.clone())
            }
            _ => {
                self.tabs += 1;
                if self.tabs >= 2 {
                    self.tabs = 0;
                    CompletionAction::List(matches)
                } else {
                    CompletionAction::Bell
                }
            }
        }
    }
}

/// 内建命令加上 PATH 中所有普通文件的名字，不检查可执行位
pub fn candidates(search_path: &[PathBuf], create_dirs: bool) -> BTreeSet<String> {
    let mut names: BTreeSet<String> = Builtin::names().map(String::from).collect();
    for dir in search_path {
        match regular_files(dir, create_dirs) {
            Ok(entries) => names.extend(entries.into_iter().map(|entry| entry.name)),
            Err(e) => warn!("扫描目录失败: {}: {}", dir.display(), e),
        }
    }
    names
}

/// 前缀匹配（区分大小写），排序后每项带一个结尾空格
pub fn matches(prefix: &str, candidates: &BTreeSet<String>) -> Vec<String> {
    let mut matches: Vec<String> = candidates
        .iter()
        .filter(|name| name.starts_with(prefix))
        .map(|name| format!("{} ", name))
        .collect();
    matches.sort();
    matches
}

pub struct ShellHelper {
    state: RefCell<CompletionState>,
    cwd: PathBuf,
    create_dirs: bool,
    path_override: Option<String>,
}

impl ShellHelper {
    pub fn new(cwd: impl Into<PathBuf>, create_dirs: bool) -> Self {
        Self {
            state: RefCell::new(CompletionState::default()),
            cwd: cwd.into(),
            create_dirs,
            path_override: None,
        }
    }

    pub fn set_cwd(&mut self, cwd: &Path) {
        self.cwd = cwd.to_path_buf();
    }

    /// 新的一行开始时清零连续 Tab 计数
    pub fn reset_completion(&self) {
        self.state.replace(CompletionState::default());
    }

    pub fn set_path_override(&mut self, path: Option<String>) {
        self.path_override = path;
    }

    fn search_path(&self) -> Vec<PathBuf> {
        match &self.path_override {
            Some(value) => split_search_path(value, &self.cwd),
            None => search_path(&self.cwd),
        }
    }

    /// 处理一次 Tab，返回替换起点和动作
    pub fn next_action(&self, line: &str, pos: usize) -> (usize, CompletionAction) {
        let before = &line[..pos];
        let start = before
            .rfind(|c: char| c.is_ascii_whitespace())
            .map_or(0, |i| i + 1);

        // 只补全命令名
        if !before[..start].trim().is_empty() {
            return (pos, CompletionAction::Bell);
        }

        let word = &before[start..];
        let candidates = candidates(&self.search_path(), self.create_dirs);
        let matches = matches(word, &candidates);
        let count = matches.len();
        let mut state = self.state.borrow_mut();
        let action = state.advance(before, matches);
        debug!("补全 {:?}: {} 个候选，连续 Tab {} 次", word, count, state.tabs());
        (start, action)
    }
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, action) = self.next_action(line, pos);
        match action {
            // 没有候选时由 rustyline 响铃
            CompletionAction::Bell => Ok((start, Vec::new())),
            CompletionAction::Complete(candidate) => Ok((
                start,
                vec![Pair {
                    display: candidate.clone(),
                    replacement: candidate,
                }],
            )),
            CompletionAction::List(matches) => {
                let list: Vec<&str> = matches.iter().map(|m| m.trim_end()).collect();
                let mut stdout = io::stdout();
                write!(stdout, "\n{}\n", list.join(" "))?;
                stdout.flush()?;

                // 原样替换，让 rustyline 在新行重绘提示符
                let word = line[start..pos].to_string();
                Ok((
                    start,
                    vec![Pair {
                        display: word.clone(),
                        replacement: word,
                    }],
                ))
            }
        }
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

impl Helper for ShellHelper {}

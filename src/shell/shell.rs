use log::{debug, error, info, warn};
use std::error::Error;
use std::io::Write;

use crate::shell::completer::ShellHelper;
use crate::shell::error::ShellError;
use crate::shell::executor::{Executor, Outcome};
use crate::shell::parser::Parser;
use crate::shell::readline::{ReadlineError, ReadlineManager};
use crate::shell::resolver::{PathResolver, ResolverOptions};
use crate::shell::session::Session;
use crate::utils::config::Config;
use crate::utils::theme::{load_theme, Theme};

pub struct Shell<'a> {
    theme: Theme,
    readline: ReadlineManager<'a>,
    parser: Parser,
    executor: Executor,
    session: Session,
}

impl<'a> Shell<'a> {
    pub fn new(config: &'a Config) -> Result<Self, Box<dyn Error>> {
        let session = Session::new();
        let options = ResolverOptions {
            repair_exec: config.repair_exec,
            create_dirs: config.create_path_dirs,
        };
        let helper = ShellHelper::new(&session.cwd, options.create_dirs);
        debug!("重定向优先级: {}", config.redirect_order);

        Ok(Self {
            theme: load_theme(config.color),
            readline: ReadlineManager::new(config, helper)?,
            parser: Parser::new(config.redirect_order),
            executor: Executor::new(PathResolver::new(options)),
            session,
        })
    }

    /// 运行交互循环，返回进程退出码
    pub fn run(&mut self) -> Result<i32, Box<dyn Error>> {
        debug!("初始化 shell...");
        self.readline.load_history()?;
        debug!(
            "shell 准备就绪，工作目录 {}，{:?}",
            self.session.cwd.display(),
            self.executor.resolver().options()
        );

        let code = self.run_loop()?;
        self.readline.save_history()?;

        debug!("退出 shell，退出码 {}", code);
        Ok(code)
    }

    fn run_loop(&mut self) -> Result<i32, Box<dyn Error>> {
        loop {
            std::io::stdout().flush()?;
            // 上一行的 Tab 不延续到新的一行
            if let Some(helper) = self.readline.helper_mut() {
                helper.reset_completion();
            }

            match self.readline.readline(&self.theme.prompt) {
                Ok(line) => {
                    if let Outcome::Exit(code) = self.handle_input(&line) {
                        info!("exit 内建命令，退出码 {}", code);
                        return Ok(code);
                    }
                }
                Err(ReadlineError::Eof) => {
                    warn!("接收到 EOF，退出 shell...");
                    return Ok(0);
                }
                Err(ReadlineError::Interrupted) => {
                    warn!("接收到中断信号...");
                    println!("{}", (self.theme.notice_style)(String::from("^C")));
                }
                Err(err) => {
                    error!("读取输入失败: {}", err);
                    eprintln!("{}", (self.theme.error_style)(format!("minish: {}", err)));
                }
            }
        }
    }

    fn handle_input(&mut self, line: &str) -> Outcome {
        if line.trim().is_empty() {
            return Outcome::Continue;
        }

        if let Err(e) = self.readline.add_history(line) {
            warn!("添加历史记录失败: {}", e);
        }

        let outcome = match self.parser.parse(line) {
            Ok(Some(command)) => self.executor.dispatch(&mut self.session, &command),
            Ok(None) => Ok(Outcome::Continue),
            Err(e) => Err(e),
        };

        // cd 可能改变了工作目录，补全需要同步
        let cwd = self.session.cwd.clone();
        if let Some(helper) = self.readline.helper_mut() {
            helper.set_cwd(&cwd);
        }

        outcome.unwrap_or_else(|e| {
            self.report(&e);
            Outcome::Continue
        })
    }

    fn report(&self, err: &ShellError) {
        match err {
            ShellError::NotFound { .. } | ShellError::Cd { .. } => debug!("{}", err),
            _ => warn!("{}", err),
        }
        eprintln!("{}", (self.theme.error_style)(err.to_string()));
    }
}

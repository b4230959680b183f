use std::fs::OpenOptions;
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::Path;
use std::process::{self, Stdio};

use log::{debug, warn};
use nix::sys::signal::Signal;

use super::{Builtin, Outcome};
use crate::shell::error::ShellError;
use crate::shell::parser::{CommandLine, RedirectMode, RedirectStream, RedirectionPlan};
use crate::shell::resolver::{PathResolver, ResolvedCommand};
use crate::shell::session::Session;

const OUTPUT_FILE_MODE: u32 = 0o644;

pub struct Executor {
    resolver: PathResolver,
}

impl Executor {
    pub fn new(resolver: PathResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// 解析命令名后执行
    pub fn dispatch(
        &self,
        session: &mut Session,
        command: &CommandLine,
    ) -> Result<Outcome, ShellError> {
        let resolved = self
            .resolver
            .resolve_command(&command.name, &session.search_path());
        debug!("命令解析: {} -> {:?}", command.name, resolved);
        self.execute(session, resolved, command)
    }

    pub fn execute(
        &self,
        session: &mut Session,
        resolved: ResolvedCommand,
        command: &CommandLine,
    ) -> Result<Outcome, ShellError> {
        match resolved {
            ResolvedCommand::Builtin(builtin) => {
                let mut stdout = io::stdout();
                let mut stderr = io::stderr();
                self.run_builtin(builtin, session, command, &mut stdout, &mut stderr)
            }
            ResolvedCommand::External(path) => self.spawn(session, &path, command),
            ResolvedCommand::NotExecutable(path) => {
                debug!("{} 存在但不可执行", path.display());
                Err(ShellError::NotFound {
                    name: command.name.clone(),
                })
            }
            ResolvedCommand::NotFound => Err(ShellError::NotFound {
                name: command.name.clone(),
            }),
        }
    }

    /// 内建命令在进程内执行，被重定向的流先写进缓冲区
    fn run_builtin(
        &self,
        builtin: Builtin,
        session: &mut Session,
        command: &CommandLine,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<Outcome, ShellError> {
        let plan = command.redirect.as_ref();
        let mut captured = Vec::new();
        let result = {
            let (out, err): (&mut dyn Write, &mut dyn Write) = match plan.map(|plan| plan.stream) {
                Some(RedirectStream::Stdout) => (&mut captured, &mut *stderr),
                Some(RedirectStream::Stderr) => (&mut *stdout, &mut captured),
                None => (&mut *stdout, &mut *stderr),
            };
            match builtin.run(command.arguments(), session, &self.resolver, out) {
                // 错误输出被重定向时，错误信息写进文件
                Err(e) if plan.is_some_and(|p| p.stream == RedirectStream::Stderr) => {
                    writeln!(err, "{}", e)?;
                    Ok(Outcome::Continue)
                }
                result => result,
            }
        };

        if let Some(plan) = plan {
            if let Err(redirect_err) = write_redirect(plan, session, &captured) {
                // 重定向失败会覆盖内建命令自己的错误，先把它报出来
                if let Err(e) = &result {
                    warn!("{}", e);
                    writeln!(stderr, "{}", e)?;
                }
                return Err(redirect_err);
            }
        }
        result
    }

    fn spawn(
        &self,
        session: &Session,
        path: &Path,
        command: &CommandLine,
    ) -> Result<Outcome, ShellError> {
        let plan = command.redirect.as_ref();
        let capture = |stream: RedirectStream| {
            if plan.is_some_and(|p: &RedirectionPlan| p.stream == stream) {
                Stdio::piped()
            } else {
                Stdio::inherit()
            }
        };

        debug!(
            "执行外部命令: {} ({})",
            shell_words::join(&command.args),
            path.display()
        );
        let output = process::Command::new(path)
            .arg0(&command.name)
            .args(command.arguments())
            .current_dir(&session.cwd)
            .stdin(Stdio::inherit())
            .stdout(capture(RedirectStream::Stdout))
            .stderr(capture(RedirectStream::Stderr))
            .output()
            .map_err(|source| ShellError::Spawn {
                name: command.name.clone(),
                source,
            })?;

        if let Some(plan) = plan {
            let captured = match plan.stream {
                RedirectStream::Stdout => &output.stdout,
                RedirectStream::Stderr => &output.stderr,
            };
            write_redirect(plan, session, captured)?;
        }

        if let Some(signal) = output.status.signal() {
            let signal = Signal::try_from(signal)
                .map(|s| s.as_str().to_string())
                .unwrap_or_else(|_| format!("signal {}", signal));
            warn!("{} 被信号终止: {}", command.name, signal);
            return Err(ShellError::Terminated {
                name: command.name.clone(),
                signal,
            });
        }

        if !output.status.success() {
            debug!("{} 退出码: {:?}", command.name, output.status.code());
        }
        Ok(Outcome::Continue)
    }
}

/// 把捕获的输出写入重定向目标。单引号会被去掉。
fn write_redirect(
    plan: &RedirectionPlan,
    session: &Session,
    captured: &[u8],
) -> Result<(), ShellError> {
    let target = session.resolve_path(&plan.target);
    let content: Vec<u8> = captured.iter().copied().filter(|b| *b != b'\'').collect();

    let mut options = OpenOptions::new();
    options.create(true).mode(OUTPUT_FILE_MODE);
    match plan.mode {
        RedirectMode::Truncate => options.write(true).truncate(true),
        RedirectMode::Append => options.append(true),
    };

    debug!("写入重定向 {} ({} 字节)", plan, content.len());
    options
        .open(&target)
        .and_then(|mut file| file.write_all(&content))
        .map_err(|source| ShellError::io(target, source))
}

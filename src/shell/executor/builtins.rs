use std::fmt;
use std::fs;
use std::io::Write;
use std::str::FromStr;

use log::debug;

use super::Outcome;
use crate::shell::error::ShellError;
use crate::shell::resolver::{PathResolver, ResolvedCommand};
use crate::shell::session::Session;

/// `exit` 的退出码
pub const EXIT_STATUS: i32 = 127;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Echo,
    Exit,
    Type,
    Pwd,
    Cd,
}

impl Builtin {
    pub const ALL: [Builtin; 5] = [
        Builtin::Echo,
        Builtin::Exit,
        Builtin::Type,
        Builtin::Pwd,
        Builtin::Cd,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Echo => "echo",
            Builtin::Exit => "exit",
            Builtin::Type => "type",
            Builtin::Pwd => "pwd",
            Builtin::Cd => "cd",
        }
    }

    pub fn names() -> impl Iterator<Item = &'static str> {
        Self::ALL.iter().map(|builtin| builtin.name())
    }

    /// 执行内建命令，`args` 不含命令名
    pub fn run(
        &self,
        args: &[String],
        session: &mut Session,
        resolver: &PathResolver,
        out: &mut dyn Write,
    ) -> Result<Outcome, ShellError> {
        debug!("执行内建命令: {} {:?}", self, args);
        match self {
            Builtin::Echo => echo(args, out),
            Builtin::Exit => Ok(Outcome::Exit(EXIT_STATUS)),
            Builtin::Type => type_of(args, session, resolver, out),
            Builtin::Pwd => {
                writeln!(out, "{}", session.cwd.display())?;
                Ok(Outcome::Continue)
            }
            Builtin::Cd => cd(args, session),
        }
    }
}

impl FromStr for Builtin {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|builtin| builtin.name() == s)
            .ok_or(())
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn echo(args: &[String], out: &mut dyn Write) -> Result<Outcome, ShellError> {
    writeln!(out, "{}", args.join(" ").replace('\'', ""))?;
    Ok(Outcome::Continue)
}

fn type_of(
    args: &[String],
    session: &Session,
    resolver: &PathResolver,
    out: &mut dyn Write,
) -> Result<Outcome, ShellError> {
    let [name] = args else {
        return Err(ShellError::TypeUsage);
    };

    if name.parse::<Builtin>().is_ok() {
        writeln!(out, "{} is a shell builtin", name)?;
        return Ok(Outcome::Continue);
    }

    match resolver.resolve(name, &session.search_path()) {
        ResolvedCommand::External(path) => {
            writeln!(out, "{} is {}", name, path.display())?;
            Ok(Outcome::Continue)
        }
        _ => Err(ShellError::NotFound { name: name.clone() }),
    }
}

fn cd(args: &[String], session: &mut Session) -> Result<Outcome, ShellError> {
    let target = args.first().map(String::as_str).unwrap_or("~");
    let home = session
        .home
        .as_ref()
        .map(|home| home.to_string_lossy().into_owned());
    let expanded = shellexpand::tilde_with_context(target, || home);

    let path = session.resolve_path(expanded.as_ref());
    if !path.is_dir() {
        return Err(ShellError::Cd {
            path: target.to_string(),
        });
    }

    session.cwd = fs::canonicalize(&path).unwrap_or(path);
    debug!("切换工作目录: {}", session.cwd.display());
    Ok(Outcome::Continue)
}

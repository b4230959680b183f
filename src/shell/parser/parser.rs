use std::fmt;
use std::str::FromStr;

use log::debug;

use super::ast::{CommandLine, RedirectionPlan};
use super::lexer::tokenize;
use crate::shell::error::ShellError;

/// 重定向操作符，按固定优先级排列
pub const REDIRECT_OPERATORS: [&str; 6] = [">", "1>", "1>>", ">>", "2>", "2>>"];

/// 一行中出现多个重定向操作符时，决定采用哪一个
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedirectOrder {
    /// 采用行中最先出现的操作符
    #[default]
    LeftToRight,
    /// 按 `REDIRECT_OPERATORS` 的顺序查找，第一个存在的操作符生效
    OperatorOrder,
}

impl FromStr for RedirectOrder {
    type Err = ShellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left-to-right" | "ltr" => Ok(RedirectOrder::LeftToRight),
            "operator-order" | "fixed" => Ok(RedirectOrder::OperatorOrder),
            other => Err(ShellError::RedirectOrder(other.to_string())),
        }
    }
}

impl fmt::Display for RedirectOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedirectOrder::LeftToRight => write!(f, "left-to-right"),
            RedirectOrder::OperatorOrder => write!(f, "operator-order"),
        }
    }
}

pub struct Parser {
    order: RedirectOrder,
}

impl Parser {
    pub fn new(order: RedirectOrder) -> Self {
        Self { order }
    }

    /// 解析一行输入。空行返回 `Ok(None)`。
    pub fn parse(&self, line: &str) -> Result<Option<CommandLine>, ShellError> {
        let Some(command) = tokenize(line) else {
            return Ok(None);
        };

        let (args, redirect) = self.plan(command.args)?;
        let mut command = match CommandLine::new(args) {
            Some(command) => command,
            None => return Err(ShellError::InvalidRedirection),
        };
        command.redirect = redirect;
        debug!("解析结果: {:?}", command);
        Ok(Some(command))
    }

    /// 找出重定向操作符，返回去掉操作符和目标文件后的参数
    pub fn plan(
        &self,
        mut args: Vec<String>,
    ) -> Result<(Vec<String>, Option<RedirectionPlan>), ShellError> {
        let Some(index) = self.find_operator(&args) else {
            return Ok((args, None));
        };

        // 至少需要: 命令 操作符 文件
        if args.len() < 3 || index == 0 || index + 1 >= args.len() {
            return Err(ShellError::InvalidRedirection);
        }

        let target = args.remove(index + 1);
        let operator = args.remove(index);

        Ok((args, Some(RedirectionPlan::from_operator(&operator, target))))
    }

    fn find_operator(&self, args: &[String]) -> Option<usize> {
        match self.order {
            RedirectOrder::LeftToRight => args
                .iter()
                .position(|arg| REDIRECT_OPERATORS.contains(&arg.as_str())),
            RedirectOrder::OperatorOrder => REDIRECT_OPERATORS
                .iter()
                .find_map(|op| args.iter().position(|arg| arg == op)),
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new(RedirectOrder::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::parser::ast::{RedirectMode, RedirectStream};
    use std::path::PathBuf;

    fn strings(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_plain_command() {
        let cmd = Parser::default().parse("ls -l").unwrap().unwrap();
        assert_eq!(cmd.name, "ls");
        assert_eq!(cmd.args, vec!["ls", "-l"]);
        assert!(cmd.redirect.is_none());
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_empty_line() {
        assert!(Parser::default().parse("  \n").unwrap().is_none());
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_each_operator() {
        let cases = [
            (">", RedirectStream::Stdout, RedirectMode::Truncate),
            ("1>", RedirectStream::Stdout, RedirectMode::Truncate),
            (">>", RedirectStream::Stdout, RedirectMode::Append),
            ("1>>", RedirectStream::Stdout, RedirectMode::Append),
            ("2>", RedirectStream::Stderr, RedirectMode::Truncate),
            ("2>>", RedirectStream::Stderr, RedirectMode::Append),
        ];
        for (op, stream, mode) in cases {
            let line = format!("echo hi {} out.txt", op);
            let cmd = Parser::default().parse(&line).unwrap().unwrap();
            assert_eq!(cmd.args, vec!["echo", "hi"], "operator {}", op);
            let plan = cmd.redirect.unwrap();
            assert_eq!(plan.stream, stream, "operator {}", op);
            assert_eq!(plan.mode, mode, "operator {}", op);
            assert_eq!(plan.target, PathBuf::from("out.txt"));
        }
    }

    #[test]
    fn test_too_few_tokens() {
        let parser = Parser::default();
        assert!(matches!(
            parser.plan(strings(&["ls", ">"])),
            Err(ShellError::InvalidRedirection)
        ));
        assert!(matches!(
            parser.plan(strings(&[">", "out.txt"])),
            Err(ShellError::InvalidRedirection)
        ));
        assert!(matches!(
            parser.plan(strings(&["echo", "hi", ">"])),
            Err(ShellError::InvalidRedirection)
        ));
        assert!(matches!(
            parser.plan(strings(&[">", "out.txt", "echo"])),
            Err(ShellError::InvalidRedirection)
        ));
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_operator_in_the_middle() {
        let (args, plan) = Parser::default()
            .plan(strings(&["cat", "a.txt", "2>", "err.txt", "-n"]))
            .unwrap();
        assert_eq!(args, vec!["cat", "a.txt", "-n"]);
        assert_eq!(plan.unwrap().target, PathBuf::from("err.txt"));
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_left_to_right_takes_earliest() {
        let parser = Parser::new(RedirectOrder::LeftToRight);
        let (args, plan) = parser
            .plan(strings(&["cmd", "2>", "err.txt", ">", "out.txt"]))
            .unwrap();
        let plan = plan.unwrap();
        assert_eq!(plan.stream, RedirectStream::Stderr);
        assert_eq!(plan.target, PathBuf::from("err.txt"));
        // 只处理一个重定向，另一个操作符保留为参数
        assert_eq!(args, vec!["cmd", ">", "out.txt"]);
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_operator_order_takes_list_position() {
        let parser = Parser::new(RedirectOrder::OperatorOrder);
        let (args, plan) = parser
            .plan(strings(&["cmd", "2>", "err.txt", ">", "out.txt"]))
            .unwrap();
        let plan = plan.unwrap();
        assert_eq!(plan.stream, RedirectStream::Stdout);
        assert_eq!(plan.target, PathBuf::from("out.txt"));
        assert_eq!(args, vec!["cmd", "2>", "err.txt"]);

        // 固定列表中 `1>` 排在 `>>` 前面
        let (_, plan) = parser
            .plan(strings(&["cmd", ">>", "a.txt", "1>", "b.txt"]))
            .unwrap();
        let plan = plan.unwrap();
        assert_eq!(plan.mode, RedirectMode::Truncate);
        assert_eq!(plan.target, PathBuf::from("b.txt"));
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_redirect_order_from_str() {
        assert_eq!(
            "operator-order".parse::<RedirectOrder>().unwrap(),
            RedirectOrder::OperatorOrder
        );
        assert_eq!(
            "Left-To-Right".parse::<RedirectOrder>().unwrap(),
            RedirectOrder::LeftToRight
        );
        assert!("sideways".parse::<RedirectOrder>().is_err());
    }

    #[test]
    fn test_glued_operator_is_not_recognised() {
        let (args, plan) = match Parser::default().plan(strings(&["echo", "hi", "2>err"])) {
            Ok(result) => result,
            Err(e) => panic!("unexpected error: {}", e),
        };
        assert!(plan.is_none());
        assert_eq!(args.len(), 3);
    }
}

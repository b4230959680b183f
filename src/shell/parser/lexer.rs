use super::ast::CommandLine;

const QUOTES: [char; 2] = ['\'', '"'];

/// 按空白切分一行输入，去掉所有引号字符和行尾换行。
///
/// 引号只是被删除，并不保护其中的空白：`echo 'a  b'` 得到 `["echo", "a", "b"]`。
/// 空行返回 `None`。
pub fn tokenize(line: &str) -> Option<CommandLine> {
    let args: Vec<String> = line.split_whitespace().map(clean_token).collect();
    CommandLine::new(args)
}

fn clean_token(token: &str) -> String {
    token
        .trim_end_matches(|c: char| c == '\n' || c == '\r')
        .chars()
        .filter(|c| !QUOTES.contains(c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(line: &str) -> Vec<String> {
        tokenize(line).map(|cmd| cmd.args).unwrap_or_default()
    }

    #[test]
    fn test_simple_command() {
        let cmd = tokenize("ls -l /tmp");
        assert!(cmd.is_some());
        if let Some(cmd) = cmd {
            assert_eq!(cmd.name, "ls");
            assert_eq!(cmd.args, vec!["ls", "-l", "/tmp"]);
            assert_eq!(cmd.arguments(), ["-l", "/tmp"]);
            assert!(cmd.redirect.is_none());
        }
    }

    #[test]
    fn test_quotes_are_stripped() {
        assert_eq!(words("echo 'hello   world'"), vec!["echo", "hello", "world"]);
        assert_eq!(words(r#"echo "hi" it's"#), vec!["echo", "hi", "its"]);
        for word in words(r#"cat "a b" 'c' "#) {
            assert!(!word.contains('\'') && !word.contains('"'));
        }
    }

    #[test]
    fn test_newlines_are_stripped() {
        assert_eq!(words("pwd\n"), vec!["pwd"]);
        assert_eq!(words("echo hi\r\n"), vec!["echo", "hi"]);
    }

    #[test]
    fn test_empty_line() {
        assert!(tokenize("").is_none());
        assert!(tokenize("   \t \n").is_none());
    }

    #[test]
    fn test_redirect_tokens_survive() {
        assert_eq!(
            words("echo hi 2>> err.log"),
            vec!["echo", "hi", "2>>", "err.log"]
        );
    }
}

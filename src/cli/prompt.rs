// 対話的な確認プロンプト
//
// 標準入力が端末の場合のみ、破壊的変更ごとに y/N を尋ねます。

use crate::core::confirmation::{Confirmation, FixedAnswer};
use colored::Colorize;
use std::io::{self, BufRead, IsTerminal, Write};

/// 入力ストリームから回答を読む確認
pub struct PromptConfirmation<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptConfirmation<R, W> {
    /// 新しいPromptConfirmationを作成
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Confirmation for PromptConfirmation<R, W> {
    fn confirm(&mut self, prompt: &str) -> bool {
        if write!(self.output, "{} {} [y/N]: ", "?".yellow().bold(), prompt).is_err() {
            return false;
        }
        let _ = self.output.flush();

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => is_yes(&answer),
        }
    }
}

/// 回答が承認かどうか
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// 実行環境に応じた確認を作成
///
/// 標準入力が端末でない場合は常に拒否し、破壊的変更は保留として報告されます。
pub fn interactive_confirmation() -> Box<dyn Confirmation> {
    if io::stdin().is_terminal() {
        Box::new(PromptConfirmation::new(io::stdin().lock(), io::stderr()))
    } else {
        Box::new(FixedAnswer::never())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("n"));
        assert!(!is_yes(""));
        assert!(!is_yes("yep"));
    }

    #[test]
    fn test_prompt_reads_answers_in_order() {
        colored::control::set_override(false);
        let input = Cursor::new("y\nno\n");
        let mut output = Vec::new();

        {
            let mut confirmation = PromptConfirmation::new(input, &mut output);
            assert!(confirmation.confirm("drop column users.legacy"));
            assert!(!confirmation.confirm("drop table orders"));
            // 入力が尽きたら拒否
            assert!(!confirmation.confirm("drop table items"));
        }

        let written = String::from_utf8(output).unwrap();
        assert!(written.contains("drop column users.legacy [y/N]: "));
        assert!(written.contains("drop table orders"));
    }
}

// 破壊的変更の確認
//
// カラム削除・テーブル削除などの実行前に「はい/いいえ」を判断する能力を抽象化します。
// 照合ロジックは対話I/Oを持たず、呼び出し側がこの実装を渡します。

/// 確認プロンプト
pub trait Confirmation {
    /// 確認を求め、承認された場合に true を返す
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// 常に同じ答えを返す確認
///
/// `--force` 指定時や非対話環境で使用します。
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl FixedAnswer {
    /// 常に承認する
    pub fn always() -> Self {
        Self(true)
    }

    /// 常に拒否する
    pub fn never() -> Self {
        Self(false)
    }
}

impl Confirmation for FixedAnswer {
    fn confirm(&mut self, _prompt: &str) -> bool {
        self.0
    }
}

impl<F> Confirmation for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

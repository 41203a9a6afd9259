// modelsyncライブラリのエントリーポイント
//
// モジュール構造:
// - cli: CLIレイヤー（ユーザー入力の受付とコマンドルーティング）
// - core: コアドメインロジック（モデル定義、型マッピング、差分アクション）
// - adapters: データベース接続、イントロスペクション、DDL生成
// - services: ワークスペース探索、モデル読み込み、照合、適用

pub mod adapters;
pub mod cli;
pub mod core;
pub mod services;

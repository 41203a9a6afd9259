// サービス層
// ドメインロジックを実行するサービス群

pub mod config_loader;
pub mod model_loader;
pub mod project_loader;
pub mod schema_executor;
pub mod schema_reconciler;
pub mod workspace;

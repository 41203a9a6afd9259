// アダプター層
// 外部システム（データベース）との接続とDDL生成

pub mod connection_string;
pub mod database;
pub mod database_introspector;
pub mod sql_generator;
pub mod sql_quote;
pub mod type_mapping;

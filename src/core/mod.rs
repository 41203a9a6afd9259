// Core Domain
// モデル定義、型マッピング、差分アクション、適用レポートの純粋なドメインロジック

pub mod apply_report;
pub mod config;
pub mod confirmation;
pub mod error;
pub mod logical_type;
pub mod model;
pub mod naming;
pub mod schema_diff;

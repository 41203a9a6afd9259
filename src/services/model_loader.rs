// モデル読み込みサービス
//
// モデルファイル（YAML）をテンプレート展開したうえで解析し、TableSpec に変換します。
// YAML構造と内部モデルを分離するため、DTOを経由して検証します。

use crate::core::config::Dialect;
use crate::core::error::{ModelError, TypeError};
use crate::core::logical_type::LogicalType;
use crate::core::model::{ColumnSpec, TableRef, TableSpec};
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// テンプレート変数のパターン（`{{ name }}`）
const TEMPLATE_PATTERN: &str = r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}";

/// YAML モデル用DTO
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ModelDto {
    name: Option<String>,
    description: Option<String>,
    schema: Option<String>,
    columns: Option<Vec<ColumnDto>>,
}

/// YAML カラム定義用DTO
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ColumnDto {
    name: Option<String>,
    #[serde(rename = "type")]
    column_type: Option<String>,
    length: Option<u32>,
    scale: Option<u32>,
    #[serde(default)]
    primary_key: bool,
    #[serde(default)]
    auto_increment: bool,
    nullable: Option<bool>,
}

/// モデル読み込みサービス
#[derive(Debug, Clone, Default)]
pub struct ModelLoader {
    /// テンプレート変数（設定ファイルの `context`）
    context: BTreeMap<String, String>,
}

impl ModelLoader {
    /// 新しいModelLoaderを作成
    pub fn new(context: BTreeMap<String, String>) -> Self {
        Self { context }
    }

    /// モデルファイルを読み込む
    ///
    /// # Arguments
    ///
    /// * `path` - モデルファイルのパス
    ///
    /// # Returns
    ///
    /// 読み込んだテーブル定義
    ///
    /// # Errors
    ///
    /// - ファイルの読み込みに失敗した場合
    /// - 未知のテンプレート変数を含む場合
    /// - 必須項目が欠けている、またはカラム名が重複している場合
    /// - カラムの型が不正な場合
    pub fn load_model(&self, path: &Path) -> Result<TableSpec, ModelError> {
        let content = fs::read_to_string(path).map_err(|e| ModelError::Read {
            path: path.display().to_string(),
            cause: e.to_string(),
        })?;

        let mut table = self.parse_model(&content, path)?;
        table.source = Some(path.to_path_buf());
        Ok(table)
    }

    /// 複数のモデルファイルを読み込む
    ///
    /// 同じテーブル（スキーマ + 名前）を定義するモデルが複数ある場合はエラーです。
    /// スキーマを扱わない方言では、モデルの `schema` は無視されます。
    ///
    /// # Arguments
    ///
    /// * `paths` - モデルファイルのパス
    /// * `dialect` - 接続先のデータベース方言
    /// * `default_schema` - モデルにスキーマが無い場合に使うスキーマ
    pub fn load_models(
        &self,
        paths: &[PathBuf],
        dialect: Dialect,
        default_schema: Option<&str>,
    ) -> Result<Vec<TableSpec>, ModelError> {
        let mut tables = paths
            .iter()
            .map(|path| self.load_model(path))
            .collect::<Result<Vec<_>, _>>()?;

        let default_schema = if dialect.supports_schemas() {
            default_schema
        } else {
            for table in &mut tables {
                if let Some(schema) = table.schema.take() {
                    warn!(
                        table = %table.name,
                        schema = %schema,
                        dialect = %dialect,
                        "Ignoring model schema: dialect has no schemas"
                    );
                }
            }
            None
        };

        let mut sources: BTreeMap<TableRef, Vec<String>> = BTreeMap::new();
        for table in &tables {
            sources
                .entry(table.table_ref(default_schema))
                .or_default()
                .push(
                    table
                        .source
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default(),
                );
        }

        if let Some((table, paths)) = sources.into_iter().find(|(_, paths)| paths.len() > 1) {
            return Err(ModelError::DuplicateTable {
                table: table.to_string(),
                paths,
            });
        }

        Ok(tables)
    }

    /// モデルの内容を解析
    ///
    /// `path` はテーブル名の既定値とエラーメッセージに使用します。
    pub fn parse_model(&self, content: &str, path: &Path) -> Result<TableSpec, ModelError> {
        let rendered = self.render_template(content, path)?;

        let dto: ModelDto = serde_saphyr::from_str(&rendered).map_err(|e| ModelError::Malformed {
            path: path.display().to_string(),
            message: Self::format_parse_error(&e),
        })?;

        self.dto_to_table(dto, path)
    }

    /// `{{ name }}` を設定ファイルの context の値で置き換える
    fn render_template(&self, content: &str, path: &Path) -> Result<String, ModelError> {
        let re = Regex::new(TEMPLATE_PATTERN).map_err(|e| ModelError::Malformed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let mut rendered = String::with_capacity(content.len());
        let mut last = 0;
        for caps in re.captures_iter(content) {
            let (Some(whole), Some(variable)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let value =
                self.context
                    .get(variable.as_str())
                    .ok_or_else(|| ModelError::Template {
                        path: path.display().to_string(),
                        variable: variable.as_str().to_string(),
                    })?;

            rendered.push_str(&content[last..whole.start()]);
            rendered.push_str(value);
            last = whole.end();
        }
        rendered.push_str(&content[last..]);

        Ok(rendered)
    }

    /// serde_saphyrエラーを行番号付きのメッセージにする
    fn format_parse_error(error: &serde_saphyr::Error) -> String {
        let message = error.to_string();
        let line = Regex::new(r"line (\d+)")
            .ok()
            .and_then(|re| re.captures(&message))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());

        match line {
            Some(line) if !message.starts_with("line") => format!("line {}: {}", line, message),
            _ => message,
        }
    }

    /// DTOを検証してTableSpecに変換
    fn dto_to_table(&self, dto: ModelDto, path: &Path) -> Result<TableSpec, ModelError> {
        let malformed = |message: String| ModelError::Malformed {
            path: path.display().to_string(),
            message,
        };

        let name = match dto.name {
            Some(name) => name.trim().to_string(),
            None => path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(|stem| stem.to_lowercase())
                .unwrap_or_default(),
        };
        if name.is_empty() {
            return Err(malformed("table name must not be empty".to_string()));
        }

        let columns = dto
            .columns
            .ok_or_else(|| malformed("missing required key 'columns'".to_string()))?;
        if columns.is_empty() {
            return Err(malformed("'columns' must not be empty".to_string()));
        }

        let mut table = TableSpec::new(name);
        table.description = dto.description;
        table.schema = dto.schema.filter(|schema| !schema.trim().is_empty());

        let mut seen = HashSet::new();
        for (index, column) in columns.into_iter().enumerate() {
            let column = self.dto_to_column(column, index, &table.name, path)?;
            if !seen.insert(column.name.clone()) {
                return Err(ModelError::DuplicateColumn {
                    table: table.name.clone(),
                    column: column.name,
                });
            }
            table.add_column(column);
        }

        let auto_increment: Vec<&str> = table
            .columns
            .iter()
            .filter(|c| c.auto_increment)
            .map(|c| c.name.as_str())
            .collect();
        if auto_increment.len() > 1 {
            return Err(malformed(format!(
                "only one auto_increment column is allowed, found: {}",
                auto_increment.join(", ")
            )));
        }

        Ok(table)
    }

    /// カラムDTOを検証してColumnSpecに変換
    fn dto_to_column(
        &self,
        dto: ColumnDto,
        index: usize,
        table_name: &str,
        path: &Path,
    ) -> Result<ColumnSpec, ModelError> {
        let malformed = |message: String| ModelError::Malformed {
            path: path.display().to_string(),
            message,
        };

        let name = dto
            .name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| malformed(format!("column #{} is missing 'name'", index + 1)))?;
        let type_name = dto
            .column_type
            .ok_or_else(|| malformed(format!("column '{}' is missing 'type'", name)))?;

        if dto.primary_key && dto.nullable == Some(true) {
            return Err(malformed(format!(
                "primary key column '{}' cannot be nullable",
                name
            )));
        }

        let type_error = |source: TypeError| ModelError::ColumnType {
            table: table_name.to_string(),
            column: name.clone(),
            source,
        };

        let logical_type: LogicalType = type_name.parse().map_err(type_error)?;
        if dto.auto_increment && !logical_type.is_integer() {
            return Err(type_error(TypeError::AutoIncrementNotSupported {
                type_name: logical_type.name().to_string(),
            }));
        }
        if dto.auto_increment && !dto.primary_key {
            return Err(malformed(format!(
                "auto_increment column '{}' must be a primary key",
                name
            )));
        }
        let concrete = logical_type
            .to_concrete(dto.length, dto.scale)
            .map_err(type_error)?;

        let mut column = ColumnSpec::new(name.clone(), logical_type, concrete);
        column.length = dto.length;
        column.scale = dto.scale;
        column.primary_key = dto.primary_key;
        column.auto_increment = dto.auto_increment;
        column.nullable = dto.nullable.unwrap_or(!dto.primary_key);
        Ok(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::logical_type::ConcreteType;
    use tempfile::TempDir;

    fn parse(content: &str) -> Result<TableSpec, ModelError> {
        ModelLoader::default().parse_model(content, Path::new("models/Users.yaml"))
    }

    #[test]
    fn test_parse_model() {
        let table = parse(
            r#"
description: Registered users
columns:
  - name: id
    type: integer
    primary_key: true
    auto_increment: true
  - name: name
    type: string
    length: 100
  - name: price
    type: decimal
    length: 10
    scale: 2
"#,
        )
        .unwrap();

        // ファイル名（小文字化）がテーブル名になる
        assert_eq!(table.name, "users");
        assert_eq!(table.description.as_deref(), Some("Registered users"));
        assert_eq!(table.columns.len(), 3);

        let id = &table.columns[0];
        assert!(id.primary_key);
        assert!(id.auto_increment);
        assert!(!id.nullable);

        let name = &table.columns[1];
        assert!(name.nullable);
        assert_eq!(name.column_type, ConcreteType::String { length: 100 });

        assert_eq!(
            table.columns[2].column_type,
            ConcreteType::Numeric {
                precision: Some(10),
                scale: Some(2)
            }
        );
    }

    #[test]
    fn test_explicit_name_and_schema() {
        let table = parse(
            "name: members\nschema: crm\ncolumns:\n  - name: id\n    type: bigint\n",
        )
        .unwrap();
        assert_eq!(table.name, "members");
        assert_eq!(table.schema.as_deref(), Some("crm"));
    }

    #[test]
    fn test_missing_columns_is_malformed() {
        let err = parse("description: nothing here\n").unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("columns"));

        let err = parse("columns: []\n").unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_missing_column_fields_are_malformed() {
        assert!(parse("columns:\n  - type: integer\n")
            .unwrap_err()
            .is_malformed());
        assert!(parse("columns:\n  - name: id\n").unwrap_err().is_malformed());
    }

    #[test]
    fn test_unknown_key_is_malformed() {
        let err = parse("columns:\n  - name: id\n    type: integer\n    unique: true\n").unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_duplicate_column() {
        let err = parse(
            "columns:\n  - name: id\n    type: integer\n  - name: id\n    type: bigint\n",
        )
        .unwrap_err();
        assert!(err.is_duplicate_column());
    }

    #[test]
    fn test_unknown_type_reports_column() {
        let err = parse("columns:\n  - name: title\n    type: varchar\n    length: 10\n")
            .unwrap_err();

        assert!(err.type_error().unwrap().is_unknown_type());
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn test_auto_increment_on_string_is_rejected() {
        let err = parse("columns:\n  - name: code\n    type: string\n    auto_increment: true\n")
            .unwrap_err();
        assert!(matches!(
            err.type_error(),
            Some(TypeError::AutoIncrementNotSupported { .. })
        ));
    }

    #[test]
    fn test_auto_increment_requires_primary_key() {
        let err = parse("columns:\n  - name: seq\n    type: integer\n    auto_increment: true\n")
            .unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("seq"));
    }

    #[test]
    fn test_second_auto_increment_column_is_malformed() {
        let err = parse(
            "columns:
  - name: id
    type: integer
    primary_key: true
    auto_increment: true
  - name: tenant
    type: integer
    primary_key: true
    auto_increment: true
",
        )
        .unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("id, tenant"));
    }

    #[test]
    fn test_nullable_primary_key_is_malformed() {
        let err = parse(
            "columns:\n  - name: id\n    type: integer\n    primary_key: true\n    nullable: true\n",
        )
        .unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_template_rendering() {
        let mut context = BTreeMap::new();
        context.insert("prefix".to_string(), "app".to_string());
        context.insert("size".to_string(), "64".to_string());
        let loader = ModelLoader::new(context);

        let table = loader
            .parse_model(
                "name: \"{{ prefix }}_users\"\ncolumns:\n  - name: name\n    type: string\n    length: {{size}}\n",
                Path::new("users.yaml"),
            )
            .unwrap();

        assert_eq!(table.name, "app_users");
        assert_eq!(table.columns[0].length, Some(64));
    }

    #[test]
    fn test_unknown_template_variable() {
        let err = ModelLoader::default()
            .parse_model(
                "name: \"{{ missing }}\"\ncolumns:\n  - name: id\n    type: integer\n",
                Path::new("users.yaml"),
            )
            .unwrap_err();
        assert!(err.is_template());
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_load_models_detects_duplicate_tables() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("users.yaml");
        let second = temp_dir.path().join("people.yml");
        fs::write(&first, "columns:\n  - name: id\n    type: integer\n").unwrap();
        fs::write(
            &second,
            "name: users\ncolumns:\n  - name: id\n    type: integer\n",
        )
        .unwrap();

        let err = ModelLoader::default()
            .load_models(&[first, second], Dialect::PostgreSQL, Some("public"))
            .unwrap_err();
        assert!(err.is_duplicate_table());
    }

    #[test]
    fn test_load_models_same_name_in_different_schemas() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("users.yaml");
        let second = temp_dir.path().join("crm_users.yaml");
        fs::write(&first, "columns:\n  - name: id\n    type: integer\n").unwrap();
        fs::write(
            &second,
            "name: users\nschema: crm\ncolumns:\n  - name: id\n    type: integer\n",
        )
        .unwrap();

        let tables = ModelLoader::default()
            .load_models(&[first.clone(), second], Dialect::PostgreSQL, Some("public"))
            .unwrap();

        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].source.as_deref(), Some(first.as_path()));
    }

    #[test]
    fn test_load_models_ignores_schema_without_schema_support() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("users.yaml");
        let second = temp_dir.path().join("crm_users.yaml");
        fs::write(&first, "columns:\n  - name: id\n    type: integer\n").unwrap();
        fs::write(
            &second,
            "name: users\nschema: crm\ncolumns:\n  - name: id\n    type: integer\n",
        )
        .unwrap();

        // SQLiteでは同じテーブルになる
        let err = ModelLoader::default()
            .load_models(&[first.clone(), second.clone()], Dialect::SQLite, None)
            .unwrap_err();
        assert!(err.is_duplicate_table());

        let tables = ModelLoader::default()
            .load_models(&[second], Dialect::SQLite, None)
            .unwrap();
        assert_eq!(tables[0].schema, None);
        assert_eq!(tables[0].table_ref(None), TableRef::new(None, "users"));
    }

    #[test]
    fn test_load_model_missing_file() {
        let err = ModelLoader::default()
            .load_model(Path::new("/nonexistent/users.yaml"))
            .unwrap_err();
        assert!(matches!(err, ModelError::Read { .. }));
    }
}

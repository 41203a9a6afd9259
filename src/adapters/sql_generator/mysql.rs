// MySQL用SQLジェネレーター
//
// DDLアクションからMySQL用のDDL文を生成します。
// MySQLのDDLは暗黙的にコミットされるため、テーブル単位のロールバックは効きません。

use crate::adapters::sql_generator::{ColumnChange, SqlGenerator};
use crate::adapters::sql_quote::{quote_identifier_mysql, quote_table};
use crate::adapters::type_mapping::TypeMappingService;
use crate::core::config::Dialect;
use crate::core::error::DatabaseError;
use crate::core::model::{ColumnSpec, LiveColumn, TableRef};

/// MySQL用SQLジェネレーター
#[derive(Debug, Clone)]
pub struct MySqlSqlGenerator {
    type_mapping: TypeMappingService,
}

impl MySqlSqlGenerator {
    /// 新しいMySqlSqlGeneratorを作成
    pub fn new() -> Self {
        Self {
            type_mapping: TypeMappingService::new(Dialect::MySQL),
        }
    }
}

impl Default for MySqlSqlGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlGenerator for MySqlSqlGenerator {
    fn type_mapping(&self) -> &TypeMappingService {
        &self.type_mapping
    }

    fn generate_column_definition(&self, column: &ColumnSpec) -> String {
        let mut parts = vec![
            quote_identifier_mysql(&column.name),
            self.type_mapping.column_definition_type(column),
        ];

        if !column.nullable {
            parts.push("NOT NULL".to_string());
        }

        if column.auto_increment {
            parts.push("AUTO_INCREMENT".to_string());
        }

        parts.join(" ")
    }

    /// MODIFY COLUMN は定義全体を置き換えるため、型・NULL制約・自動増分をまとめて指定する
    fn generate_alter_column_type(
        &self,
        table: &TableRef,
        column: &ColumnSpec,
        previous: &LiveColumn,
    ) -> Result<Vec<String>, DatabaseError> {
        let change = ColumnChange::detect(&self.type_mapping, column, previous);
        let table_sql = quote_table(Dialect::MySQL, table);
        let modify = format!(
            "ALTER TABLE {} MODIFY COLUMN {}",
            table_sql,
            self.generate_column_definition(column)
        );

        // AUTO_INCREMENT カラムはキーである必要があるため、キーの追加・削除と順序を合わせる
        let statements = if change.primary_key_added {
            vec![
                format!(
                    "ALTER TABLE {} ADD PRIMARY KEY ({})",
                    table_sql,
                    quote_identifier_mysql(&column.name)
                ),
                modify,
            ]
        } else if change.primary_key_removed {
            vec![modify, format!("ALTER TABLE {} DROP PRIMARY KEY", table_sql)]
        } else {
            vec![modify]
        };

        Ok(statements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::logical_type::{ConcreteType, LogicalType};
    use crate::core::model::TableSpec;

    fn users() -> TableRef {
        TableRef::new(Some("shop".to_string()), "users")
    }

    fn id_column() -> ColumnSpec {
        let mut column = ColumnSpec::new("id", LogicalType::Integer, ConcreteType::Integer);
        column.primary_key = true;
        column.auto_increment = true;
        column.nullable = false;
        column
    }

    #[test]
    fn test_generate_create_table() {
        let generator = MySqlSqlGenerator::new();
        let mut spec = TableSpec::new("users");
        spec.add_column(id_column());
        spec.add_column(ColumnSpec::new(
            "active",
            LogicalType::Boolean,
            ConcreteType::Boolean,
        ));

        let sql = generator.generate_create_table(&users(), &spec);

        assert_eq!(
            sql,
            "CREATE TABLE `shop`.`users` (\n    `id` INT NOT NULL AUTO_INCREMENT,\n    `active` BOOLEAN,\n    PRIMARY KEY (`id`)\n)"
        );
    }

    #[test]
    fn test_generate_modify_column() {
        let generator = MySqlSqlGenerator::new();
        let mut column = ColumnSpec::new(
            "name",
            LogicalType::String,
            ConcreteType::String { length: 200 },
        );
        column.length = Some(200);
        let previous = LiveColumn::new("name", "varchar(100)", true);

        let statements = generator
            .generate_alter_column_type(&users(), &column, &previous)
            .unwrap();

        assert_eq!(
            statements,
            vec!["ALTER TABLE `shop`.`users` MODIFY COLUMN `name` VARCHAR(200)"]
        );
    }

    #[test]
    fn test_primary_key_added_before_auto_increment() {
        let generator = MySqlSqlGenerator::new();
        let previous = LiveColumn::new("id", "int", false);

        let statements = generator
            .generate_alter_column_type(&users(), &id_column(), &previous)
            .unwrap();

        assert_eq!(statements.len(), 2);
        assert!(statements[0].contains("ADD PRIMARY KEY (`id`)"));
        assert!(statements[1].ends_with("AUTO_INCREMENT"));
    }

    #[test]
    fn test_primary_key_dropped_after_modify() {
        let generator = MySqlSqlGenerator::new();
        let mut previous = LiveColumn::new("id", "int", false);
        previous.primary_key = true;
        previous.auto_increment = true;
        let mut column = id_column();
        column.primary_key = false;
        column.auto_increment = false;

        let statements = generator
            .generate_alter_column_type(&users(), &column, &previous)
            .unwrap();

        assert_eq!(
            statements,
            vec![
                "ALTER TABLE `shop`.`users` MODIFY COLUMN `id` INT NOT NULL",
                "ALTER TABLE `shop`.`users` DROP PRIMARY KEY"
            ]
        );
    }
}

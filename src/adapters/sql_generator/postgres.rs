// PostgreSQL用SQLジェネレーター
//
// DDLアクションからPostgreSQL用のDDL文を生成します。

use crate::adapters::sql_generator::{ColumnChange, SqlGenerator};
use crate::adapters::sql_quote::{quote_identifier_postgres, quote_literal, quote_table};
use crate::adapters::type_mapping::TypeMappingService;
use crate::core::config::Dialect;
use crate::core::error::DatabaseError;
use crate::core::model::{ColumnSpec, LiveColumn, TableRef};

/// PostgreSQL用SQLジェネレーター
#[derive(Debug, Clone)]
pub struct PostgresSqlGenerator {
    type_mapping: TypeMappingService,
}

impl PostgresSqlGenerator {
    /// 新しいPostgresSqlGeneratorを作成
    pub fn new() -> Self {
        Self {
            type_mapping: TypeMappingService::new(Dialect::PostgreSQL),
        }
    }

    /// 自動増分用シーケンスの修飾名（`"schema"."table_column_seq"`）
    fn sequence_name(&self, table: &TableRef, column_name: &str) -> String {
        let sequence = quote_identifier_postgres(&format!("{}_{}_seq", table.name, column_name));
        match &table.schema {
            Some(schema) => format!("{}.{}", quote_identifier_postgres(schema), sequence),
            None => sequence,
        }
    }
}

impl Default for PostgresSqlGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlGenerator for PostgresSqlGenerator {
    fn type_mapping(&self) -> &TypeMappingService {
        &self.type_mapping
    }

    fn generate_alter_column_type(
        &self,
        table: &TableRef,
        column: &ColumnSpec,
        previous: &LiveColumn,
    ) -> Result<Vec<String>, DatabaseError> {
        let change = ColumnChange::detect(&self.type_mapping, column, previous);
        let table_sql = quote_table(Dialect::PostgreSQL, table);
        let column_sql = quote_identifier_postgres(&column.name);
        let mut statements = Vec::new();

        if change.primary_key_removed {
            // 既定の制約名（<table>_pkey）
            statements.push(format!(
                "ALTER TABLE {} DROP CONSTRAINT {}",
                table_sql,
                quote_identifier_postgres(&format!("{}_pkey", table.name))
            ));
        }

        if change.auto_increment_removed {
            statements.push(format!(
                "ALTER TABLE {} ALTER COLUMN {} DROP DEFAULT",
                table_sql, column_sql
            ));
        }

        if change.type_changed {
            // SERIAL は型ではないため、格納型で変更する
            let sql_type = self.type_mapping.expected_storage_type(column);
            statements.push(format!(
                "ALTER TABLE {} ALTER COLUMN {} TYPE {} USING {}::{}",
                table_sql, column_sql, sql_type, column_sql, sql_type
            ));
        }

        if change.primary_key_added {
            statements.push(format!(
                "ALTER TABLE {} ADD PRIMARY KEY ({})",
                table_sql, column_sql
            ));
        }

        if change.auto_increment_added {
            let sequence = self.sequence_name(table, &column.name);
            statements.push(format!("CREATE SEQUENCE IF NOT EXISTS {}", sequence));
            statements.push(format!(
                "ALTER TABLE {} ALTER COLUMN {} SET DEFAULT nextval({})",
                table_sql,
                column_sql,
                quote_literal(&sequence)
            ));
            statements.push(format!(
                "ALTER SEQUENCE {} OWNED BY {}.{}",
                sequence, table_sql, column_sql
            ));
        }

        Ok(statements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::logical_type::{ConcreteType, LogicalType};
    use crate::core::model::TableSpec;

    fn users() -> TableRef {
        TableRef::new(Some("public".to_string()), "users")
    }

    fn id_column() -> ColumnSpec {
        let mut column = ColumnSpec::new("id", LogicalType::Integer, ConcreteType::Integer);
        column.primary_key = true;
        column.auto_increment = true;
        column.nullable = false;
        column
    }

    fn name_column(length: u32) -> ColumnSpec {
        let mut column = ColumnSpec::new(
            "name",
            LogicalType::String,
            ConcreteType::String { length },
        );
        column.length = Some(length);
        column
    }

    #[test]
    fn test_generate_create_table() {
        let generator = PostgresSqlGenerator::new();
        let mut spec = TableSpec::new("users");
        spec.add_column(id_column());
        spec.add_column(name_column(100));

        let sql = generator.generate_create_table(&users(), &spec);

        assert_eq!(
            sql,
            "CREATE TABLE \"public\".\"users\" (\n    \"id\" SERIAL NOT NULL,\n    \"name\" VARCHAR(100),\n    PRIMARY KEY (\"id\")\n)"
        );
    }

    #[test]
    fn test_generate_add_column() {
        let generator = PostgresSqlGenerator::new();
        let mut email = name_column(255);
        email.name = "email".to_string();
        email.nullable = false;

        let statements = generator.generate_add_column(&users(), &email).unwrap();

        assert_eq!(
            statements,
            vec![r#"ALTER TABLE "public"."users" ADD COLUMN "email" VARCHAR(255) NOT NULL"#]
        );
    }

    #[test]
    fn test_generate_alter_column_type() {
        let generator = PostgresSqlGenerator::new();
        let previous = LiveColumn::new("name", "character varying(50)", true);

        let statements = generator
            .generate_alter_column_type(&users(), &name_column(100), &previous)
            .unwrap();

        assert_eq!(
            statements,
            vec![
                r#"ALTER TABLE "public"."users" ALTER COLUMN "name" TYPE VARCHAR(100) USING "name"::VARCHAR(100)"#
            ]
        );
    }

    #[test]
    fn test_generate_add_primary_key_and_auto_increment() {
        let generator = PostgresSqlGenerator::new();
        let previous = LiveColumn::new("id", "integer", false);

        let statements = generator
            .generate_alter_column_type(&users(), &id_column(), &previous)
            .unwrap();

        assert_eq!(statements.len(), 4);
        assert_eq!(
            statements[0],
            r#"ALTER TABLE "public"."users" ADD PRIMARY KEY ("id")"#
        );
        assert_eq!(
            statements[1],
            r#"CREATE SEQUENCE IF NOT EXISTS "public"."users_id_seq""#
        );
        assert!(statements[2].contains(r#"nextval('"public"."users_id_seq"')"#));
    }

    #[test]
    fn test_generate_drop_primary_key() {
        let generator = PostgresSqlGenerator::new();
        let mut previous = LiveColumn::new("id", "integer", false);
        previous.primary_key = true;
        let mut column = id_column();
        column.primary_key = false;
        column.auto_increment = false;

        let statements = generator
            .generate_alter_column_type(&users(), &column, &previous)
            .unwrap();

        assert_eq!(
            statements,
            vec![r#"ALTER TABLE "public"."users" DROP CONSTRAINT "users_pkey""#]
        );
    }
}

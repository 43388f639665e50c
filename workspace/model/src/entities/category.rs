use sea_orm::entity::prelude::*;

/// Booking category of a line item, identified by its ledger account code
/// (the "Sachkonto" of the source documents).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub code: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::line_item::Entity")]
    LineItem,
}

impl Related<super::line_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Looks up a category by its code.
    pub async fn find_by_code<C: ConnectionTrait>(db: &C, code: &str) -> Result<Option<Model>, DbErr> {
        Entity::find().filter(Column::Code.eq(code)).one(db).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sea_query::SqliteQueryBuilder;
    use sea_orm::{Database, DatabaseConnection, DbBackend, Schema, Set, Statement};

    async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();

        // Only the categories table is needed here
        let schema = Schema::new(DbBackend::Sqlite);
        let stmt = schema.create_table_from_entity(Entity);
        let statement =
            Statement::from_string(DbBackend::Sqlite, stmt.to_string(SqliteQueryBuilder));
        db.execute(statement).await.unwrap();

        db
    }

    #[tokio::test]
    async fn test_find_by_code() {
        let db = setup_test_db().await;

        ActiveModel {
            code: Set("4400".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let found = Model::find_by_code(&db, "4400").await.unwrap();
        assert_eq!(found.map(|c| c.code), Some("4400".to_string()));

        let missing = Model::find_by_code(&db, "9999").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_code_is_unique() {
        let db = setup_test_db().await;

        let first = ActiveModel {
            code: Set("UNKNOWN".to_string()),
            ..Default::default()
        };
        first.insert(&db).await.unwrap();

        let duplicate = ActiveModel {
            code: Set("UNKNOWN".to_string()),
            ..Default::default()
        };
        assert!(duplicate.insert(&db).await.is_err());
    }
}

//! PostgreSQL post store.

use async_trait::async_trait;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbConn, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use inkpress_core::StoreError;
use inkpress_core::ports::{Counter, PostDocument, PostQuery, PostStore, StoredPost};

use super::entity::post::{self, Column, Entity as PostEntity};

/// Post store over the `posts` table.
///
/// Listing uses keyset pagination on `(publish_date, id)`, both descending.
pub struct PostgresPostStore {
    db: DbConn,
}

impl PostgresPostStore {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

fn query_error(e: DbErr) -> StoreError {
    match e {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => StoreError::Connection(e.to_string()),
        _ => StoreError::Query(e.to_string()),
    }
}

fn write_error(e: DbErr) -> StoreError {
    let message = e.to_string();
    if message.contains("duplicate") || message.contains("unique") {
        StoreError::Constraint(message)
    } else {
        query_error(e)
    }
}

fn parse_id(id: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(id).map_err(|_| StoreError::InvalidId(id.to_string()))
}

fn counter_column(counter: Counter) -> Column {
    match counter {
        Counter::Views => Column::Views,
        Counter::Likes => Column::Likes,
    }
}

#[async_trait]
impl PostStore for PostgresPostStore {
    async fn query(&self, query: &PostQuery) -> Result<Vec<StoredPost>, StoreError> {
        let mut select = PostEntity::find();

        if let Some(published) = query.published {
            select = select.filter(Column::IsPublished.eq(published));
        }
        if let Some(slug) = &query.slug {
            select = select.filter(Column::Slug.eq(slug.as_str()));
        }
        if let Some(after) = &query.start_after {
            let id = parse_id(&after.id)?;
            let at: DateTimeWithTimeZone = after
                .publish_date
                .to_datetime()
                .ok_or_else(|| StoreError::Query("cursor timestamp out of range".into()))?
                .into();
            select = select.filter(
                Condition::any().add(Column::PublishDate.lt(at)).add(
                    Condition::all()
                        .add(Column::PublishDate.eq(at))
                        .add(Column::Id.lt(id)),
                ),
            );
        }

        select = select
            .order_by_desc(Column::PublishDate)
            .order_by_desc(Column::Id);
        if let Some(limit) = query.limit {
            select = select.limit(limit as u64);
        }

        let rows = select.all(&self.db).await.map_err(query_error)?;
        tracing::debug!(returned = rows.len(), "Post query executed");
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get(&self, id: &str) -> Result<Option<StoredPost>, StoreError> {
        // Ids this store never issued cannot exist.
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        let row = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_error)?;
        Ok(row.map(Into::into))
    }

    async fn insert(&self, document: PostDocument) -> Result<StoredPost, StoreError> {
        let row = post::new_row(Uuid::new_v4(), document);
        let saved = row.insert(&self.db).await.map_err(write_error)?;
        tracing::debug!(post_id = %saved.id, "Post row inserted");
        Ok(saved.into())
    }

    async fn update(&self, id: &str, changes: PostDocument) -> Result<(), StoreError> {
        let id = parse_id(id)?;
        match post::changed_row(id, changes).update(&self.db).await {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) => Err(StoreError::NotFound),
            Err(e) => Err(write_error(e)),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let id = parse_id(id)?;
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(query_error)?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn increment(&self, id: &str, counter: Counter, delta: i64) -> Result<(), StoreError> {
        let id = parse_id(id)?;
        let column = counter_column(counter);

        let mut update = PostEntity::update_many()
            .col_expr(column, Expr::col(column).add(delta))
            .filter(Column::Id.eq(id));
        if delta < 0 {
            // Decrements that would cross zero are skipped.
            update = update.filter(column.gte(-delta));
        }

        let result = update.exec(&self.db).await.map_err(query_error)?;
        if result.rows_affected == 0 && delta >= 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

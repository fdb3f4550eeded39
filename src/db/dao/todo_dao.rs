use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, IntoActiveModel, QueryFilter, Set,
};

use super::base_traits::TimestampedActiveModel;
use super::{DaoBase, DaoLayerError, DaoResult, SortOrder};
use crate::db::entities::prelude::Todo;
use crate::db::entities::todo::{self, Priority};

/// The display buckets of the todo board, relative to `today` where dates
/// matter. They overlap: a record that is both completed and cancelled belongs
/// to `Resolved` and to `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoBucket {
    Active(NaiveDate),
    Resolved,
    Cancelled,
    Expired(NaiveDate),
}

impl TodoBucket {
    pub fn condition(self) -> Condition {
        match self {
            TodoBucket::Active(today) => open().add(
                Condition::any()
                    .add(todo::Column::DueDate.is_null())
                    .add(todo::Column::DueDate.gte(today)),
            ),
            TodoBucket::Resolved => Condition::all().add(todo::Column::Completed.eq(true)),
            TodoBucket::Cancelled => Condition::all().add(todo::Column::Cancelled.eq(true)),
            TodoBucket::Expired(today) => open().add(todo::Column::DueDate.lt(today)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoFlag {
    Completed,
    Cancelled,
}

fn open() -> Condition {
    Condition::all()
        .add(todo::Column::Completed.eq(false))
        .add(todo::Column::Cancelled.eq(false))
}

/// Due date ascending with undated todos last, then the priority code as
/// stored (`H` < `L` < `M`), then id.
pub fn board_order() -> Vec<SortOrder<todo::Column>> {
    vec![
        SortOrder::asc(todo::Column::DueDate).nulls_last(),
        SortOrder::asc(todo::Column::Priority),
        SortOrder::asc(todo::Column::Id),
    ]
}

#[derive(Clone)]
pub struct TodoDao {
    db: DatabaseConnection,
}

impl DaoBase for TodoDao {
    type Entity = Todo;
    type Model = todo::Model;
    type ActiveModel = todo::ActiveModel;
    type Column = todo::Column;
    type PrimaryKey = todo::PrimaryKey;

    const ENTITY_NAME: &'static str = "Todo";

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl TodoDao {
    pub async fn list_matching(&self, condition: Condition) -> DaoResult<Vec<todo::Model>> {
        self.find_iter(None, board_order(), move |query| {
            query.filter(condition.clone())
        })
        .collect_all()
        .await
    }

    pub async fn list_bucket(&self, bucket: TodoBucket) -> DaoResult<Vec<todo::Model>> {
        self.list_matching(bucket.condition()).await
    }

    pub async fn list_open_by_priority(&self, priority: Priority) -> DaoResult<Vec<todo::Model>> {
        self.list_matching(open().add(todo::Column::Priority.eq(priority)))
            .await
    }

    pub async fn count_bucket(&self, bucket: TodoBucket) -> DaoResult<u64> {
        self.count(move |query| query.filter(bucket.condition()))
            .await
    }

    pub async fn count_all(&self) -> DaoResult<u64> {
        self.count(|query| query).await
    }

    /// Flips one flag with a single read and a single write.
    pub async fn toggle(&self, id: i32, flag: TodoFlag) -> DaoResult<todo::Model> {
        let model = self.find_by_id(id).await?;
        let (completed, cancelled) = (model.completed, model.cancelled);

        let mut active = model.into_active_model();
        match flag {
            TodoFlag::Completed => active.completed = Set(!completed),
            TodoFlag::Cancelled => active.cancelled = Set(!cancelled),
        }
        active.set_updated_at(Utc::now().fixed_offset());

        active.update(&self.db).await.map_err(DaoLayerError::Db)
    }
}

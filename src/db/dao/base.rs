use chrono::Utc;
use sea_orm::sea_query::NullOrdering;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, IntoActiveModel, Order, PaginatorTrait, PrimaryKeyToColumn, PrimaryKeyTrait,
    QueryOrder, QuerySelect, Select,
};

use super::base_traits::{HasCreatedAtColumn, TimestampedActiveModel};
use super::error::{DaoLayerError, DaoResult};

#[derive(Debug, serde::Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub page: u64,
    pub page_size: u64,
    pub has_next: bool,
}

/// One `ORDER BY` term. `nulls` pins where NULLs land so the result does not
/// depend on the backend's default.
#[derive(Debug, Clone)]
pub struct SortOrder<C> {
    pub column: C,
    pub order: Order,
    pub nulls: Option<NullOrdering>,
}

impl<C> SortOrder<C> {
    pub fn asc(column: C) -> Self {
        Self {
            column,
            order: Order::Asc,
            nulls: None,
        }
    }

    pub fn desc(column: C) -> Self {
        Self {
            column,
            order: Order::Desc,
            nulls: None,
        }
    }

    pub fn nulls_last(mut self) -> Self {
        self.nulls = Some(NullOrdering::Last);
        self
    }
}

pub struct DaoPager<D, F>
where
    D: DaoBase,
    F: Fn(Select<D::Entity>) -> Select<D::Entity> + Clone + Send,
{
    dao: D,
    page: u64,
    page_size: u64,
    order: Vec<SortOrder<D::Column>>,
    apply: F,
    done: bool,
}

impl<D, F> DaoPager<D, F>
where
    D: DaoBase,
    F: Fn(Select<D::Entity>) -> Select<D::Entity> + Clone + Send,
{
    pub async fn next_page(
        &mut self,
    ) -> DaoResult<Option<PaginatedResponse<D::Model>>> {
        if self.done {
            return Ok(None);
        }

        let response = self
            .dao
            .find(self.page, self.page_size, &self.order, self.apply.clone())
            .await?;

        if !response.has_next {
            self.done = true;
        }
        self.page = self.page.saturating_add(1);

        Ok(Some(response))
    }

    /// Drains every remaining page into one vector.
    pub async fn collect_all(mut self) -> DaoResult<Vec<D::Model>> {
        let mut rows = Vec::new();
        while let Some(mut response) = self.next_page().await? {
            rows.append(&mut response.data);
        }
        Ok(rows)
    }
}

/// Generic persistence operations over one sea-orm entity. Implementors name
/// the entity's generated types so the bounds below hold wherever `D: DaoBase`
/// is used.
#[async_trait::async_trait]
pub trait DaoBase: Clone + Send + Sync + Sized + 'static {
    type Entity: EntityTrait<
            Model = Self::Model,
            ActiveModel = Self::ActiveModel,
            Column = Self::Column,
            PrimaryKey = Self::PrimaryKey,
        > + HasCreatedAtColumn
        + Send
        + Sync;
    type Model: FromQueryResult + IntoActiveModel<Self::ActiveModel> + Send + Sync + 'static;
    type ActiveModel: ActiveModelTrait<Entity = Self::Entity>
        + ActiveModelBehavior
        + TimestampedActiveModel
        + Send
        + 'static;
    type Column: ColumnTrait + Copy + Send + Sync + 'static;
    type PrimaryKey: PrimaryKeyTrait<ValueType = i32> + PrimaryKeyToColumn<Column = Self::Column>;

    const ENTITY_NAME: &'static str;
    const MAX_PAGE_SIZE: u64 = 100;

    fn from_db(db: DatabaseConnection) -> Self;

    fn new(db: &DatabaseConnection) -> Self {
        Self::from_db(db.clone())
    }

    fn db(&self) -> &DatabaseConnection;

    fn not_found(id: i32) -> DaoLayerError {
        DaoLayerError::NotFound {
            entity: Self::ENTITY_NAME,
            id,
        }
    }

    async fn create(
        &self,
        data: impl IntoActiveModel<Self::ActiveModel> + Send,
    ) -> DaoResult<Self::Model> {
        let now = Utc::now().fixed_offset();
        let mut active = data.into_active_model();
        active.set_created_at(now);
        active.set_updated_at(now);
        active.insert(self.db()).await.map_err(DaoLayerError::Db)
    }

    async fn find_by_id(&self, id: i32) -> DaoResult<Self::Model> {
        Self::Entity::find_by_id(id)
            .one(self.db())
            .await
            .map_err(DaoLayerError::Db)?
            .ok_or_else(|| Self::not_found(id))
    }

    async fn find(
        &self,
        page: u64,
        page_size: u64,
        order: &[SortOrder<Self::Column>],
        apply: impl FnOnce(Select<Self::Entity>) -> Select<Self::Entity> + Send,
    ) -> DaoResult<PaginatedResponse<Self::Model>> {
        if page == 0 || page_size == 0 || page_size > Self::MAX_PAGE_SIZE {
            return Err(DaoLayerError::InvalidPagination { page, page_size });
        }

        let filtered = apply(Self::Entity::find());
        let ordered = if order.is_empty() {
            filtered.order_by_desc(Self::Entity::created_at_column())
        } else {
            order.iter().cloned().fold(filtered, |select, term| match term.nulls {
                Some(nulls) => select.order_by_with_nulls(term.column, term.order, nulls),
                None => select.order_by(term.column, term.order),
            })
        };
        let fetch_size = page_size.saturating_add(1);
        let offset = page.saturating_sub(1).saturating_mul(page_size);
        let mut data = ordered
            .limit(fetch_size)
            .offset(offset)
            .all(self.db())
            .await
            .map_err(DaoLayerError::Db)?;

        let has_next = data.len() > page_size as usize;
        if has_next {
            data.truncate(page_size as usize);
        }

        Ok(PaginatedResponse {
            data,
            page,
            page_size,
            has_next,
        })
    }

    fn find_iter<F>(
        &self,
        page_size: Option<u64>,
        order: Vec<SortOrder<Self::Column>>,
        apply: F,
    ) -> DaoPager<Self, F>
    where
        F: Fn(Select<Self::Entity>) -> Select<Self::Entity> + Clone + Send,
    {
        DaoPager {
            dao: self.clone(),
            page: 1,
            page_size: page_size.unwrap_or(Self::MAX_PAGE_SIZE),
            order,
            apply,
            done: false,
        }
    }

    async fn count(
        &self,
        apply: impl FnOnce(Select<Self::Entity>) -> Select<Self::Entity> + Send,
    ) -> DaoResult<u64> {
        apply(Self::Entity::find())
            .count(self.db())
            .await
            .map_err(DaoLayerError::Db)
    }

    async fn update<F>(&self, id: i32, apply: F) -> DaoResult<Self::Model>
    where
        F: for<'a> FnOnce(&'a mut Self::ActiveModel) + Send,
    {
        let model = self.find_by_id(id).await?;

        let mut active = model.into_active_model();
        apply(&mut active);
        active.set_updated_at(Utc::now().fixed_offset());

        active.update(self.db()).await.map_err(DaoLayerError::Db)
    }

    async fn delete(&self, id: i32) -> DaoResult<i32> {
        let result = Self::Entity::delete_by_id(id)
            .exec(self.db())
            .await
            .map_err(DaoLayerError::Db)?;

        if result.rows_affected == 0 {
            return Err(Self::not_found(id));
        }

        Ok(id)
    }
}

use sea_orm::IntoActiveModel;

use crate::db::dao::{DaoBase, DaoLayerError};
use crate::error::AppError;

type CrudModel<S> = <<S as CrudService>::Dao as DaoBase>::Model;
type CrudActiveModel<S> = <<S as CrudService>::Dao as DaoBase>::ActiveModel;

/// Client-facing messages for storage failures, per operation.
#[derive(Clone, Copy)]
pub struct CrudErrors {
    pub create_failed: &'static str,
    pub find_failed: &'static str,
    pub update_failed: &'static str,
    pub delete_failed: &'static str,
}

impl Default for CrudErrors {
    fn default() -> Self {
        Self {
            create_failed: "Create failed",
            find_failed: "Find failed",
            update_failed: "Update failed",
            delete_failed: "Delete failed",
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum CrudOp {
    Create,
    Find,
    Update,
    Delete,
}

#[async_trait::async_trait]
pub trait CrudService: Send + Sync {
    type Dao: DaoBase;

    fn dao(&self) -> &Self::Dao;

    fn errors(&self) -> CrudErrors {
        CrudErrors::default()
    }

    fn map_error(&self, op: CrudOp, err: DaoLayerError) -> AppError {
        let errors = self.errors();
        match err {
            DaoLayerError::NotFound { .. } => AppError::not_found(err.to_string()),
            DaoLayerError::InvalidPagination { .. } => AppError::bad_request(err.to_string()),
            DaoLayerError::Db(db_err) => {
                tracing::error!(?op, error = %db_err, "storage operation failed");
                let message = match op {
                    CrudOp::Create => errors.create_failed,
                    CrudOp::Find => errors.find_failed,
                    CrudOp::Update => errors.update_failed,
                    CrudOp::Delete => errors.delete_failed,
                };
                AppError::internal(message)
            }
        }
    }

    async fn create(
        &self,
        data: impl IntoActiveModel<CrudActiveModel<Self>> + Send,
    ) -> Result<CrudModel<Self>, AppError> {
        self.dao()
            .create(data)
            .await
            .map_err(|err| self.map_error(CrudOp::Create, err))
    }

    async fn find_by_id(&self, id: i32) -> Result<CrudModel<Self>, AppError> {
        self.dao()
            .find_by_id(id)
            .await
            .map_err(|err| self.map_error(CrudOp::Find, err))
    }

    async fn update<F>(&self, id: i32, apply: F) -> Result<CrudModel<Self>, AppError>
    where
        F: FnOnce(&mut CrudActiveModel<Self>) + Send,
    {
        self.dao()
            .update(id, apply)
            .await
            .map_err(|err| self.map_error(CrudOp::Update, err))
    }

    async fn delete(&self, id: i32) -> Result<(), AppError> {
        self.dao()
            .delete(id)
            .await
            .map(|_| ())
            .map_err(|err| self.map_error(CrudOp::Delete, err))
    }
}

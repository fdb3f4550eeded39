pub mod base;
pub mod base_traits;
mod context;
pub mod error;
pub mod todo_dao;

pub use base::{DaoBase, DaoPager, PaginatedResponse, SortOrder};
pub use base_traits::{HasCreatedAtColumn, TimestampedActiveModel};
pub use context::DaoContext;
pub use error::{DaoLayerError, DaoResult};
pub use todo_dao::{TodoBucket, TodoDao, TodoFlag};

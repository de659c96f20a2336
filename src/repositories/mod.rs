use async_trait::async_trait;

use crate::dto::work_orders::{NewWorkOrder, WorkOrderDetails};
use crate::entities::work_order;
use crate::errors::ServiceError;

pub mod work_order_repository;

pub use work_order_repository::WorkOrderRepository;

/// Storage operations the work order service depends on
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkOrderStore: Send + Sync {
    /// Open orders joined with bike and assignee, oldest first,
    /// assigned before unassigned on equal initiation times
    async fn find_incomplete(&self) -> Result<Vec<WorkOrderDetails>, ServiceError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<work_order::Model>, ServiceError>;

    async fn bike_exists(&self, bike_id: i32) -> Result<bool, ServiceError>;

    async fn insert(&self, new_order: NewWorkOrder) -> Result<work_order::Model, ServiceError>;

    /// Writes every column of `order` back to its row
    async fn save(&self, order: work_order::Model) -> Result<work_order::Model, ServiceError>;

    /// Returns the number of rows removed
    async fn delete(&self, id: i32) -> Result<u64, ServiceError>;
}

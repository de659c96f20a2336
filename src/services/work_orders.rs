use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use metrics::{counter, histogram};
use tracing::{info, instrument, warn};

use crate::{
    dto::work_orders::{NewWorkOrder, WorkOrderDetails, WorkOrderPayload},
    entities::work_order,
    errors::ServiceError,
    repositories::WorkOrderStore,
};

/// Service for managing bike repair work orders
#[derive(Clone)]
pub struct WorkOrderService {
    store: Arc<dyn WorkOrderStore>,
}

impl WorkOrderService {
    pub fn new(store: Arc<dyn WorkOrderStore>) -> Self {
        Self { store }
    }

    /// Lists every open work order, oldest first
    #[instrument(skip(self))]
    pub async fn list_incomplete(&self) -> Result<Vec<WorkOrderDetails>, ServiceError> {
        let started = Instant::now();
        let orders = self.store.find_incomplete().await?;
        histogram!(
            "work_orders.list_incomplete.duration_seconds",
            started.elapsed().as_secs_f64()
        );
        Ok(orders)
    }

    /// Creates a new work order stamped with the current time
    #[instrument(skip(self, payload), fields(bike_id = payload.bike_id))]
    pub async fn create_work_order(
        &self,
        payload: WorkOrderPayload,
    ) -> Result<work_order::Model, ServiceError> {
        self.ensure_bike_exists(payload.bike_id).await?;

        let created = self
            .store
            .insert(NewWorkOrder {
                description: payload.description,
                bike_id: payload.bike_id,
                user_profile_id: payload.user_profile_id,
                date_initiated: Utc::now(),
            })
            .await?;

        counter!("work_orders.created", 1);
        info!(work_order_id = created.id, "Work order created");
        Ok(created)
    }

    /// Replaces description, assignee and bike of an existing work order
    #[instrument(skip(self, payload))]
    pub async fn update_work_order(
        &self,
        id: i32,
        payload: WorkOrderPayload,
    ) -> Result<(), ServiceError> {
        let mut existing = self.find_work_order(id).await?;

        if payload.id != id {
            warn!(path_id = id, body_id = payload.id, "Work order id mismatch");
            return Err(ServiceError::BadRequest(format!(
                "Work order id {} does not match path id {}",
                payload.id, id
            )));
        }

        if payload.bike_id != existing.bike_id {
            self.ensure_bike_exists(payload.bike_id).await?;
        }

        existing.description = payload.description;
        existing.user_profile_id = payload.user_profile_id;
        existing.bike_id = payload.bike_id;
        self.store.save(existing).await?;

        counter!("work_orders.updated", 1);
        info!(work_order_id = id, "Work order updated");
        Ok(())
    }

    /// Marks a work order complete, replacing any earlier completion time
    #[instrument(skip(self))]
    pub async fn complete_work_order(&self, id: i32) -> Result<(), ServiceError> {
        let mut existing = self.find_work_order(id).await?;
        if existing.is_complete() {
            info!(work_order_id = id, "Work order already complete, overwriting completion time");
        }

        existing.date_completed = Some(Utc::now());
        self.store.save(existing).await?;

        counter!("work_orders.completed", 1);
        info!(work_order_id = id, "Work order completed");
        Ok(())
    }

    /// Permanently removes a work order
    #[instrument(skip(self))]
    pub async fn delete_work_order(&self, id: i32) -> Result<(), ServiceError> {
        self.find_work_order(id).await?;

        if self.store.delete(id).await? == 0 {
            return Err(ServiceError::work_order_not_found(id));
        }

        counter!("work_orders.deleted", 1);
        info!(work_order_id = id, "Work order deleted");
        Ok(())
    }

    /// Gets a work order by id
    #[instrument(skip(self))]
    pub async fn find_work_order(&self, id: i32) -> Result<work_order::Model, ServiceError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::work_order_not_found(id))
    }

    async fn ensure_bike_exists(&self, bike_id: i32) -> Result<(), ServiceError> {
        if self.store.bike_exists(bike_id).await? {
            Ok(())
        } else {
            Err(ServiceError::BadRequest(format!("Bike {} does not exist", bike_id)))
        }
    }
}

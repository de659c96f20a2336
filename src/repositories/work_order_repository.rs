use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, LoaderTrait,
    Order, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use crate::dto::work_orders::{BikeDetails, NewWorkOrder, WorkOrderDetails};
use crate::entities::{bike, bike_type, owner, user_profile, work_order};
use crate::errors::ServiceError;

use super::WorkOrderStore;

/// SeaORM backed work order store
#[derive(Debug, Clone)]
pub struct WorkOrderRepository {
    db: Arc<DatabaseConnection>,
}

impl WorkOrderRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    async fn load_bikes(
        &self,
        orders: &[work_order::Model],
    ) -> Result<HashMap<i32, BikeDetails>, ServiceError> {
        let bikes: Vec<bike::Model> = orders
            .load_one(bike::Entity, self.db())
            .await?
            .into_iter()
            .flatten()
            .collect();

        let owners = bikes.load_one(owner::Entity, self.db()).await?;
        let bike_types = bikes.load_one(bike_type::Entity, self.db()).await?;

        Ok(bikes
            .into_iter()
            .zip(owners)
            .zip(bike_types)
            .map(|((bike, owner), bike_type)| (bike.id, BikeDetails::new(bike, owner, bike_type)))
            .collect())
    }

    async fn load_user_profiles(
        &self,
        orders: &[work_order::Model],
    ) -> Result<HashMap<i32, user_profile::Model>, ServiceError> {
        let mut ids: Vec<i32> = orders.iter().filter_map(|o| o.user_profile_id).collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let profiles = user_profile::Entity::find()
            .filter(user_profile::Column::Id.is_in(ids))
            .all(self.db())
            .await?;

        Ok(profiles.into_iter().map(|p| (p.id, p)).collect())
    }
}

#[async_trait]
impl WorkOrderStore for WorkOrderRepository {
    async fn find_incomplete(&self) -> Result<Vec<WorkOrderDetails>, ServiceError> {
        let orders = work_order::Entity::find()
            .filter(work_order::Column::DateCompleted.is_null())
            .order_by_asc(work_order::Column::DateInitiated)
            .order_by(
                Expr::col((work_order::Entity, work_order::Column::UserProfileId)).is_null(),
                Order::Asc,
            )
            .order_by_asc(work_order::Column::Id)
            .all(self.db())
            .await?;

        let bikes = self.load_bikes(&orders).await?;
        let profiles = self.load_user_profiles(&orders).await?;

        Ok(orders
            .into_iter()
            .map(|order| {
                let bike = bikes.get(&order.bike_id).cloned();
                let profile = order
                    .user_profile_id
                    .and_then(|id| profiles.get(&id).cloned());
                WorkOrderDetails::new(order, bike, profile)
            })
            .collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<work_order::Model>, ServiceError> {
        Ok(work_order::Entity::find_by_id(id).one(self.db()).await?)
    }

    async fn bike_exists(&self, bike_id: i32) -> Result<bool, ServiceError> {
        let count = bike::Entity::find_by_id(bike_id).count(self.db()).await?;
        Ok(count > 0)
    }

    async fn insert(&self, new_order: NewWorkOrder) -> Result<work_order::Model, ServiceError> {
        let model = work_order::ActiveModel {
            description: Set(new_order.description),
            bike_id: Set(new_order.bike_id),
            user_profile_id: Set(new_order.user_profile_id),
            date_initiated: Set(new_order.date_initiated),
            date_completed: Set(None),
            ..Default::default()
        };

        Ok(model.insert(self.db()).await?)
    }

    async fn save(&self, order: work_order::Model) -> Result<work_order::Model, ServiceError> {
        let model = work_order::ActiveModel::from(order).reset_all();
        Ok(model.update(self.db()).await?)
    }

    async fn delete(&self, id: i32) -> Result<u64, ServiceError> {
        let result = work_order::Entity::delete_by_id(id).exec(self.db()).await?;
        Ok(result.rows_affected)
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{bike, bike_type, owner, user_profile, work_order};

/// Body accepted by create and update.
///
/// `dateInitiated` and `dateCompleted` are tolerated on input so clients can
/// send back a record they previously read, but the server never takes them
/// from the caller.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderPayload {
    /// Must match the path id on update; ignored on create
    #[serde(default)]
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "Flat tire")]
    pub description: String,
    #[schema(example = 5)]
    pub bike_id: i32,
    #[serde(default)]
    pub user_profile_id: Option<i32>,
    #[serde(default)]
    pub date_initiated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date_completed: Option<DateTime<Utc>>,
}

/// Fields the store needs to insert a new work order
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkOrder {
    pub description: String,
    pub bike_id: i32,
    pub user_profile_id: Option<i32>,
    pub date_initiated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BikeDetails {
    pub id: i32,
    pub brand: String,
    pub color: String,
    pub owner_id: i32,
    pub bike_type_id: i32,
    pub owner: Option<owner::Model>,
    pub bike_type: Option<bike_type::Model>,
}

impl BikeDetails {
    pub fn new(
        bike: bike::Model,
        owner: Option<owner::Model>,
        bike_type: Option<bike_type::Model>,
    ) -> Self {
        Self {
            id: bike.id,
            brand: bike.brand,
            color: bike.color,
            owner_id: bike.owner_id,
            bike_type_id: bike.bike_type_id,
            owner,
            bike_type,
        }
    }
}

/// An open work order joined with its bike and assignee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderDetails {
    pub id: i32,
    pub description: String,
    pub bike_id: i32,
    pub user_profile_id: Option<i32>,
    pub date_initiated: DateTime<Utc>,
    pub date_completed: Option<DateTime<Utc>>,
    pub bike: Option<BikeDetails>,
    pub user_profile: Option<user_profile::Model>,
}

impl WorkOrderDetails {
    pub fn new(
        order: work_order::Model,
        bike: Option<BikeDetails>,
        user_profile: Option<user_profile::Model>,
    ) -> Self {
        Self {
            id: order.id,
            description: order.description,
            bike_id: order.bike_id,
            user_profile_id: order.user_profile_id,
            date_initiated: order.date_initiated,
            date_completed: order.date_completed,
            bike,
            user_profile,
        }
    }
}

// Repair shop tables
pub mod bike;
pub mod bike_type;
pub mod owner;
pub mod user_profile;
pub mod work_order;

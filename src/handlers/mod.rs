pub mod common;
pub mod work_orders;

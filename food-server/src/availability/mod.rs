//! 营业时间评估
//!
//! 纯函数：给定周营业时间、时区和时间点，判断餐厅是否营业、商品是否可售。
//! 不读数据库，不读时钟；调用方负责传入 `now`。
//!
//! - [`window`] - 营业窗口 (含跨午夜)
//! - [`product`] - 时段商品分组
//! - [`catalog`] - 餐厅全部商品按时间点评估
//! - [`status`] - 餐厅时间状态、下次营业时间

pub mod catalog;
pub mod product;
pub mod status;
pub mod window;

pub use catalog::product_time_infos;
pub use product::{Availability, is_product_available_at};
pub use status::{next_open_time, restaurant_time_status, restaurant_tz, should_be_open};
pub use window::{is_open_at, time_in_range};

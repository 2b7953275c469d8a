//! 订单与退款状态机
//!
//! 状态转换表定义在 `shared::models`，这里负责读-校验-写的原子性和日志。

pub mod orders;
pub mod refunds;

pub use orders::OrderLifecycle;
pub use refunds::RefundService;

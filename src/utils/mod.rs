pub mod format;
pub mod time_utils;

pub use format::{format_pct, format_price};
pub use time_utils::TimeUtils;

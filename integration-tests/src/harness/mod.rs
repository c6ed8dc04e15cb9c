pub mod fixtures;
pub mod tracing;

pub use fixtures::{LogFixture, json_line};
pub use self::tracing::{CapturedEvent, init_test_tracing};

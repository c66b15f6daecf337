pub mod accounts;
pub mod clock;
pub mod conversations;
pub mod error;
pub mod feed;
pub mod live;
pub mod matching;
pub mod membership;
pub mod memory;
pub mod messages;
pub mod ports;
pub mod profiles;
pub mod tasks;

pub use error::{CoreError, CoreResult};

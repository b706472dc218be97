//! # wayline-events
//!
//! Process-wide eventing primitives for the Wayline navigation engine:
//!
//! - **EventBus** - named publish/subscribe registry with identity-deduped handlers
//! - **Current** - lock-free holder for the latest observed value
//!
//! Both types are generic over their payload, so applications can reuse them
//! for their own events alongside the navigation lifecycle.

pub mod bus;
pub mod current;

pub use bus::{EventBus, Handler};
pub use current::Current;

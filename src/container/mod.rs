//! # Container Engine
//!
//! The interacting pieces behind container behavior: the pure layout
//! engine, the coordinate-preserving transform service, the refit throttle
//! and the orchestrating manager. The manager is the only entry point that
//! mutates state; layout and transform stay side-effect free so they can be
//! reasoned about (and tested) in isolation.

pub mod cache;
pub mod layout;
pub mod manager;
pub mod transform;

pub use cache::{Clock, ManualClock, ResizeThrottle, SystemClock, DEFAULT_THROTTLE_TTL};
pub use layout::{ChildDescriptor, FillResult};
pub use manager::{ChangeKind, ContainerManager, FIT_EPSILON, MAX_NESTING_DEPTH, MIN_CONTAINER_SIZE};

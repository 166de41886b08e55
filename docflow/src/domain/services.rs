//! The use case implementations, generic over the [crate::domain::ports]
//! traits.

pub mod allocator;
pub mod notifications;
pub mod workflow;

pub use allocator::TrackingIdAllocator;
pub use notifications::NotificationDiff;
pub use workflow::WorkflowService;

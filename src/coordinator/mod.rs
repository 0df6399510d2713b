mod builder;
mod handle;
mod intake;
mod session;
mod stats;

pub use builder::NavigationCoordinatorBuilder;
pub use handle::CoordinatorHandle;
pub use session::{NavigationCoordinator, SourceStatus};
pub use stats::CoordinatorStats;

pub mod dispatch;
pub mod inbound;
pub mod manager;

pub use dispatch::{drain_notifications, forward_notifications, Dispatcher, Notification};
pub use inbound::{route, Inbound};
pub use manager::{CondenseFailurePolicy, Pipeline};

pub mod prelude {
    pub use super::{route, CondenseFailurePolicy, Dispatcher, Inbound, Notification, Pipeline};
    pub use nb_core::{ChannelId, LinkSubmission, Outcome};
}

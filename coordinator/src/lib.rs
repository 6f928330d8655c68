mod coordinator;
mod net;

pub use coordinator::Coordinator;
pub use net::{NetCoordinator, accept};

pub mod error;
mod member;
mod net;
mod worker;

pub use error::{Result, WorkerErr};
pub use member::Member;
pub use net::{NetMember, connect};
pub use worker::Worker;

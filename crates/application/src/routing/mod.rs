//! Navigation-time access control.

mod guard;
mod router;

pub use guard::{RouteGuard, RouteTable};
pub use router::Router;

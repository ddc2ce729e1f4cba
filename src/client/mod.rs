//! Client side of a duel: HTTP access, local view reconciliation and polling.

mod poller;
mod rest;
mod view;

pub use poller::Poller;
pub use rest::{ClientError, RestSessionClient, SessionApi};
pub use view::{ClientView, ViewEvent};

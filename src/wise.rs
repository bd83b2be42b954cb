pub mod account;
pub mod client;
pub mod error;
pub mod model;

pub use account::{Account, AccountRecord};
pub use client::{Connector, HttpConnector};

#[cfg(test)]
pub mod fake;

pub mod broadcaster;
pub mod channels;
pub mod codec;
pub mod config;
pub mod decision;
pub mod dispatcher;
pub mod ledger;
pub mod listener;
pub mod model;
pub mod notifier;
pub mod transport;
pub mod venue;

#[cfg(test)]
mod tests;

pub mod beacon;
pub mod host;
pub mod listener;

// Library root: champion-select domain logic shared by the app and the
// recommendation client.

pub mod champions;
pub mod config;
pub mod controller;
pub mod fingerprint;
pub mod lenient;
pub mod normalize;
pub mod poll;
pub mod ports;
pub mod ready_check;
pub mod snapshot;
pub mod turn;

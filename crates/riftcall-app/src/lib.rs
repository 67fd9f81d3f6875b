// Library root: re-exports all modules so integration tests can drive the
// pipelines with fake collaborators.

pub mod app;
pub mod archive;
pub mod console;
pub mod input;
pub mod lcu;
pub mod protocol;
pub mod ready_check;

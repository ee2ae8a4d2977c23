pub mod catalog;
pub mod common;
pub mod order;
pub mod status;
pub mod sync;
pub mod tasks;
pub mod visit;

pub mod sample;
pub mod snapshot_store;

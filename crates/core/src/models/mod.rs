pub mod entity;
pub mod post;
pub mod raw;
pub mod response;
pub mod snapshot;

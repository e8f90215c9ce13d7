pub mod error;
pub mod feed;
pub mod likes;
pub mod repos;
pub mod stats;

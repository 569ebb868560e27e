//! External document partitioning

mod client;

pub use client::PartitionClient;

pub mod addresses;
pub mod pipeline;
pub mod writers;

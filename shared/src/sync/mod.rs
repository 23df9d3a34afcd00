pub mod message;
pub mod payload_writer;
pub mod state;

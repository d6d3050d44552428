//! CSV input and output for batch withdrawals.

pub mod request_reader;
pub mod result_writer;

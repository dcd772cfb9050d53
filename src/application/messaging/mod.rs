//! Message handling - Parsing of inbound message text

pub mod parser;

pub use parser::MessageParser;

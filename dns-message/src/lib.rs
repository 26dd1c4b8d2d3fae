//! Decoding of captured DNS messages into one line trace records.
//!
//! [`Message::from_bytes`] splits the wire format into a header and four
//! sections, leaving each record's rdata borrowed from the input.
//! [`dump_dns`] renders a message, decoding the rdata of the common record
//! types and of EDNS0 OPT records along the way.

mod cursor;
mod dump;
mod edns;
mod error;
mod header;
mod message;
mod parser;
mod question;
mod resource_record;

pub use dump::{dump_dns, dump_message, query_domain};
pub use edns::{ClientSubnet, Edns, EdnsOption};
pub use error::MessageError;
pub use header::{Header, OpCode, RCode};
pub use message::{Message, Section};
pub use question::{Class, Question, Type};
pub use resource_record::{RData, ResourceRecord};

pub type Result<T> = std::result::Result<T, MessageError>;

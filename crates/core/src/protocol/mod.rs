//! qbXML wire protocol.
//!
//! The accounting engine speaks request/response documents. This module
//! holds an owned element tree, the message envelope codec and one builder
//! per request the engine issues.

pub mod codec;
pub mod element;
pub mod error;
pub mod message;
pub mod requests;

pub use codec::{QBXML_VERSION, decode_request, decode_response, encode_request, encode_response};
pub use element::Element;
pub use error::ProtocolError;
pub use message::{
    Request, Response, STATUS_ALREADY_EXISTS, STATUS_NO_MATCH, STATUS_OBJECT_NOT_FOUND, STATUS_OK,
};
pub use requests::{AccountType, TxnType};

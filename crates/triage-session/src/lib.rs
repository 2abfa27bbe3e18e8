//! Session tokens and the in-process session store.
//!
//! Tokens are random URL-safe strings. The store maps each token to its
//! conversation record and serializes all work on one token behind that
//! record's mutex.

pub mod store;
pub mod token;

pub use store::{lock_record, SessionHandle, SessionRecord, SessionStore};
pub use token::{make_token, token_length, DEFAULT_TOKEN_BYTES};

//! Wire types shared between the auth client and anything speaking its HTTP contract.

pub mod domain;
pub mod error;
pub mod protocol;

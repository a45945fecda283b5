//! Command bit-packing and encrypted message construction (C8–C9)
//!
//! Grounded on the teacher's EdDSA crate for its small-module layout, and on
//! the `maci-babyjub`/`maci-sponge` crates this workspace already built for
//! the actual cryptographic primitives involved.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod builder;
mod codec;

pub use builder::{build_key_change_message, build_message, BuildError, Message};
pub use codec::{
    compute_command_hash, generate_salt, pack_command, unpack_command, CodecError, CommandFields,
};

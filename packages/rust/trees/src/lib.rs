//! Quinary Poseidon Merkle trees and the accumulator queue (C10–C11)
//!
//! Grounded on spec.md §4.9–4.10's tree algorithms; the sparse-storage and
//! memoized-node-cache shape follows the teacher's convention of wrapping a
//! `HashMap`-backed structure behind a narrow, invariant-preserving API
//! rather than exposing its internals.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod accqueue;
mod quinary;

pub use accqueue::{AccQueue, AccQueueError};
pub use quinary::{verify_proof, Proof, QuinaryTree, TreeError, ARITY};

//! This crate contains modules for [Ladon](https://crates.io/crates/ladon) that add support for
//! Nintendo compression formats that are shared across multiple games or systems.

#![deny(unused_crate_dependencies)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
mod no_std {
    extern crate alloc;
    pub use alloc::boxed::Box;
    pub use alloc::vec;
}

// rand is only exercised by the integration tests
#[cfg(test)]
use rand as _;

// All public modules
pub mod yay0;
pub mod yaz0;

// For internal use only right now
mod matching;

// Prelude, for convenience
pub mod prelude;

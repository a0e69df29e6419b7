//! This crate is used as a utilities library for common functionality across
//! [Ladon](https://crates.io/crates/ladon) modules.
//!
//! By default, this crate only enables modules which do not have any crate dependencies (aside from
//! snafu, which is required for errors).

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
mod no_std {
    extern crate alloc;
    pub use alloc::format;
    pub use alloc::string::String;
}

pub mod prelude;

// Enable any modules that don't have dependencies by default
pub mod data;
pub mod util;

#[cfg(feature = "std")]
pub mod identify;

//! Build-time configuration for the VIP1970 board support crates.
//!
//! Options are declared by a build script with [`generate_config`] and
//! overridden through `<CRATE>_CONFIG_<OPTION>` environment variables. The
//! selected values are forwarded to the compiled crate as environment
//! variables and cfg symbols; the macros in this crate read them back in
//! `no_std` code.
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
mod generate;
#[cfg(feature = "std")]
pub use generate::*;

/// Read an integer configuration value emitted by [`generate_config`].
#[macro_export]
macro_rules! board_config_int {
    ($ty:ty, $var:expr) => {
        match <$ty>::from_str_radix(env!($var), 10) {
            Ok(val) => val,
            _ => unreachable!(),
        }
    };
}

/// Read a boolean configuration value emitted by [`generate_config`].
#[macro_export]
macro_rules! board_config_bool {
    ($var:expr) => {
        match env!($var).as_bytes() {
            b"true" => true,
            b"false" => false,
            _ => unreachable!(),
        }
    };
}

/// Read a string configuration value emitted by [`generate_config`].
#[macro_export]
macro_rules! board_config_str {
    ($var:expr) => {
        env!($var)
    };
}

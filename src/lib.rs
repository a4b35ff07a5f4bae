//! Launch-triggered motion-JPEG capture.
//!
//! Without the default `std` feature the crate is `no_std`. Nothing in the
//! core allocates, but `tracing` in `no_std` mode depends on `alloc`, so the
//! target still needs a global allocator. The `platform::host` backends
//! require `std`.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod clock;
pub mod config;
pub mod device;
pub mod error;
pub mod frame;
pub mod indicator;
pub mod machine;
pub mod mjpeg;
pub mod power;
pub mod session;
pub mod stream;
pub mod trigger;
pub mod types;

#[cfg(feature = "std")]
pub mod platform;

// Re-exports
pub use clock::*;
pub use config::*;
pub use device::*;
pub use error::*;
pub use frame::*;
pub use indicator::*;
pub use machine::*;
pub use power::*;
pub use session::*;
pub use stream::*;
pub use trigger::*;
pub use types::*;

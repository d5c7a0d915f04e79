// src/platform/mod.rs

// Implementations of the capability traits in `common::hal_traits`.
// The driver never names one of these directly.

// Real hardware, through embedded-hal / embedded-hal-nb
#[cfg(any(test, feature = "impl-native"))]
pub mod native;

// Recording test double
#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(any(test, feature = "impl-native"))]
pub use native::{NativeError, NativeInterface};

#[cfg(any(test, feature = "mock"))]
pub use mock::{Call, MockError, MockInterface};

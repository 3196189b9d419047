//! Arithmetic underneath the signature engines.
//!
//! This module provides modular arithmetic over arbitrary-precision integers
//! and the group law of short Weierstrass elliptic curves.

pub mod curve;
pub mod modular;

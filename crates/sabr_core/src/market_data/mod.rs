//! Market data: yield curves, curve bundles and SABR parameter surfaces.
//!
//! All market data objects are immutable once constructed. Bumped variants
//! used for finite-difference verification are new instances, never in-place
//! edits, so read-only sharing across pricing calls is safe by construction.

pub mod curves;
pub mod error;
pub mod sabr;

pub use error::MarketDataError;
pub use sabr::{SabrBundle, SabrParameterKind, SabrParameters, SabrSurface, SabrSurfaceError};

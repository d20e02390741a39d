//! Parallel portfolio evaluation.
//!
//! Market data objects are immutable once constructed, so a portfolio prices
//! in parallel against one shared bundle without locking. The pricing
//! function is supplied by the caller; the first error aborts the run.

use rayon::prelude::*;

/// Evaluate `price` over all instruments in parallel, preserving order.
pub fn present_values<I, T, E, F>(instruments: &[I], price: F) -> Result<Vec<T>, E>
where
    I: Sync,
    T: Send,
    E: Send,
    F: Fn(&I) -> Result<T, E> + Sync + Send,
{
    instruments.par_iter().map(price).collect()
}

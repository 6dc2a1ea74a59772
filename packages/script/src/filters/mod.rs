//! Filters
//!
//! Host functions callable from expressions and pipe chains

pub mod default_filters;
pub mod registry;

pub use default_filters::DefaultFilters;
pub use registry::FilterRegistry;

use crate::error::BoxError;
use crate::evaluator::value::Value;

pub type FilterResult = std::result::Result<Value, BoxError>;

/// A registered filter; closures taking the argument slice implement it
pub trait Filter: Send + Sync {
    fn invoke(&self, args: &[Value]) -> FilterResult;
}

impl<F> Filter for F
where
    F: Fn(&[Value]) -> FilterResult + Send + Sync,
{
    fn invoke(&self, args: &[Value]) -> FilterResult {
        self(args)
    }
}

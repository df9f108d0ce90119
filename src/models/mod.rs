//! Domain model types for the VRPTWMS.
//!
//! Nodes are immutable customer data; a problem bundles them with the cost
//! matrix stack; routes carry the per-position time propagation; a solution
//! owns its routes plus the list of still-unrouted customers.

mod node;
mod problem;
mod route;
mod solution;

pub use node::Node;
pub use problem::Problem;
pub use route::{Route, EMPTY_LEN};
pub use solution::Solution;

//! Problem instance: nodes, capacity and cost matrices.

use crate::config::Config;
use crate::distance::{adapt_service_times, TravelMatrices};
use crate::instance::Instance;
use crate::models::Node;

/// An immutable VRPTWMS instance ready for solving.
///
/// Owns the node array (depot at index 0), the vehicle capacity and the
/// full stack of cost matrices. Service times are rescaled during
/// construction when the configuration enables adaptive service times.
///
/// # Examples
///
/// ```
/// use vrptwms::config::Config;
/// use vrptwms::instance::Instance;
/// use vrptwms::models::{Node, Problem};
///
/// let instance = Instance::new(
///     "tiny",
///     100.0,
///     vec![
///         Node::depot(0.0, 0.0, 1000.0),
///         Node::new(1, 3.0, 4.0, 10.0, 0.0, 100.0, 5.0),
///     ],
/// );
/// let cfg = Config::default();
/// let pb = Problem::new(instance, &cfg);
/// assert_eq!(pb.num_nodes(), 2);
/// assert!((pb.dist(0, 1) - 5.0).abs() < 1e-10);
/// ```
#[derive(Debug)]
pub struct Problem {
    name: String,
    capacity: f64,
    nodes: Vec<Node>,
    matrices: TravelMatrices,
}

impl Problem {
    /// Builds a problem from a parsed instance and the active configuration.
    pub fn new(instance: Instance, cfg: &Config) -> Self {
        let Instance {
            name,
            capacity,
            mut nodes,
        } = instance;
        if cfg.adapt_service_times {
            adapt_service_times(&mut nodes, cfg.service_rate, cfg.truck_velocity);
        }
        let matrices = TravelMatrices::build(&nodes, cfg.max_workers);
        Self {
            name,
            capacity,
            nodes,
            matrices,
        }
    }

    /// Instance name (file name without extension).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Vehicle capacity of the homogeneous fleet.
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Number of nodes including the depot.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// All nodes, depot first.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The node with the given id.
    pub fn node(&self, id: usize) -> &Node {
        &self.nodes[id]
    }

    /// Demand of the given node.
    pub fn demand(&self, id: usize) -> f64 {
        self.nodes[id].demand()
    }

    /// Earliest allowed service start of the given node.
    pub fn est(&self, id: usize) -> f64 {
        self.nodes[id].est()
    }

    /// Latest allowed service start of the given node.
    pub fn lst(&self, id: usize) -> f64 {
        self.nodes[id].lst()
    }

    /// Travel distance between two nodes.
    pub fn dist(&self, from: usize, to: usize) -> f64 {
        self.matrices.distance(from, to)
    }

    /// Travel delay between two nodes when `from` is served by `workers`.
    pub fn travel(&self, workers: usize, from: usize, to: usize) -> f64 {
        self.matrices.travel(workers, from, to)
    }

    /// The full matrix stack.
    pub fn matrices(&self) -> &TravelMatrices {
        &self.matrices
    }
}

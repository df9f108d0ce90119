//! Dense cost matrices.

use crate::models::Node;

/// A dense n×n cost matrix stored in row-major order.
///
/// # Examples
///
/// ```
/// use vrptwms::models::Node;
/// use vrptwms::distance::CostMatrix;
///
/// let nodes = vec![
///     Node::depot(0.0, 0.0, 100.0),
///     Node::new(1, 3.0, 4.0, 10.0, 0.0, 100.0, 5.0),
/// ];
/// let m = CostMatrix::from_nodes(&nodes);
/// assert!((m.get(0, 1) - 5.0).abs() < 1e-10);
/// assert_eq!(m.size(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct CostMatrix {
    data: Vec<f64>,
    size: usize,
}

impl CostMatrix {
    /// Creates a matrix of the given size, initialized to zero.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0.0; size * size],
            size,
        }
    }

    /// Computes the Euclidean distance matrix from node coordinates.
    pub fn from_nodes(nodes: &[Node]) -> Self {
        let n = nodes.len();
        let mut m = Self::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let d = nodes[i].distance_to(&nodes[j]);
                m.set(i, j, d);
                m.set(j, i, d);
            }
        }
        m
    }

    /// Returns the cost of travelling from `from` to `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Sets the cost of travelling from `from` to `to`.
    pub fn set(&mut self, from: usize, to: usize, cost: f64) {
        self.data[from * self.size + to] = cost;
    }

    /// Number of nodes covered by this matrix.
    pub fn size(&self) -> usize {
        self.size
    }
}

/// The stack of cost matrices used for time propagation.
///
/// Layer 0 is the plain Euclidean distance. Layer `k` (k ≥ 1) adds the
/// source node's service time divided by `k` workers, so that
/// `layer(k)[i][j]` is the delay between starting service at `i` with `k`
/// workers and arriving at `j`.
#[derive(Debug, Clone)]
pub struct TravelMatrices {
    layers: Vec<CostMatrix>,
}

impl TravelMatrices {
    /// Builds all `max_workers + 1` layers from the given nodes.
    ///
    /// The node service times must already be in their final (possibly
    /// adapted) state.
    pub fn build(nodes: &[Node], max_workers: usize) -> Self {
        let n = nodes.len();
        let distance = CostMatrix::from_nodes(nodes);
        let mut layers = Vec::with_capacity(max_workers + 1);
        for workers in 1..=max_workers {
            let mut layer = CostMatrix::new(n);
            for i in 0..n {
                for j in 0..n {
                    if i == j {
                        continue; // service time is irrelevant on the diagonal
                    }
                    let service = nodes[i].service_time() / workers as f64;
                    layer.set(i, j, distance.get(i, j) + service);
                }
            }
            layers.push(layer);
        }
        layers.insert(0, distance);
        Self { layers }
    }

    /// Plain travel distance from `from` to `to`.
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.layers[0].get(from, to)
    }

    /// Travel delay from `from` to `to` when `from` is served by
    /// `workers` workers.
    pub fn travel(&self, workers: usize, from: usize, to: usize) -> f64 {
        self.layers[workers].get(from, to)
    }

    /// Number of nodes covered by the matrices.
    pub fn size(&self) -> usize {
        self.layers[0].size()
    }

    /// Number of worker layers (excluding the distance layer).
    pub fn max_workers(&self) -> usize {
        self.layers.len() - 1
    }
}

/// Rescales service times according to the configured service rate.
///
/// The adapted time is `service_rate · demand`, capped so that the depot's
/// own window still closes after driving out, serving and returning
/// (Reimann et al. 2011). Must run before [`TravelMatrices::build`].
pub fn adapt_service_times(nodes: &mut [Node], service_rate: f64, truck_velocity: f64) {
    let depot_lst = nodes[0].lst();
    let distance = CostMatrix::from_nodes(nodes);
    for node in nodes.iter_mut().skip(1) {
        let outbound = distance.get(0, node.id()) / truck_velocity;
        let inbound = distance.get(node.id(), 0) / truck_velocity;
        let cap = depot_lst - node.est().max(outbound) - inbound;
        node.set_service_time((service_rate * node.demand()).min(cap));
    }
}

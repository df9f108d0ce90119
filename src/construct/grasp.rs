//! GRASP construction: sequential I1 over a restricted candidate list.

use rand::Rng;

use crate::config::Config;
use crate::construct::insertion::{best_insertion_attractive, CandidateList};
use crate::construct::stochastic_seed;
use crate::models::{Problem, Solution};
use crate::pheromone::PheromoneMatrix;

/// Builds routes sequentially, committing a random member of the
/// restricted candidate list instead of the single best insertion.
///
/// Each round collects the best feasible insertion of every unrouted node
/// on the current route into an RCL of `cfg.rcl_size` entries (0 keeps the
/// list unbounded) sorted by attractiveness; the commit is drawn uniformly
/// or by weighted roulette (`cfg.use_weights`).
pub fn sequential_rcl<R: Rng>(
    pb: &Problem,
    cfg: &Config,
    ph: &PheromoneMatrix,
    rng: &mut R,
    sol: &mut Solution,
    workers: usize,
) {
    let mut rcl = CandidateList::new(cfg.rcl_size);
    while sol.num_unrouted() > 0 {
        let seed = stochastic_seed(pb, ph, sol, rng);
        sol.remove_unrouted(seed);
        let route = sol.open_route(pb, seed, workers);
        loop {
            for &node in sol.unrouted() {
                if let Some(ins) = best_insertion_attractive(pb, cfg, sol.route(route), route, node)
                {
                    rcl.push(ins);
                }
            }
            let Some(ins) = rcl.pick(cfg.use_weights, rng).cloned() else {
                break;
            };
            sol.remove_unrouted(ins.node);
            sol.route_mut(route).insert_block(pb, ins.after, &[ins.node]);
            rcl.reset();
        }
        rcl.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Instance;
    use crate::models::Node;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample_problem() -> (Problem, Config) {
        let instance = Instance::new(
            "grasp",
            30.0,
            vec![
                Node::depot(0.0, 0.0, 1000.0),
                Node::new(1, 10.0, 0.0, 10.0, 0.0, 900.0, 5.0),
                Node::new(2, 20.0, 0.0, 10.0, 0.0, 900.0, 5.0),
                Node::new(3, 0.0, 10.0, 10.0, 0.0, 900.0, 5.0),
                Node::new(4, 0.0, 20.0, 10.0, 0.0, 900.0, 5.0),
            ],
        );
        let cfg = Config {
            adapt_service_times: false,
            max_workers: 2,
            rcl_size: 2,
            ..Config::default()
        };
        let pb = Problem::new(instance, &cfg);
        (pb, cfg)
    }

    #[test]
    fn test_rcl_construction_routes_everyone() {
        let (pb, cfg) = sample_problem();
        let ph = PheromoneMatrix::new(pb.num_nodes(), 1.0, 0.985, 1e-13);
        let mut rng = StdRng::seed_from_u64(0);
        let mut sol = Solution::new(&pb);
        sequential_rcl(&pb, &cfg, &ph, &mut rng, &mut sol, 2);
        assert!(sol.validate(&pb).is_ok());
    }

    #[test]
    fn test_unbounded_rcl_with_weights() {
        let (pb, mut cfg) = sample_problem();
        cfg.rcl_size = 0;
        cfg.use_weights = true;
        let ph = PheromoneMatrix::new(pb.num_nodes(), 1.0, 0.985, 1e-13);
        let mut rng = StdRng::seed_from_u64(4);
        let mut sol = Solution::new(&pb);
        sequential_rcl(&pb, &cfg, &ph, &mut rng, &mut sol, 2);
        assert!(sol.validate(&pb).is_ok());
    }

    #[test]
    fn test_uniform_rcl_selection() {
        let (pb, mut cfg) = sample_problem();
        cfg.rcl_size = 3;
        cfg.use_weights = false;
        let ph = PheromoneMatrix::new(pb.num_nodes(), 1.0, 0.985, 1e-13);
        let mut rng = StdRng::seed_from_u64(9);
        let mut sol = Solution::new(&pb);
        sequential_rcl(&pb, &cfg, &ph, &mut rng, &mut sol, 2);
        assert!(sol.validate(&pb).is_ok());
    }
}

//! Solomon benchmark instance reader.
//!
//! The fixed-structure ASCII format: four header lines, a vehicle line
//! whose second integer is the capacity, four more header lines, then one
//! customer per line with seven whitespace-separated fields
//! (id, x, y, demand, ready time, due date, service time). Node 0 is the
//! depot. Extra whitespace and blank trailing lines are tolerated.

use std::fs;
use std::path::Path;

use crate::error::SolverError;
use crate::models::Node;

/// Line index (0-based) of the vehicle capacity.
const CAPACITY_LINE: usize = 4;
/// Number of header lines before the customer records.
const SKIP_ROWS: usize = 9;

/// A parsed instance before matrices are built.
#[derive(Debug, Clone)]
pub struct Instance {
    /// Instance name (file name without extension).
    pub name: String,
    /// Vehicle capacity of the homogeneous fleet.
    pub capacity: f64,
    /// All nodes, depot first.
    pub nodes: Vec<Node>,
}

impl Instance {
    /// Bundles already-parsed parts into an instance.
    pub fn new(name: &str, capacity: f64, nodes: Vec<Node>) -> Self {
        Self {
            name: name.to_string(),
            capacity,
            nodes,
        }
    }
}

/// Reads and parses an instance file.
pub fn read_instance(path: &Path) -> Result<Instance, SolverError> {
    let text = fs::read_to_string(path).map_err(|source| SolverError::UnreadableInstance {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    parse_instance(&name, &text).map_err(|reason| SolverError::MalformedInstance {
        path: path.to_path_buf(),
        reason,
    })
}

/// Parses the Solomon text format.
pub fn parse_instance(name: &str, text: &str) -> Result<Instance, String> {
    let lines: Vec<&str> = text.lines().collect();
    let capacity_line = lines
        .get(CAPACITY_LINE)
        .ok_or_else(|| "missing vehicle capacity line".to_string())?;
    let capacity: f64 = capacity_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| "vehicle line has no capacity column".to_string())?
        .parse()
        .map_err(|_| format!("bad capacity in line {:?}", capacity_line.trim()))?;

    let mut nodes = Vec::new();
    for line in lines.iter().skip(SKIP_ROWS) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 7 {
            continue; // blank or truncated trailing line
        }
        let parse = |idx: usize| -> Result<f64, String> {
            fields[idx]
                .parse()
                .map_err(|_| format!("bad number '{}' in customer line {line:?}", fields[idx]))
        };
        let id: usize = fields[0]
            .parse()
            .map_err(|_| format!("bad node id '{}' in customer line {line:?}", fields[0]))?;
        nodes.push(Node::new(
            id,
            parse(1)?,
            parse(2)?,
            parse(3)?,
            parse(4)?,
            parse(5)?,
            parse(6)?,
        ));
    }
    if nodes.is_empty() {
        return Err("no customer records found".to_string());
    }
    if nodes[0].id() != 0 {
        return Err("first customer record is not the depot (id 0)".to_string());
    }
    if nodes.iter().enumerate().any(|(i, n)| n.id() != i) {
        return Err("node ids are not consecutive".to_string());
    }
    Ok(Instance::new(name, capacity, nodes))
}

//! Kahn's Topological Sort
//!
//! O(V + E). Among the steps that are ready at any point, the one with the
//! smallest declaration index goes first, so a given spec always yields the
//! same order.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Ordering failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// Node indices forming a cycle, first index repeated at the end.
    Cycle(Vec<usize>),
}

/// Order nodes `0..dependencies.len()` so every node comes after the nodes it
/// depends on.
///
/// `dependencies[i]` lists the nodes `i` depends on. Duplicates are ignored.
pub fn topological_order(dependencies: &[Vec<usize>]) -> Result<Vec<usize>, OrderError> {
    let n = dependencies.len();

    // 1. Deduplicated edges and in-degrees
    let mut deps: Vec<Vec<usize>> = dependencies.to_vec();
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut in_degree = vec![0usize; n];
    for (node, node_deps) in deps.iter_mut().enumerate() {
        node_deps.sort_unstable();
        node_deps.dedup();
        in_degree[node] = node_deps.len();
        for &dep in node_deps.iter() {
            dependents[dep].push(node);
        }
    }

    // 2. Ready set ordered by declaration index
    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, &degree)| degree == 0)
        .map(|(node, _)| Reverse(node))
        .collect();

    // 3. Process
    let mut order = Vec::with_capacity(n);
    while let Some(Reverse(node)) = ready.pop() {
        order.push(node);
        for &dependent in &dependents[node] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.push(Reverse(dependent));
            }
        }
    }

    // 4. Anything left is on or behind a cycle
    if order.len() < n {
        return Err(OrderError::Cycle(find_cycle(&deps, &in_degree)));
    }

    Ok(order)
}

/// Every unscheduled node still has an unscheduled dependency, so walking
/// dependencies from the lowest unscheduled node must revisit a node.
fn find_cycle(deps: &[Vec<usize>], in_degree: &[usize]) -> Vec<usize> {
    let Some(start) = in_degree.iter().position(|&degree| degree > 0) else {
        return Vec::new();
    };

    let mut path = vec![start];
    let mut current = start;
    loop {
        let Some(&next) = deps[current].iter().find(|&&dep| in_degree[dep] > 0) else {
            return path;
        };
        if let Some(pos) = path.iter().position(|&node| node == next) {
            let mut cycle = path.split_off(pos);
            cycle.push(next);
            return cycle;
        }
        path.push(next);
        current = next;
    }
}

//! Hierarchy depth over the module instance DAG.

use crate::error::DesignError;
use crate::table::DesignTable;

#[derive(Clone, Copy, PartialEq)]
enum Visit {
    Unvisited,
    InProgress,
    Done(u32),
}

/// Computes the design's hierarchy depth from the top module.
///
/// `children` is the instance adjacency in table-index space (one entry per
/// registered module; duplicates per instantiation are fine). A module with
/// no instances has depth 1; otherwise the depth is one more than the
/// deepest child. Cycles and out-of-range child indices are errors rather
/// than divergence.
pub fn hierarchy_depth(table: &DesignTable, children: &[Vec<usize>]) -> Result<u32, DesignError> {
    let top = table.top_index().ok_or(DesignError::NoTopModule)?;
    let mut state = vec![Visit::Unvisited; table.len()];
    depth_of(table, children, top, &mut state)
}

fn depth_of(
    table: &DesignTable,
    children: &[Vec<usize>],
    index: usize,
    state: &mut [Visit],
) -> Result<u32, DesignError> {
    match state[index] {
        Visit::Done(depth) => return Ok(depth),
        Visit::InProgress => {
            return Err(DesignError::CyclicHierarchy {
                module: table.modules()[index].name.clone(),
            })
        }
        Visit::Unvisited => {}
    }

    state[index] = Visit::InProgress;
    let mut deepest = 0;
    for &child in &children[index] {
        if child >= table.len() {
            return Err(DesignError::UnknownChild {
                module: table.modules()[index].name.clone(),
                index: child,
            });
        }
        deepest = deepest.max(depth_of(table, children, child, state)?);
    }
    let depth = deepest + 1;
    state[index] = Visit::Done(depth);
    Ok(depth)
}

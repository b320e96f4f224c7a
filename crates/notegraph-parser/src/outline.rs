//! On-demand hierarchy from block levels

use notegraph_core::ParsedBlock;

/// One node of a derived outline, referring to a block by index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineNode {
    pub index: usize,
    pub children: Vec<OutlineNode>,
}

/// Rebuild the tree implied by block levels.
///
/// A block becomes a child of the nearest preceding block with a smaller
/// level. Level jumps (0 then 3) attach to that nearest ancestor rather than
/// inventing intermediate nodes.
pub fn derive_outline(blocks: &[ParsedBlock]) -> Vec<OutlineNode> {
    let mut stack: Vec<usize> = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); blocks.len()];
    let mut roots = Vec::new();

    for (index, block) in blocks.iter().enumerate() {
        while stack
            .last()
            .is_some_and(|&open| blocks[open].level >= block.level)
        {
            stack.pop();
        }
        match stack.last() {
            Some(&parent) => children[parent].push(index),
            None => roots.push(index),
        }
        stack.push(index);
    }

    roots
        .into_iter()
        .map(|index| build_node(index, &children))
        .collect()
}

fn build_node(index: usize, children: &[Vec<usize>]) -> OutlineNode {
    OutlineNode {
        index,
        children: children[index]
            .iter()
            .map(|&child| build_node(child, children))
            .collect(),
    }
}

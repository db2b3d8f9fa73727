use std::collections::VecDeque;

pub const LEVEL_GAP: f32 = 120.0;

/// Longest-path rank of every node, top-down along edge direction.
///
/// Self-loops are dropped and edges closing a cycle (back edges found by a
/// depth-first walk) are ignored, so any relationship graph yields a ranking.
pub fn hierarchy_ranks(node_count: usize, edges: &[(usize, usize)]) -> Vec<usize> {
    let mut outgoing = vec![Vec::new(); node_count];
    for &(from, to) in edges {
        if from >= node_count || to >= node_count || from == to {
            continue;
        }
        outgoing[from].push(to);
    }
    for targets in &mut outgoing {
        targets.sort_unstable();
        targets.dedup();
    }

    let acyclic = strip_back_edges(&outgoing);

    let mut indegree = vec![0usize; node_count];
    for targets in &acyclic {
        for &to in targets {
            indegree[to] += 1;
        }
    }

    let mut ranks = vec![0usize; node_count];
    let mut queue = (0..node_count)
        .filter(|&index| indegree[index] == 0)
        .collect::<VecDeque<_>>();

    while let Some(node) = queue.pop_front() {
        for &next in &acyclic[node] {
            ranks[next] = ranks[next].max(ranks[node] + 1);
            indegree[next] -= 1;
            if indegree[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    ranks
}

fn strip_back_edges(outgoing: &[Vec<usize>]) -> Vec<Vec<usize>> {
    const UNVISITED: u8 = 0;
    const ON_STACK: u8 = 1;
    const DONE: u8 = 2;

    let node_count = outgoing.len();
    let mut state = vec![UNVISITED; node_count];
    let mut kept = vec![Vec::new(); node_count];

    for root in 0..node_count {
        if state[root] != UNVISITED {
            continue;
        }

        state[root] = ON_STACK;
        let mut stack = vec![(root, 0usize)];
        while let Some((node, cursor)) = stack.last_mut() {
            let node = *node;
            let Some(&next) = outgoing[node].get(*cursor) else {
                state[node] = DONE;
                stack.pop();
                continue;
            };
            *cursor += 1;

            match state[next] {
                UNVISITED => {
                    kept[node].push(next);
                    state[next] = ON_STACK;
                    stack.push((next, 0));
                }
                ON_STACK => {}
                _ => kept[node].push(next),
            }
        }
    }

    kept
}

/// Vertical target per node, centered around the origin.
pub fn rank_offsets(ranks: &[usize]) -> Vec<f32> {
    let max_rank = ranks.iter().copied().max().unwrap_or(0);
    let half_height = max_rank as f32 * LEVEL_GAP * 0.5;
    ranks
        .iter()
        .map(|&rank| rank as f32 * LEVEL_GAP - half_height)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_gets_increasing_ranks() {
        let ranks = hierarchy_ranks(4, &[(0, 1), (1, 2), (2, 3)]);
        assert_eq!(ranks, vec![0, 1, 2, 3]);
    }

    #[test]
    fn cycles_and_self_loops_do_not_block_ranking() {
        // 0 -> 1 -> 2 -> 0 plus mutual recursion 2 <-> 3 and 3 -> 3.
        let edges = [(0, 1), (1, 2), (2, 0), (2, 3), (3, 2), (3, 3)];
        let ranks = hierarchy_ranks(4, &edges);

        assert_eq!(ranks[0], 0);
        assert_eq!(ranks[1], 1);
        assert_eq!(ranks[2], 2);
        assert_eq!(ranks[3], 3);
    }

    #[test]
    fn longest_path_wins_and_isolated_nodes_stay_on_top() {
        let ranks = hierarchy_ranks(5, &[(0, 1), (1, 2), (0, 2), (9, 0)]);
        assert_eq!(ranks, vec![0, 1, 2, 0, 0]);
    }

    #[test]
    fn offsets_are_centered() {
        let offsets = rank_offsets(&[0, 1, 2]);
        assert_eq!(offsets, vec![-LEVEL_GAP, 0.0, LEVEL_GAP]);
        assert!(rank_offsets(&[]).is_empty());
    }
}

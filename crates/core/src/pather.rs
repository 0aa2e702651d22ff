//! Graph-generic shortest-path engine behind the map's movement queries.
//! This module exists so the A* machinery stays independent of cell masks.
//! It does not own adjacency rules or movement costs; the graph does.

use std::collections::{BTreeMap, BTreeSet};

/// A solver state: one map cell, passed by value. Small enough to copy
/// freely and totally ordered so open-list ties break the same way on every
/// run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellState {
    pub y: i16,
    pub x: i16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub to: CellState,
    pub cost: u32,
}

/// Adjacency and cost provider. Estimates must never exceed the true
/// remaining cost or the solver loses optimality.
pub trait Graph {
    fn least_cost_estimate(&self, from: CellState, to: CellState) -> u32;
    fn adjacent(&self, from: CellState, out: &mut Vec<Edge>);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SolveOutcome {
    /// Path excludes the start state and ends at the goal.
    Solved { cost: u32, path: Vec<CellState> },
    NoSolution,
    StartEndSame,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    f: u32,
    h: u32,
    y: i16,
    x: i16,
}

pub fn solve(graph: &impl Graph, start: CellState, goal: CellState) -> SolveOutcome {
    if start == goal {
        return SolveOutcome::StartEndSame;
    }

    let mut open_set = BTreeSet::new();
    let mut open_entries: BTreeMap<CellState, OpenNode> = BTreeMap::new();
    let mut came_from: BTreeMap<CellState, CellState> = BTreeMap::new();
    let mut g_score: BTreeMap<CellState, u32> = BTreeMap::new();
    let mut edges = Vec::new();

    let start_h = graph.least_cost_estimate(start, goal);
    let start_node = OpenNode { f: start_h, h: start_h, y: start.y, x: start.x };
    open_set.insert(start_node);
    open_entries.insert(start, start_node);
    g_score.insert(start, 0);

    while let Some(current_node) = open_set.pop_first() {
        let current = CellState { y: current_node.y, x: current_node.x };
        open_entries.remove(&current);

        if current == goal {
            let cost = *g_score.get(&goal).expect("goal must have a g-score when reached");
            return SolveOutcome::Solved { cost, path: reconstruct_path(&came_from, start, goal) };
        }

        let current_g = *g_score.get(&current).expect("open nodes must have a g-score");

        edges.clear();
        graph.adjacent(current, &mut edges);
        for edge in &edges {
            let tentative_g = current_g.saturating_add(edge.cost);
            let existing_g = g_score.get(&edge.to).copied().unwrap_or(u32::MAX);
            if tentative_g >= existing_g {
                continue;
            }

            if let Some(existing_node) = open_entries.remove(&edge.to) {
                open_set.remove(&existing_node);
            }

            came_from.insert(edge.to, current);
            g_score.insert(edge.to, tentative_g);

            let h = graph.least_cost_estimate(edge.to, goal);
            let node = OpenNode {
                f: tentative_g.saturating_add(h),
                h,
                y: edge.to.y,
                x: edge.to.x,
            };
            open_set.insert(node);
            open_entries.insert(edge.to, node);
        }
    }

    SolveOutcome::NoSolution
}

fn reconstruct_path(
    came_from: &BTreeMap<CellState, CellState>,
    start: CellState,
    goal: CellState,
) -> Vec<CellState> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        current = *came_from.get(&current).expect("path must be reconstructible");
        path.push(current);
    }
    path.reverse();
    path.remove(0);
    path
}

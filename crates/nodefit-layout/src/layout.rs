//! Layout projection — places node boxes, executor columns and core cells.
//!
//! Node boxes have a fixed size derived from the executor and node shape,
//! so the diagram never scales with the surface: a narrower surface wraps
//! nodes onto more rows instead.

use nodefit_core::AllocationParams;
use nodefit_placement::Distribution;
use serde::Serialize;
use tracing::warn;

/// General padding between elements.
pub const PAD: u64 = 20;
/// Side of one core cell.
pub const CORE_SIZE: u64 = 20;
/// Vertical gap between stacked core cells.
pub const CORE_SPACE: u64 = 40;
/// Gap between node boxes, both axes.
pub const NODE_GAP: u64 = 20;
pub const EXECUTOR_HEADER_SPACE: u64 = 40;
pub const EXECUTOR_FOOTER_SPACE: u64 = 10;
pub const NODE_HEADER_SPACE: u64 = 30;
pub const NODE_FOOTER_SPACE: u64 = 30;
/// Left/right padding inside an executor column.
pub const EXECUTOR_H_PADDING: u64 = 10;
/// Most cells a diagram will draw. Core cells for the SVG grid, slot
/// cells for the text diagram.
pub const MAX_DRAWN_CELLS: u64 = 20_000;

/// Sizing inputs besides the distribution itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutInput {
    pub executor_cores: u32,
    pub node_vcpus: u32,
    /// Available drawing width in pixels.
    pub surface_width: u32,
}

impl LayoutInput {
    pub fn from_params(params: &AllocationParams, surface_width: u32) -> Self {
        Self {
            executor_cores: params.executor_cores,
            node_vcpus: params.node_vcpus,
            surface_width,
        }
    }
}

/// What occupies an executor column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Occupant {
    /// Reserved coordinator executor.
    Reserved,
    /// User executor, numbered by column starting at 1.
    Executor(u32),
    Empty,
}

impl Occupant {
    pub fn is_occupied(&self) -> bool {
        !matches!(self, Occupant::Empty)
    }

    pub fn label(&self) -> Option<String> {
        match self {
            Occupant::Reserved => Some("AM".to_string()),
            Occupant::Executor(n) => Some(format!("Ex {n}")),
            Occupant::Empty => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CoreCell {
    pub x: u64,
    pub y: u64,
    /// Consumed by the executor in this column.
    pub used: bool,
}

/// One executor-sized column inside a node box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotBox {
    pub column: u32,
    pub x: u64,
    pub y: u64,
    pub width: u64,
    pub height: u64,
    pub occupant: Occupant,
    pub cores: Vec<CoreCell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeBox {
    pub index: usize,
    pub x: u64,
    pub y: u64,
    pub executors: u32,
    pub unused_vcpus: u32,
    pub slots: Vec<SlotBox>,
}

/// Grid geometry for a feasible distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridLayout {
    pub columns: u64,
    pub rows: u64,
    pub node_width: u64,
    pub node_height: u64,
    pub cols_per_node: u32,
    pub executor_width: u64,
    pub spacing_x: u64,
    pub offset_x: u64,
    pub canvas_width: u64,
    pub canvas_height: u64,
    /// Slots per node, echoed for node footers.
    pub slots_per_node: u32,
    pub nodes: Vec<NodeBox>,
}

/// Outcome of projecting a distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Projection {
    /// No executor fits a node; renderers show a message instead of a grid.
    Infeasible { surface_width: u32 },
    /// Drawing would exceed [`MAX_DRAWN_CELLS`] core cells.
    TooLarge { surface_width: u32, cells: u64 },
    Grid(GridLayout),
}

/// Project a distribution onto a drawing surface.
pub fn project(dist: &Distribution, input: &LayoutInput) -> Projection {
    if !dist.is_feasible() {
        return Projection::Infeasible {
            surface_width: input.surface_width,
        };
    }

    let exec_cores = input.executor_cores.max(1);
    let node_cores = input.node_vcpus.max(1);

    // Columns partition a node's cores, so every node draws exactly
    // `node_cores` cells.
    let cells = dist.node_count() as u64 * u64::from(node_cores);
    if cells > MAX_DRAWN_CELLS {
        warn!(cells, limit = MAX_DRAWN_CELLS, "diagram too large to draw");
        return Projection::TooLarge {
            surface_width: input.surface_width,
            cells,
        };
    }

    let surface_width = u64::from(input.surface_width);
    let node_count = dist.node_count() as u64;

    let executor_width = CORE_SIZE + EXECUTOR_H_PADDING * 2;
    let spacing_x = executor_width + PAD;

    let cols_per_node = node_cores.div_ceil(exec_cores).max(1);
    let node_width = PAD + u64::from(cols_per_node) * (executor_width + PAD);

    let area_width = surface_width.saturating_sub(PAD * 2);
    let columns = ((area_width + NODE_GAP) / (node_width + NODE_GAP))
        .max(1)
        .min(node_count.max(1));
    let rows = node_count.div_ceil(columns).max(1);

    let c = u64::from(exec_cores);
    let executor_height = EXECUTOR_HEADER_SPACE
        + c * CORE_SIZE
        + c.saturating_sub(1) * CORE_SPACE
        + EXECUTOR_FOOTER_SPACE;
    let node_height = NODE_HEADER_SPACE + executor_height + NODE_FOOTER_SPACE;

    let grid_width = columns * node_width + (columns - 1) * NODE_GAP;
    let canvas_width = surface_width.max(grid_width + PAD * 2);
    let canvas_height = PAD * 2 + rows * node_height + (rows - 1) * NODE_GAP;
    let offset_x = PAD + (canvas_width - PAD * 2 - grid_width) / 2;

    let nodes = dist
        .per_node
        .iter()
        .enumerate()
        .map(|(idx, &placed)| {
            let col = idx as u64 % columns;
            let row = idx as u64 / columns;
            let x = offset_x + col * (node_width + NODE_GAP);
            let y = PAD + row * (node_height + NODE_GAP);

            let slot_y = y + NODE_HEADER_SPACE;
            let slots = (0..cols_per_node)
                .map(|column| {
                    let slot_x = x + PAD + u64::from(column) * spacing_x;
                    let occupant = if column >= placed {
                        Occupant::Empty
                    } else if dist.is_reserved_slot(idx, column) {
                        Occupant::Reserved
                    } else {
                        Occupant::Executor(column + 1)
                    };

                    // The last column absorbs whatever cores are left over.
                    let capacity = if column == cols_per_node - 1 {
                        node_cores
                            .saturating_sub(exec_cores * (cols_per_node - 1))
                            .max(1)
                    } else {
                        exec_cores
                    };
                    let core_x = slot_x + (executor_width - CORE_SIZE) / 2;
                    let cores = (0..capacity)
                        .map(|r| CoreCell {
                            x: core_x,
                            y: slot_y + EXECUTOR_HEADER_SPACE + u64::from(r) * (CORE_SIZE + CORE_SPACE),
                            used: occupant.is_occupied() && r < exec_cores,
                        })
                        .collect();

                    SlotBox {
                        column,
                        x: slot_x,
                        y: slot_y,
                        width: executor_width,
                        height: executor_height,
                        occupant,
                        cores,
                    }
                })
                .collect();

            NodeBox {
                index: idx,
                x,
                y,
                executors: placed,
                unused_vcpus: node_cores.saturating_sub(placed.saturating_mul(exec_cores)),
                slots,
            }
        })
        .collect();

    Projection::Grid(GridLayout {
        columns,
        rows,
        node_width,
        node_height,
        cols_per_node,
        executor_width,
        spacing_x,
        offset_x,
        canvas_width,
        canvas_height,
        slots_per_node: dist.slots_per_node,
        nodes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodefit_placement::compute_distribution;

    fn grid(params: &AllocationParams, width: u32) -> GridLayout {
        let dist = compute_distribution(params);
        match project(&dist, &LayoutInput::from_params(params, width)) {
            Projection::Grid(g) => g,
            other => panic!("expected a grid, got {other:?}"),
        }
    }

    #[test]
    fn default_grid_geometry() {
        let g = grid(&AllocationParams::default(), 1200);

        assert_eq!(g.cols_per_node, 4);
        assert_eq!(g.executor_width, 40);
        assert_eq!(g.spacing_x, 60);
        assert_eq!(g.node_width, 260);
        assert_eq!(g.columns, 3);
        assert_eq!(g.rows, 1);
        assert_eq!(g.node_height, 310);
        assert_eq!(g.canvas_width, 1200);
        assert_eq!(g.canvas_height, 350);
        assert_eq!(g.offset_x, 190);

        let xs: Vec<u64> = g.nodes.iter().map(|n| n.x).collect();
        assert_eq!(xs, vec![190, 470, 750]);
    }

    #[test]
    fn slots_and_cores_positions() {
        let g = grid(&AllocationParams::default(), 1200);
        let first = &g.nodes[0].slots[0];

        assert_eq!((first.x, first.y), (210, 50));
        assert_eq!(first.height, 250);
        assert_eq!(g.nodes[0].slots[1].x, 270);
        assert_eq!(first.cores.len(), 4);
        assert_eq!((first.cores[0].x, first.cores[0].y), (220, 90));
        assert_eq!(first.cores[1].y, 150);
    }

    #[test]
    fn reserved_marker_comes_from_distribution() {
        let g = grid(&AllocationParams::default(), 1200);

        assert_eq!(g.nodes[0].slots[0].occupant, Occupant::Reserved);
        assert_eq!(g.nodes[0].slots[1].occupant, Occupant::Executor(2));
        assert_eq!(g.nodes[1].slots[0].occupant, Occupant::Executor(1));
        assert_eq!(g.nodes[2].slots[3].occupant, Occupant::Empty);
        assert!(g.nodes[2].slots[3].cores.iter().all(|c| !c.used));
        assert_eq!(g.nodes[2].unused_vcpus, 4);
    }

    #[test]
    fn narrow_surface_wraps_rows() {
        let g = grid(&AllocationParams::default(), 300);

        assert_eq!(g.columns, 1);
        assert_eq!(g.rows, 3);
        assert_eq!(g.canvas_height, 20 + 3 * 310 + 2 * 20 + 20);
        let ys: Vec<u64> = g.nodes.iter().map(|n| n.y).collect();
        assert_eq!(ys, vec![20, 350, 680]);
    }

    #[test]
    fn surface_narrower_than_a_node_grows_canvas() {
        let g = grid(&AllocationParams::default(), 100);
        assert_eq!(g.columns, 1);
        assert_eq!(g.canvas_width, 260 + 40);
        assert_eq!(g.offset_x, PAD);
    }

    #[test]
    fn last_column_takes_leftover_cores() {
        let params = AllocationParams {
            executor_cores: 5,
            ..AllocationParams::default()
        };
        let g = grid(&params, 1200);
        let node = &g.nodes[0];

        assert_eq!(g.cols_per_node, 4);
        assert_eq!(node.slots[0].cores.len(), 5);
        assert_eq!(node.slots[3].cores.len(), 1);
        // Three executors of five cores leave the last column idle.
        assert!(node.slots[3].cores.iter().all(|c| !c.used));
        assert_eq!(node.unused_vcpus, 1);
    }

    #[test]
    fn infeasible_distribution_has_no_grid() {
        let params = AllocationParams {
            executor_cores: 20,
            ..AllocationParams::default()
        };
        let dist = compute_distribution(&params);
        let projection = project(&dist, &LayoutInput::from_params(&params, 800));
        assert_eq!(projection, Projection::Infeasible { surface_width: 800 });
    }

    #[test]
    fn oversized_distribution_is_not_drawn() {
        // One memory-bound slot per 20k-vCPU node over 2001 nodes.
        let params = AllocationParams {
            executor_cores: 1,
            executor_memory_gb: 50.0,
            node_vcpus: 20_000,
            node_memory_gb: 64.0,
            max_executors: 2_000,
            reconcile_memory: false,
            ..AllocationParams::default()
        };
        let dist = compute_distribution(&params);
        assert_eq!(dist.slots_per_node, 1);
        assert_eq!(dist.node_count(), 2_001);

        let projection = project(&dist, &LayoutInput::from_params(&params, 1200));
        assert_eq!(
            projection,
            Projection::TooLarge {
                surface_width: 1200,
                cells: 2_001 * 20_000,
            }
        );
    }

    #[test]
    fn cell_budget_boundary_still_draws() {
        let params = AllocationParams {
            executor_cores: 4,
            node_vcpus: 16,
            max_executors: 4 * 1_250 - 1,
            ..AllocationParams::default()
        };
        let dist = compute_distribution(&params);
        assert_eq!(dist.node_count(), 1_250);
        assert!(matches!(
            project(&dist, &LayoutInput::from_params(&params, 1200)),
            Projection::Grid(_)
        ));
    }

    #[test]
    fn empty_request_projects_empty_grid() {
        let params = AllocationParams {
            max_executors: 0,
            reserved_executors: 0,
            ..AllocationParams::default()
        };
        let g = grid(&params, 1200);
        assert!(g.nodes.is_empty());
        assert_eq!(g.rows, 1);
    }
}

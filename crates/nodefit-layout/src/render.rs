//! Diagram renderers.
//!
//! The SVG renderer paints a [`Projection`] through an Askama template.
//! View types carry pre-computed coordinates, colors and labels so the
//! template stays a flat list of shapes.

use std::fmt::Write as _;

use askama::Template;
use nodefit_core::AllocationParams;
use nodefit_placement::Distribution;
use nodefit_placement::metrics::{INFEASIBLE_MESSAGE, unused_vcpus_per_node};

use crate::error::RenderResult;
use crate::layout::{
    CORE_SIZE, GridLayout, MAX_DRAWN_CELLS, NODE_FOOTER_SPACE, Occupant, PAD, Projection,
};

const RESERVED_FILL: &str = "#f0e68c";
const EXECUTOR_FILL: &str = "#f8fbff";
const CORE_USED_FILL: &str = "#e6f0ff";
const CORE_USED_STROKE: &str = "#0b6cff";
const CORE_IDLE_FILL: &str = "#e2e2e2";
const CORE_IDLE_STROKE: &str = "#686868";

/// Height of the canvas when only the infeasible message is drawn.
const MESSAGE_HEIGHT: u64 = 100;

// ── View types ──────────────────────────────────────────────────

struct NodeView {
    x: u64,
    y: u64,
    width: u64,
    height: u64,
    text_x: u64,
    header_y: u64,
    footer_y: u64,
    title: String,
    footer: String,
    slots: Vec<SlotView>,
}

struct SlotView {
    x: u64,
    y: u64,
    width: u64,
    height: u64,
    occupied: bool,
    fill: &'static str,
    label: String,
    label_x: u64,
    label_y: u64,
    cores: Vec<CoreView>,
}

struct CoreView {
    x: u64,
    y: u64,
    size: u64,
    fill: &'static str,
    stroke: &'static str,
}

#[derive(Template)]
#[template(path = "diagram.svg")]
struct DiagramTemplate {
    width: u64,
    height: u64,
    has_message: bool,
    message: String,
    nodes: Vec<NodeView>,
}

fn node_views(grid: &GridLayout) -> Vec<NodeView> {
    grid.nodes
        .iter()
        .map(|node| {
            let mut title = format!("Node {}", node.index + 1);
            if node.unused_vcpus > 0 {
                let _ = write!(title, " — {} unused vCPUs", node.unused_vcpus);
            }

            let slots = node
                .slots
                .iter()
                .map(|slot| SlotView {
                    x: slot.x,
                    y: slot.y,
                    width: slot.width,
                    height: slot.height,
                    occupied: slot.occupant.is_occupied(),
                    fill: match slot.occupant {
                        Occupant::Reserved => RESERVED_FILL,
                        _ => EXECUTOR_FILL,
                    },
                    label: slot.occupant.label().unwrap_or_default(),
                    label_x: slot.x + 6,
                    label_y: slot.y + 12,
                    cores: slot
                        .cores
                        .iter()
                        .map(|core| CoreView {
                            x: core.x,
                            y: core.y,
                            size: CORE_SIZE,
                            fill: if core.used { CORE_USED_FILL } else { CORE_IDLE_FILL },
                            stroke: if core.used { CORE_USED_STROKE } else { CORE_IDLE_STROKE },
                        })
                        .collect(),
                })
                .collect();

            NodeView {
                x: node.x,
                y: node.y,
                width: grid.node_width,
                height: grid.node_height,
                text_x: node.x + 12,
                header_y: node.y + 14,
                footer_y: node.y + grid.node_height - NODE_FOOTER_SPACE / 2 + 4,
                title,
                footer: format!("{} / {} executors", node.executors, grid.slots_per_node),
                slots,
            }
        })
        .collect()
}

/// Render a projection as a standalone SVG document.
pub fn render_svg(projection: &Projection) -> RenderResult<String> {
    let template = match projection {
        Projection::Infeasible { surface_width } => DiagramTemplate {
            width: u64::from(*surface_width).max(PAD * 2),
            height: MESSAGE_HEIGHT,
            has_message: true,
            message: INFEASIBLE_MESSAGE.to_string(),
            nodes: Vec::new(),
        },
        Projection::TooLarge {
            surface_width,
            cells,
        } => DiagramTemplate {
            width: u64::from(*surface_width).max(PAD * 2),
            height: MESSAGE_HEIGHT,
            has_message: true,
            message: format!(
                "Diagram too large to draw: {cells} core cells (limit {MAX_DRAWN_CELLS})."
            ),
            nodes: Vec::new(),
        },
        Projection::Grid(grid) => DiagramTemplate {
            width: grid.canvas_width,
            height: grid.canvas_height,
            has_message: false,
            message: String::new(),
            nodes: node_views(grid),
        },
    };
    let svg = template.render()?;
    tracing::debug!(bytes = svg.len(), "rendered svg diagram");
    Ok(svg)
}

/// Render a compact one-line-per-node diagram for terminals.
pub fn render_text(dist: &Distribution, params: &AllocationParams) -> String {
    if !dist.is_feasible() {
        return format!("{INFEASIBLE_MESSAGE}\n");
    }
    if dist.per_node.is_empty() {
        return "(no nodes)\n".to_string();
    }
    let cells = dist.node_count() as u64 * u64::from(dist.slots_per_node);
    if cells > MAX_DRAWN_CELLS {
        return format!(
            "Diagram too large to draw: {} nodes x {} slots (limit {MAX_DRAWN_CELLS} cells).\n",
            dist.node_count(),
            dist.slots_per_node
        );
    }

    let unused = unused_vcpus_per_node(dist, params);
    let width = dist.node_count().to_string().len();
    let mut out = String::new();

    for (idx, &placed) in dist.per_node.iter().enumerate() {
        let _ = write!(
            out,
            "Node {:>width$} {:>3}/{:<3} ",
            idx + 1,
            placed,
            dist.slots_per_node
        );
        for column in 0..dist.slots_per_node {
            let cell = if column >= placed {
                "[    ]".to_string()
            } else if dist.is_reserved_slot(idx, column) {
                "[ AM ]".to_string()
            } else {
                format!("[Ex{:<2}]", column + 1)
            };
            out.push_str(&cell);
        }
        if unused[idx] > 0 {
            let _ = write!(out, "  {} unused vCPUs", unused[idx]);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LayoutInput, project};
    use nodefit_placement::compute_distribution;

    fn svg_for(params: &AllocationParams, width: u32) -> String {
        let dist = compute_distribution(params);
        render_svg(&project(&dist, &LayoutInput::from_params(params, width))).unwrap()
    }

    #[test]
    fn svg_contains_every_node_and_slot() {
        let svg = svg_for(&AllocationParams::default(), 1200);

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("class=\"node\"").count(), 3);
        // 4 + 4 + 3 executors drawn, one of them reserved.
        assert_eq!(svg.matches("class=\"executor\"").count(), 11);
        assert_eq!(svg.matches(RESERVED_FILL).count(), 1);
        assert!(svg.contains(">AM<"));
        assert!(svg.contains(">Ex 2<"));
        assert!(svg.contains("Node 3 — 4 unused vCPUs"));
        assert!(svg.contains("width=\"1200\" height=\"350\""));
    }

    #[test]
    fn svg_marks_idle_cores() {
        let svg = svg_for(&AllocationParams::default(), 1200);
        // 12 columns of 4 cores; the empty column on node 3 is idle.
        assert_eq!(svg.matches("class=\"core\"").count(), 48);
        assert_eq!(svg.matches(CORE_IDLE_FILL).count(), 4);
    }

    #[test]
    fn svg_for_infeasible_shows_message() {
        let params = AllocationParams {
            executor_cores: 64,
            ..AllocationParams::default()
        };
        let svg = svg_for(&params, 640);
        assert!(svg.contains(INFEASIBLE_MESSAGE));
        assert!(!svg.contains("class=\"node\""));
        assert!(svg.contains("width=\"640\" height=\"100\""));
    }

    #[test]
    fn text_diagram_for_defaults() {
        let params = AllocationParams::default();
        let text = render_text(&compute_distribution(&params), &params);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Node 1   4/4"));
        assert!(lines[0].contains("[ AM ][Ex2 ][Ex3 ][Ex4 ]"));
        assert!(lines[1].contains("[Ex1 ]"));
        assert!(lines[2].ends_with("[    ]  4 unused vCPUs"));
    }

    #[test]
    fn oversized_diagrams_render_a_notice() {
        let params = AllocationParams {
            executor_cores: 1,
            executor_memory_gb: 50.0,
            node_vcpus: 20_000,
            max_executors: 2_000,
            reconcile_memory: false,
            ..AllocationParams::default()
        };
        let svg = svg_for(&params, 900);
        assert!(svg.contains("Diagram too large to draw: 40020000 core cells"));
        assert!(!svg.contains("class=\"node\""));
        assert!(svg.contains("width=\"900\" height=\"100\""));

        let fixed = AllocationParams {
            fixed_nodes: true,
            num_nodes: 10_000,
            ..AllocationParams::default()
        };
        let text = render_text(&compute_distribution(&fixed), &fixed);
        assert_eq!(
            text,
            "Diagram too large to draw: 10000 nodes x 4 slots (limit 20000 cells).\n"
        );
    }

    #[test]
    fn text_diagram_for_infeasible_and_empty() {
        let params = AllocationParams {
            executor_cores: 64,
            ..AllocationParams::default()
        };
        let text = render_text(&compute_distribution(&params), &params);
        assert_eq!(text.trim_end(), INFEASIBLE_MESSAGE);

        let params = AllocationParams {
            max_executors: 0,
            reserved_executors: 0,
            ..AllocationParams::default()
        };
        assert_eq!(render_text(&compute_distribution(&params), &params), "(no nodes)\n");
    }
}

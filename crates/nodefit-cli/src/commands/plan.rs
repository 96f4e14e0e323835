use std::path::Path;

use nodefit_core::AllocationParams;
use nodefit_layout::{LayoutInput, project, render_svg, render_text};
use nodefit_placement::{Distribution, Summary, compute_distribution};
use serde::Serialize;

use super::Resolved;

#[derive(Serialize)]
struct PlanReport<'a> {
    params: &'a AllocationParams,
    distribution: &'a Distribution,
    summary: &'a Summary,
}

pub fn plan(
    resolved: &Resolved,
    format: &str,
    width: Option<u32>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let params = resolved.params();
    let distribution = compute_distribution(&params);
    let summary = Summary::from_distribution(&distribution, &params);

    let rendered = match format {
        "json" => {
            let report = PlanReport {
                params: &params,
                distribution: &distribution,
                summary: &summary,
            };
            serde_json::to_string_pretty(&report)?
        }
        "svg" => {
            let surface_width = width.unwrap_or_else(|| resolved.config.surface_width());
            let layout = LayoutInput::from_params(&params, surface_width);
            render_svg(&project(&distribution, &layout))?
        }
        "text" => format!("{summary}\n\n{}", render_text(&distribution, &params)),
        other => anyhow::bail!("unknown format: {other} (expected text, json or svg)"),
    };

    match output {
        Some(path) => {
            std::fs::write(path, &rendered)?;
            println!("✓ Wrote {}", path.display());
        }
        None => println!("{}", rendered.trim_end()),
    }

    Ok(())
}

use nodefit_placement::{SweepRow, sweep as sweep_rows};

use super::Resolved;

pub fn sweep(resolved: &Resolved, format: &str) -> anyhow::Result<()> {
    let params = resolved.params();
    let target_nodes = resolved.inputs.target_max_nodes();
    let rows = sweep_rows(&params, target_nodes);

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&rows)?),
        "text" => print!("{}", format_table(&rows, target_nodes)),
        other => anyhow::bail!("unknown format: {other} (expected text or json)"),
    }

    Ok(())
}

fn format_table(rows: &[SweepRow], target_nodes: u32) -> String {
    let mut out = format!(
        "{:>5}  {:>12}  {:>17}  {:>13}  {:>18}\n",
        "cores",
        "unused vCPUs",
        "max exec mem (GB)",
        format!("max exec @{target_nodes}"),
        "shuffle partitions"
    );
    for row in rows {
        out.push_str(&format!(
            "{:>5}  {:>12}  {:>17}  {:>13}  {:>18}\n",
            row.executor_cores,
            row.unused_vcpus_per_node,
            row.max_executor_memory_gb,
            row.max_executors,
            row.shuffle_partitions
        ));
    }
    out.push_str("\nApply a row interactively with `apply=<cores>`.\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodefit_core::AllocationParams;

    #[test]
    fn table_has_header_and_one_line_per_row() {
        let rows = sweep_rows(&AllocationParams::default(), 3);
        let table = format_table(&rows, 3);
        let lines: Vec<&str> = table.lines().collect();

        assert!(lines[0].contains("max exec @3"));
        assert_eq!(lines[1].split_whitespace().collect::<Vec<_>>(), ["2", "0", "6", "23", "184"]);
        assert_eq!(lines[3].split_whitespace().collect::<Vec<_>>(), ["4", "0", "13", "11", "176"]);
        assert_eq!(lines.iter().filter(|l| !l.is_empty()).count(), 1 + rows.len() + 1);
    }
}

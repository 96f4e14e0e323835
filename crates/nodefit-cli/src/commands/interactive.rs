use std::time::Duration;

use nodefit_layout::render_text;
use nodefit_session::{Debouncer, InputChange, Report, Session};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::Resolved;

pub fn interactive(resolved: Resolved, debounce_ms: Option<u64>) -> anyhow::Result<()> {
    let window = Duration::from_millis(debounce_ms.unwrap_or_else(|| resolved.config.debounce_ms()));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let mut session = Session::new(resolved.inputs);
        print_report(session.recompute());
        println!("Enter key=value edits, `apply=<cores>`, `reset` or `quit`.");

        let (tx, rx) = mpsc::channel::<String>(64);
        let reader = tokio::spawn(read_lines(tx));

        Debouncer::new(window)
            .run(rx, |lines| {
                if apply_lines(&mut session, &lines) {
                    print_report(session.recompute());
                }
            })
            .await;

        reader.await??;
        Ok::<(), anyhow::Error>(())
    })
}

async fn read_lines(tx: mpsc::Sender<String>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        if matches!(line.as_str(), "quit" | "exit") {
            break;
        }
        if tx.send(line).await.is_err() {
            break;
        }
    }
    debug!("stdin closed");
    Ok(())
}

/// Apply a settled batch in order. Returns whether anything took effect.
fn apply_lines(session: &mut Session, lines: &[String]) -> bool {
    let mut changed = false;
    for line in lines {
        match line.parse::<InputChange>() {
            Ok(change) => match session.apply(change) {
                Ok(()) => changed = true,
                Err(e) => warn!(%line, "{e}"),
            },
            Err(e) => warn!(%line, "{e}"),
        }
    }
    changed
}

fn print_report(report: &Report) {
    println!("{}", report.summary);
    print!("{}", render_text(&report.distribution, &report.params));
    println!();
}

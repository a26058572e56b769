use serde::Serialize;
use wfgen_core::pipeline::RunSummary;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn print_summary(summary: &RunSummary, check: bool) {
    let verb = |applied: &'static str, pending: &'static str| -> &'static str {
        if check {
            pending
        } else {
            applied
        }
    };

    for f in &summary.sync.created {
        println!("{} {}", verb("created", "would create"), f);
    }
    for f in &summary.sync.updated {
        println!("{} {}", verb("updated", "would update"), f);
    }
    for f in &summary.sync.deleted {
        println!("{} {}", verb("deleted", "would delete"), f);
    }
    for f in &summary.sync.failed {
        println!("failed  {} ({})", f.filename, f.reason);
    }

    println!(
        "{} package(s) discovered, {} generated: {} created, {} updated, {} unchanged, {} deleted, {} failed",
        summary.discovered,
        summary.generated,
        summary.sync.created.len(),
        summary.sync.updated.len(),
        summary.sync.unchanged.len(),
        summary.sync.deleted.len(),
        summary.sync.failed.len(),
    );

    if !summary.failures.is_empty() {
        println!();
        println!("{} package(s) failed:", summary.failures.len());
        for failure in &summary.failures {
            println!("  {}: {}", failure.package, failure.reason);
        }
    }
}

//! `dockpack plan`: Show what each dependency contributes to an image.

use clap::Args;
use dockpack_engine::PackagePlan;
use serde::Serialize;

use super::workspace::Workspace;
use crate::output::format_bytes;

/// Arguments for the `plan` command.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Name of the `docker_image` target.
    pub target: String,

    /// Print the plan as JSON.
    #[arg(long)]
    pub json: bool,
}

/// One contribution as shown by `plan`.
#[derive(Debug, Serialize)]
struct ContributionRow {
    node: String,
    producer: &'static str,
    ordering_key: i32,
    files: usize,
    recipe_lines: usize,
}

/// The serializable summary of a package plan.
#[derive(Debug, Serialize)]
struct PlanReport {
    target: String,
    references: Vec<String>,
    context_digest: String,
    context_bytes: u64,
    contributions: Vec<ContributionRow>,
}

impl PlanReport {
    fn new(plan: &PackagePlan) -> Self {
        let contributions = plan
            .entries
            .iter()
            .map(|e| ContributionRow {
                node: e.origin.to_string(),
                producer: e.producer,
                ordering_key: e.contribution.ordering_key,
                files: e.contribution.files.as_ref().map_or(0, |f| f.len()),
                recipe_lines: e.contribution.recipe_lines.len(),
            })
            .collect();
        Self {
            target: plan.target.to_string(),
            references: plan.image.references().to_vec(),
            context_digest: plan.context.digest().to_string(),
            context_bytes: plan.context.tree().total_bytes(),
            contributions,
        }
    }
}

/// Executes the `plan` command.
///
/// # Errors
///
/// Returns an error if the package cannot be planned.
pub async fn execute(workspace: &Workspace, args: PlanArgs) -> anyhow::Result<()> {
    let plan = workspace.plan(&args.target).await?;
    let report = PlanReport::new(&plan);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Package plan for: {}", report.target);
    println!("{}", "\u{2550}".repeat(40));
    println!();
    println!("  {:<24} {:<20} {:>5} {:>6} {:>6}", "NODE", "PRODUCER", "ORDER", "FILES", "LINES");
    for row in &report.contributions {
        println!(
            "  {:<24} {:<20} {:>5} {:>6} {:>6}",
            row.node, row.producer, row.ordering_key, row.files, row.recipe_lines
        );
    }
    println!();
    println!("  {} contribution(s).", report.contributions.len());
    println!();
    println!("  Tags:");
    for reference in &report.references {
        println!("    {reference}");
    }
    println!();
    println!(
        "  Context: {} ({})",
        report.context_digest,
        format_bytes(report.context_bytes)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::commands::ConfigOverrides;

    #[test]
    fn report_lists_every_contribution() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("app.ini"), "[app]\n").expect("write");
        std::fs::write(
            dir.path().join("dockpack.yaml"),
            r#"
targets:
  - name: conf
    kind: files
    sources: [app.ini]
  - name: reqs
    kind: python_requirement
    requirements: [flask]
  - name: svc
    kind: docker_image
    base_image: python:3.11-slim
    dependencies: [conf, reqs]
"#,
        )
        .expect("write");

        let ws = Workspace::load(dir.path(), Path::new("dockpack.yaml"), &ConfigOverrides::default())
            .expect("load");
        let runtime = tokio::runtime::Runtime::new().expect("runtime");
        let plan = runtime.block_on(ws.plan("svc")).expect("plan");
        let report = PlanReport::new(&plan);

        assert_eq!(report.references, vec!["svc"]);
        assert_eq!(report.contributions.len(), 2);
        assert_eq!(report.contributions[0].producer, "files");
        assert_eq!(report.contributions[0].files, 1);
        assert_eq!(report.contributions[1].producer, "python-requirements");
        assert_eq!(report.contributions[1].ordering_key, -9);

        let json = serde_json::to_value(&report).expect("json");
        assert_eq!(json["target"], "//:svc");
    }
}

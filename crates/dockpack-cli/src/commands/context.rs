//! `dockpack context`: Write the build context of a target as an archive.

use std::path::PathBuf;

use clap::Args;
use dockpack_image::materialize::write_archive;

use super::workspace::Workspace;
use crate::output::format_bytes;

/// Arguments for the `context` command.
#[derive(Args, Debug)]
pub struct ContextArgs {
    /// Name of the `docker_image` target.
    pub target: String,

    /// Archive path; defaults to `<dist-dir>/<target>.context.tar.gz`.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Executes the `context` command.
///
/// # Errors
///
/// Returns an error if the package cannot be planned or the archive cannot
/// be written.
pub async fn execute(workspace: &Workspace, args: ContextArgs) -> anyhow::Result<()> {
    let plan = workspace.plan(&args.target).await?;
    let output = args
        .output
        .unwrap_or_else(|| workspace.dist_dir().join(format!("{}.context.tar.gz", args.target)));

    let size = write_archive(plan.context.tree(), &output)?;
    println!("{}", output.display());
    println!(
        "  {} file(s), {} compressed, {}",
        plan.context.tree().len(),
        format_bytes(size),
        plan.context.digest()
    );
    Ok(())
}

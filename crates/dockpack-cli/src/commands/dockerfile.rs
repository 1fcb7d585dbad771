//! `dockpack dockerfile`: Print the Dockerfile of a target.

use clap::Args;

use super::workspace::Workspace;

/// Arguments for the `dockerfile` command.
#[derive(Args, Debug)]
pub struct DockerfileArgs {
    /// Name of the `docker_image` target.
    pub target: String,
}

/// Executes the `dockerfile` command.
///
/// # Errors
///
/// Returns an error if the package cannot be planned.
pub async fn execute(workspace: &Workspace, args: DockerfileArgs) -> anyhow::Result<()> {
    let plan = workspace.plan(&args.target).await?;
    print!("{}", plan.recipe);
    Ok(())
}

//! `dockpack package`: Build the Docker image of a target.

use clap::Args;
use dockpack_image::ImageBuilder;

use super::workspace::Workspace;

/// Arguments for the `package` command.
#[derive(Args, Debug)]
pub struct PackageArgs {
    /// Name of the `docker_image` target.
    pub target: String,

    /// Save the built image to `<dist-dir>/<target>.tar`.
    #[arg(long, env = "DOCKPACK_EXPORT")]
    pub export: bool,
}

/// Executes the `package` command.
///
/// Plans the package, then runs `docker build` (and `docker save` when
/// exporting) on the blocking pool.
///
/// # Errors
///
/// Returns an error if planning fails, docker cannot be found, or a docker
/// invocation fails.
pub async fn execute(workspace: &Workspace, args: PackageArgs) -> anyhow::Result<()> {
    let plan = workspace.plan(&args.target).await?;
    let builder = ImageBuilder::from_settings(&workspace.config.docker, &workspace.root)?
        .with_export(args.export || workspace.config.docker.export);

    let target = args.target;
    let built = tokio::task::spawn_blocking(move || {
        builder.build(&target, plan.context.tree(), &plan.image)
    })
    .await??;

    for reference in &built.references {
        println!("{reference}");
    }
    println!("  context: {}", built.context_digest);
    if let Some(archive) = &built.archive {
        println!("  archive: {}", archive.display());
    }
    Ok(())
}

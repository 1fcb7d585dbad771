//! Package orchestration.
//!
//! closure -> resolve -> produce (concurrently) -> join -> assemble -> compose.

use std::sync::Arc;

use dockpack_common::error::{DockpackError, Result};
use dockpack_common::types::Address;
use dockpack_graph::BuildGraph;
use dockpack_image::ImageTag;
use tokio::task::JoinSet;

use crate::context::{BuildContext, assemble};
use crate::contribution::ContributionEntry;
use crate::recipe::{Recipe, RecipeComposer};
use crate::registry::ProducerRegistry;
use crate::resolver::{Resolution, resolve};

/// Everything needed to build the image of one target.
#[derive(Debug, Clone)]
pub struct PackagePlan {
    /// The packaged `docker_image` target.
    pub target: Address,
    /// References the image will be tagged with.
    pub image: ImageTag,
    /// Every contribution, in resolution order.
    pub entries: Vec<ContributionEntry>,
    /// Dockerfile plus application files.
    pub context: BuildContext,
    /// The composed Dockerfile.
    pub recipe: Recipe,
}

/// Plans the package of the `docker_image` target `target`.
///
/// # Errors
///
/// Returns an error if `target` is not a `docker_image`, a producer fails,
/// two contributions write the same path, or the image declares no base
/// image.
pub async fn plan_package(
    graph: &BuildGraph,
    registry: Arc<ProducerRegistry>,
    target: &str,
) -> Result<PackagePlan> {
    let image = graph.image(target)?;
    let composer = RecipeComposer::from_image(image);
    let tag = ImageTag::new(target, &image.tags, image.registry.as_deref());

    let closure = graph.closure(target)?;
    let resolutions = resolve(&closure, &registry);
    tracing::info!(
        target_name = target,
        nodes = closure.len(),
        contributions = resolutions.len(),
        "packaging"
    );

    let entries = produce_all(resolutions).await?;
    let application = assemble(&entries)?;
    let recipe = composer.compose(&entries)?;
    let context = BuildContext::new(&application, &recipe)?;

    tracing::info!(target_name = target, digest = %context.digest(), "package planned");
    Ok(PackagePlan {
        target: Address::new(target),
        image: tag,
        entries,
        context,
        recipe,
    })
}

/// Runs every resolution on the blocking pool and waits for all of them.
///
/// The first failure is returned; dropping the join set aborts whatever
/// has not started yet.
async fn produce_all(resolutions: Vec<Resolution>) -> Result<Vec<ContributionEntry>> {
    let mut join_set = JoinSet::new();
    for (seq, resolution) in resolutions.into_iter().enumerate() {
        let _ = join_set.spawn_blocking(move || {
            let Resolution {
                discovery,
                node,
                producer,
            } = resolution;
            let contribution = producer.produce(&node)?;
            Ok::<_, DockpackError>((
                seq,
                ContributionEntry {
                    origin: node.address().clone(),
                    producer: producer.name(),
                    discovery,
                    contribution,
                },
            ))
        });
    }

    let mut produced = Vec::with_capacity(join_set.len());
    while let Some(joined) = join_set.join_next().await {
        let joined = joined.map_err(|e| DockpackError::Join {
            message: e.to_string(),
        })?;
        match joined {
            Ok(entry) => produced.push(entry),
            Err(e) => {
                tracing::error!(error = %e, "producer failed");
                return Err(e);
            }
        }
    }
    produced.sort_by_key(|(seq, _)| *seq);
    Ok(produced.into_iter().map(|(_, entry)| entry).collect())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use dockpack_common::config::DockpackConfig;
    use dockpack_graph::BuildFile;

    use super::*;

    fn write(root: &Path, path: &str, content: &str) {
        let full = root.join(path);
        std::fs::create_dir_all(full.parent().expect("parent")).expect("mkdir");
        std::fs::write(full, content).expect("write");
    }

    fn load(root: &Path, yaml: &str) -> (BuildGraph, Arc<ProducerRegistry>) {
        let file = BuildFile::parse(yaml).expect("parse");
        let graph = BuildGraph::from_build_file(&file, root).expect("graph");
        let registry =
            ProducerRegistry::with_defaults(&file.config(), root).expect("registry");
        (graph, Arc::new(registry))
    }

    const BUILD: &str = r#"
targets:
  - name: app
    kind: python_sources
    sources: ["src/python/app/*.py"]
  - name: reqs
    kind: python_requirement
    requirements: ["flask==2.0.1"]
  - name: svc
    kind: docker_image
    base_image: python:3.11-slim
    command: ["python", "-m", "app"]
    tags: ["v1"]
    dependencies: [app, reqs]
"#;

    #[tokio::test]
    async fn plans_sources_and_requirements() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "src/python/app/__main__.py", "print('hi')\n");
        let (graph, registry) = load(dir.path(), BUILD);

        let plan = plan_package(&graph, registry, "svc").await.expect("plan");
        assert_eq!(plan.target, Address::new("svc"));
        assert_eq!(plan.image.references(), ["svc:v1", "svc"]);
        assert_eq!(
            plan.recipe.lines(),
            [
                "FROM python:3.11-slim",
                "WORKDIR container",
                "RUN python -m pip install --index-url https://pypi.org/simple/ flask==2.0.1",
                "COPY application .",
                r#"CMD ["python","-m","app"]"#,
            ]
        );
        assert!(plan.context.tree().contains("application/app/__main__.py"));
        assert!(plan.context.tree().contains("Dockerfile"));
    }

    #[tokio::test]
    async fn producer_failure_aborts_the_package() {
        let dir = tempfile::tempdir().expect("tempdir");
        let yaml = r#"
targets:
  - name: conf
    kind: files
    sources: ["missing.ini"]
  - name: svc
    kind: docker_image
    base_image: alpine
    dependencies: [conf]
"#;
        let (graph, registry) = load(dir.path(), yaml);
        let msg = plan_package(&graph, registry, "svc")
            .await
            .unwrap_err()
            .to_string();
        assert!(msg.contains("missing.ini"), "got: {msg}");
    }

    #[tokio::test]
    async fn non_image_target_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "src/python/app/__main__.py", "");
        let (graph, registry) = load(dir.path(), BUILD);
        assert!(plan_package(&graph, registry, "app").await.is_err());
    }

    #[tokio::test]
    async fn produce_all_keeps_resolution_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        for i in 0..8 {
            write(dir.path(), &format!("f{i}.txt"), "x");
        }
        let mut yaml = String::from("targets:\n");
        let mut deps = Vec::new();
        for i in 0..8 {
            yaml.push_str(&format!(
                "  - name: f{i}\n    kind: files\n    sources: [\"f{i}.txt\"]\n"
            ));
            deps.push(format!("f{i}"));
        }
        yaml.push_str(&format!(
            "  - name: svc\n    kind: docker_image\n    base_image: alpine\n    dependencies: [{}]\n",
            deps.join(", ")
        ));

        let file = BuildFile::parse(&yaml).expect("parse");
        let graph = BuildGraph::from_build_file(&file, dir.path()).expect("graph");
        let registry =
            ProducerRegistry::with_defaults(&DockpackConfig::default(), dir.path()).expect("registry");
        let closure = graph.closure("svc").expect("closure");
        let entries = produce_all(resolve(&closure, &registry)).await.expect("produce");

        let origins: Vec<String> = entries.iter().map(|e| e.origin.to_string()).collect();
        let expected: Vec<String> = (0..8).map(|i| format!("//:f{i}")).collect();
        assert_eq!(origins, expected);
    }
}

//! `resources`: copy static resources verbatim.

use super::output;
use crate::config::{ProjectConfig, ProjectPaths};
use crate::task::{Inputs, TaskHandle, TransformRegistry};
use anyhow::Result;
use std::sync::Arc;

pub fn patterns(paths: &ProjectPaths) -> Vec<String> {
    vec![paths.pattern("resources/**/*")]
}

pub fn register(reg: &mut TransformRegistry, config: &Arc<ProjectConfig>) -> Result<TaskHandle> {
    let paths = config.paths();
    reg.register("resources", Inputs::Globs(patterns(&paths)), move |files| {
        let paths = paths.clone();
        async move {
            let from = paths.source().join("resources");
            let to = paths.resources_dir();
            output::for_each_file(files, |file| {
                let target = output::rebase(&file, &from, &to);
                async move {
                    output::copy(&file, &target).await?;
                    Ok(vec![target])
                }
            })
            .await
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::task::executor;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_copies_tree() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src/resources/docs");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("guide.pdf"), b"%PDF").unwrap();
        fs::write(dir.path().join("src/resources/robots.txt"), "User-agent: *").unwrap();

        let config = Arc::new(test_config(dir.path()));
        let mut reg = TransformRegistry::new(dir.path());
        let task = register(&mut reg, &config).unwrap();

        assert!(executor::run(&task.into()).await.is_success());
        let out = dir.path().join("build/resources");
        assert_eq!(fs::read(out.join("docs/guide.pdf")).unwrap(), b"%PDF");
        assert!(out.join("robots.txt").is_file());
    }
}

use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use directories::ProjectDirs;

pub const PROJECT_NAME: &str = "deploytree";

pub const CLI_PROGRAM_NAME: &str = "kubectl-deploytree";
pub const CLI_CONFIG_NAME: &str = "config.yaml";

pub static PROJECT_CONFIG_DIR: LazyLock<PathBuf> = LazyLock::new(|| {
    ProjectDirs::from("", PROJECT_NAME, PROJECT_NAME)
        .expect("Creating `ProjectDirs` should always success")
        .config_dir()
        .to_path_buf()
});

/// Configuration directories searched after [`PROJECT_CONFIG_DIR`], in order.
#[must_use]
pub fn fallback_project_config_directories() -> Vec<PathBuf> {
    let Some(user_dirs) = directories::UserDirs::new() else {
        return Vec::new();
    };
    vec![
        [user_dirs.home_dir(), Path::new(".config"), Path::new(PROJECT_NAME)].iter().collect(),
        [user_dirs.home_dir(), Path::new(&format!(".{PROJECT_NAME}"))].iter().collect(),
    ]
}

/// Candidate configuration file paths, most specific first.
#[must_use]
pub fn config_file_candidates() -> Vec<PathBuf> {
    std::iter::once(PROJECT_CONFIG_DIR.clone())
        .chain(fallback_project_config_directories())
        .map(|mut path| {
            path.push(CLI_CONFIG_NAME);
            path
        })
        .collect()
}

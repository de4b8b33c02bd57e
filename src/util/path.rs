use std::path::{Path, PathBuf};

/// Expand `~`, `$VAR` and `${VAR}` in a path; unknown variables are left as is.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Expand `path` and resolve it against `base_dir` when relative.
pub fn resolve_against(base_dir: Option<&Path>, path: &Path) -> PathBuf {
    let expanded = PathBuf::from(expand_env_vars(&path.to_string_lossy()));
    match base_dir {
        Some(dir) if expanded.is_relative() => dir.join(expanded),
        _ => expanded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_relative_path_when_resolving_then_joins_base_dir() {
        let resolved = resolve_against(Some(Path::new("/data/trees")), Path::new("root.fa"));
        assert_eq!(resolved, PathBuf::from("/data/trees/root.fa"));
    }

    #[test]
    fn given_absolute_path_when_resolving_then_keeps_it() {
        let resolved = resolve_against(Some(Path::new("/data")), Path::new("/seq/root.fa"));
        assert_eq!(resolved, PathBuf::from("/seq/root.fa"));
    }

    #[test]
    fn given_tilde_when_expanding_then_uses_home() {
        let home = std::env::var("HOME").expect("HOME should be set");
        assert!(expand_env_vars("~/x.fa").starts_with(&home));
    }
}

//! Build metadata embedded by vergen.

/// Package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Short git commit at build time, or "unknown" outside a checkout.
pub const GIT_SHA: &str = match option_env!("VERGEN_GIT_SHA") {
    Some(sha) => sha,
    None => "unknown",
};

fn git_dirty() -> bool {
    option_env!("VERGEN_GIT_DIRTY") == Some("true")
}

/// `{version}+{sha}` with a `.dirty` suffix for modified trees.
///
/// The sha part is dropped when vergen could not read git metadata, so
/// release tarballs report a plain `0.1.0`.
pub fn version_string() -> String {
    if GIT_SHA == "unknown" || GIT_SHA.starts_with("VERGEN") {
        return PKG_VERSION.to_string();
    }
    let sha = &GIT_SHA[..7.min(GIT_SHA.len())];
    if git_dirty() {
        format!("{PKG_VERSION}+{sha}.dirty")
    } else {
        format!("{PKG_VERSION}+{sha}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_pkg_version() {
        assert!(version_string().starts_with(PKG_VERSION));
    }

    #[test]
    fn version_string_has_no_placeholder() {
        assert!(!version_string().contains("VERGEN"));
    }
}

//! API token discovery.
//!
//! A bare file name (the default `.agtoken`) is searched for in the working
//! directory and each parent up to and including the home directory. A path
//! with a directory component is read directly.
//!
//! `find_token_at` takes explicit `cwd` / `home` roots for tests; `find_token`
//! derives them from the process environment.

use std::path::Path;

use crate::error::{io_err, ClientError};

/// Token file name used when no `--token-file` is given.
pub const DEFAULT_TOKEN_FILE: &str = ".agtoken";

/// Locate and read the API token named by `token_file`.
pub fn find_token_at(token_file: &Path, cwd: &Path, home: &Path) -> Result<String, ClientError> {
    let not_found = || ClientError::TokenNotFound {
        filename: token_file.to_path_buf(),
    };

    let has_dir = token_file
        .parent()
        .is_some_and(|parent| !parent.as_os_str().is_empty());
    if has_dir {
        let path = cwd.join(token_file);
        if !path.is_file() {
            return Err(not_found());
        }
        return read_token(&path);
    }

    if !cwd.starts_with(home) {
        return Err(not_found());
    }
    for dir in cwd.ancestors() {
        let candidate = dir.join(token_file);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "using API token file");
            return read_token(&candidate);
        }
        if dir == home {
            break;
        }
    }
    Err(not_found())
}

/// `find_token_at` convenience wrapper using the current directory and `$HOME`.
pub fn find_token(token_file: &Path) -> Result<String, ClientError> {
    let cwd = std::env::current_dir().map_err(|e| io_err(".", e))?;
    let home = dirs::home_dir().ok_or(ClientError::HomeNotFound)?;
    find_token_at(token_file, &cwd, &home)
}

fn read_token(path: &Path) -> Result<String, ClientError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    Ok(contents.trim().to_owned())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;

    fn layout() -> (TempDir, PathBuf) {
        let home = TempDir::new().expect("home");
        let cwd = home.path().join("courses").join("eecs280").join("hw1");
        fs::create_dir_all(&cwd).expect("mkdir");
        (home, cwd)
    }

    #[test]
    fn finds_token_in_parent_directory() {
        let (home, cwd) = layout();
        fs::write(home.path().join("courses").join(".agtoken"), "secret\n").unwrap();
        let token = find_token_at(Path::new(DEFAULT_TOKEN_FILE), &cwd, home.path()).unwrap();
        assert_eq!(token, "secret");
    }

    #[test]
    fn nearest_token_wins() {
        let (home, cwd) = layout();
        fs::write(home.path().join(".agtoken"), "outer").unwrap();
        fs::write(cwd.join(".agtoken"), "inner").unwrap();
        let token = find_token_at(Path::new(DEFAULT_TOKEN_FILE), &cwd, home.path()).unwrap();
        assert_eq!(token, "inner");
    }

    #[test]
    fn home_directory_is_searched_last() {
        let (home, cwd) = layout();
        fs::write(home.path().join(".agtoken"), "at-home").unwrap();
        let token = find_token_at(Path::new(DEFAULT_TOKEN_FILE), &cwd, home.path()).unwrap();
        assert_eq!(token, "at-home");
    }

    #[test]
    fn missing_token_is_an_error() {
        let (home, cwd) = layout();
        let err = find_token_at(Path::new(DEFAULT_TOKEN_FILE), &cwd, home.path()).unwrap_err();
        assert!(matches!(err, ClientError::TokenNotFound { .. }));
        assert!(err.to_string().contains(".agtoken"));
    }

    #[test]
    fn cwd_outside_home_is_not_searched() {
        let (home, _) = layout();
        let elsewhere = TempDir::new().expect("elsewhere");
        fs::write(elsewhere.path().join(".agtoken"), "nope").unwrap();
        let err =
            find_token_at(Path::new(DEFAULT_TOKEN_FILE), elsewhere.path(), home.path()).unwrap_err();
        assert!(matches!(err, ClientError::TokenNotFound { .. }));
    }

    #[test]
    fn path_with_directory_is_read_directly() {
        let (home, cwd) = layout();
        fs::create_dir_all(cwd.join("secrets")).unwrap();
        fs::write(cwd.join("secrets").join("token"), "  direct  ").unwrap();
        let token = find_token_at(Path::new("secrets/token"), &cwd, home.path()).unwrap();
        assert_eq!(token, "direct");

        let err = find_token_at(Path::new("secrets/missing"), &cwd, home.path()).unwrap_err();
        assert!(matches!(err, ClientError::TokenNotFound { .. }));
    }
}

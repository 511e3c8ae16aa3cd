//! File retrieval endpoint
//!
//! Serves files out of the configured upload directory. The filename goes
//! through the same sanitation the original server used: leading traversal
//! sequences are stripped, then containment is checked. The default
//! containment check is a raw string prefix comparison, which is a known-weak
//! test (interior `..` segments and sibling directories sharing the prefix
//! both pass it); `security.strict_path_check` switches to canonical-path
//! ancestor containment.

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

use tokio::fs;

use crate::error::AppError;
use crate::http::mime;
use crate::logger;

/// Strip leading repetitions of `../` or `..\`, and a bare trailing `..`
///
/// Deliberately only leading sequences; `a/../../b` survives untouched.
pub fn sanitize_filename(raw: &str) -> &str {
    let mut rest = raw;
    loop {
        if let Some(r) = rest.strip_prefix("../") {
            rest = r;
        } else if let Some(r) = rest.strip_prefix("..\\") {
            rest = r;
        } else if rest == ".." {
            rest = "";
        } else {
            return rest;
        }
    }
}

/// Resolve and read a file for `GET /files/{filename}`
///
/// Returns the file bytes and content type, or `AccessDenied` /
/// `FileNotFound`.
pub async fn read_upload(
    upload_dir: &str,
    strict: bool,
    raw_filename: &str,
) -> Result<(Vec<u8>, &'static str), AppError> {
    let decoded = urlencoding::decode(raw_filename)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| raw_filename.to_string());
    let filename = sanitize_filename(&decoded);
    let joined = Path::new(upload_dir).join(filename);

    let (allowed, candidate) = if strict {
        let allowed = contained_canonical(&joined, upload_dir)?;
        (allowed, joined)
    } else {
        // Joining in the original normalized `.` and `..` segments before the
        // prefix comparison ran; reproduce that so the only hole left is the
        // sibling-directory name sharing the prefix
        let normalized = normalize_lexically(&joined);
        let allowed = normalized.to_string_lossy().starts_with(upload_dir);
        (allowed, normalized)
    };
    if !allowed {
        logger::log_warning(&format!("Path containment rejected: {raw_filename}"));
        return Err(AppError::AccessDenied);
    }

    let data = fs::read(&candidate)
        .await
        .map_err(|_| AppError::FileNotFound)?;
    let content_type = mime::get_content_type(candidate.extension().and_then(|e| e.to_str()));
    Ok((data, content_type))
}

/// Resolve `.` and `..` components textually, without touching the
/// filesystem
///
/// `/a/b/../c` becomes `/a/c`; `..` at a root stays at the root; `..` at the
/// start of a relative path is kept.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    out
}

/// Canonicalize both sides and require ancestor containment
fn contained_canonical(candidate: &Path, upload_dir: &str) -> Result<bool, AppError> {
    let root = Path::new(upload_dir).canonicalize().map_err(|e| {
        logger::log_warning(&format!("Upload directory inaccessible '{upload_dir}': {e}"));
        AppError::FileNotFound
    })?;
    // A candidate that does not exist cannot be read anyway
    let resolved: PathBuf = candidate.canonicalize().map_err(|_| AppError::FileNotFound)?;
    Ok(resolved.starts_with(&root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as std_fs;

    #[test]
    fn test_sanitize_strips_leading_traversal() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "etc/passwd");
        assert_eq!(sanitize_filename("..\\..\\secret"), "secret");
        assert_eq!(sanitize_filename("../..\\mixed"), "mixed");
        assert_eq!(sanitize_filename(".."), "");
    }

    #[test]
    fn test_sanitize_leaves_normal_names() {
        assert_eq!(sanitize_filename("report.pdf"), "report.pdf");
        assert_eq!(sanitize_filename("sub/dir/file.txt"), "sub/dir/file.txt");
        assert_eq!(sanitize_filename("..hidden"), "..hidden");
    }

    #[test]
    fn test_sanitize_keeps_interior_traversal() {
        // The known gap: only leading sequences are stripped
        assert_eq!(sanitize_filename("a/../../b"), "a/../../b");
    }

    #[test]
    fn test_normalize_lexically() {
        assert_eq!(
            normalize_lexically(Path::new("/a/b/../c")),
            PathBuf::from("/a/c")
        );
        assert_eq!(
            normalize_lexically(Path::new("/a/../../b")),
            PathBuf::from("/b")
        );
        assert_eq!(
            normalize_lexically(Path::new("up/x/../../up-evil/f")),
            PathBuf::from("up-evil/f")
        );
        assert_eq!(
            normalize_lexically(Path::new("up/../../f")),
            PathBuf::from("../f")
        );
        assert_eq!(
            normalize_lexically(Path::new("a/./b")),
            PathBuf::from("a/b")
        );
    }

    #[tokio::test]
    async fn test_serves_existing_file() {
        let root = tempfile::tempdir().unwrap();
        let uploads = root.path().join("uploads");
        std_fs::create_dir(&uploads).unwrap();
        std_fs::write(uploads.join("hello.txt"), b"bonjour").unwrap();

        let dir = uploads.to_string_lossy().into_owned();
        let (data, content_type) = read_upload(&dir, false, "hello.txt").await.unwrap();
        assert_eq!(data, b"bonjour");
        assert_eq!(content_type, "text/plain; charset=utf-8");
    }

    #[tokio::test]
    async fn test_missing_file_is_404() {
        let root = tempfile::tempdir().unwrap();
        let uploads = root.path().join("uploads");
        std_fs::create_dir(&uploads).unwrap();

        let dir = uploads.to_string_lossy().into_owned();
        let err = read_upload(&dir, false, "nope.txt").await.unwrap_err();
        assert!(matches!(err, AppError::FileNotFound));
    }

    #[tokio::test]
    async fn test_leading_traversal_cannot_reach_outside() {
        let root = tempfile::tempdir().unwrap();
        let uploads = root.path().join("uploads");
        std_fs::create_dir(&uploads).unwrap();
        std_fs::write(root.path().join("secret.txt"), b"top secret").unwrap();

        let dir = uploads.to_string_lossy().into_owned();
        // Stripped to "secret.txt", which does not exist inside uploads
        let err = read_upload(&dir, false, "../secret.txt").await.unwrap_err();
        assert!(matches!(err, AppError::FileNotFound));
        // Percent-encoded variant decodes then sanitizes the same way
        let err = read_upload(&dir, false, "..%2F..%2Fsecret.txt")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::FileNotFound));
    }

    #[tokio::test]
    async fn test_absolute_path_rejected_by_prefix_check() {
        let root = tempfile::tempdir().unwrap();
        let uploads = root.path().join("uploads");
        std_fs::create_dir(&uploads).unwrap();

        let dir = uploads.to_string_lossy().into_owned();
        // Path::join replaces the base on an absolute component
        let err = read_upload(&dir, false, "%2Fetc%2Fpasswd").await.unwrap_err();
        assert!(matches!(err, AppError::AccessDenied));
    }

    #[tokio::test]
    async fn test_weak_check_blocks_interior_traversal_outside_prefix() {
        // Interior `..` segments normalize away before the prefix check, so
        // a path that leaves the upload directory no longer shares its prefix
        let root = tempfile::tempdir().unwrap();
        let uploads = root.path().join("uploads");
        std_fs::create_dir_all(uploads.join("sub")).unwrap();
        std_fs::write(root.path().join("secret.txt"), b"top secret").unwrap();

        let dir = uploads.to_string_lossy().into_owned();
        let err = read_upload(&dir, false, "sub/../../secret.txt")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AccessDenied));

        // Deep climbs toward the filesystem root are rejected the same way
        let err = read_upload(&dir, false, "a/../../../../../../etc/passwd")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AccessDenied));
    }

    #[tokio::test]
    async fn test_weak_check_leaks_sibling_directory_sharing_prefix() {
        // The documented hole of the weak posture: a sibling directory whose
        // name extends the upload directory's path string passes the prefix
        // comparison
        let root = tempfile::tempdir().unwrap();
        let uploads = root.path().join("up");
        std_fs::create_dir(&uploads).unwrap();
        let sibling = root.path().join("up-evil");
        std_fs::create_dir(&sibling).unwrap();
        std_fs::write(sibling.join("shadow.txt"), b"sibling data").unwrap();

        let dir = uploads.to_string_lossy().into_owned();
        let (data, _) = read_upload(&dir, false, "x/../../up-evil/shadow.txt")
            .await
            .unwrap();
        assert_eq!(data, b"sibling data");
    }

    #[tokio::test]
    async fn test_strict_check_blocks_sibling_directory() {
        let root = tempfile::tempdir().unwrap();
        let uploads = root.path().join("up");
        std_fs::create_dir_all(uploads.join("x")).unwrap();
        let sibling = root.path().join("up-evil");
        std_fs::create_dir(&sibling).unwrap();
        std_fs::write(sibling.join("shadow.txt"), b"sibling data").unwrap();

        let dir = uploads.to_string_lossy().into_owned();
        let err = read_upload(&dir, true, "x/../../up-evil/shadow.txt")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AccessDenied));
    }

    #[tokio::test]
    async fn test_strict_check_blocks_interior_traversal() {
        let root = tempfile::tempdir().unwrap();
        let uploads = root.path().join("uploads");
        std_fs::create_dir_all(uploads.join("sub")).unwrap();
        std_fs::write(root.path().join("secret.txt"), b"top secret").unwrap();

        let dir = uploads.to_string_lossy().into_owned();
        let err = read_upload(&dir, true, "sub/../../secret.txt")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AccessDenied));
    }

    #[tokio::test]
    async fn test_strict_check_still_serves_normal_files() {
        let root = tempfile::tempdir().unwrap();
        let uploads = root.path().join("uploads");
        std_fs::create_dir(&uploads).unwrap();
        std_fs::write(uploads.join("data.json"), b"{}").unwrap();

        let dir = uploads.to_string_lossy().into_owned();
        let (data, content_type) = read_upload(&dir, true, "data.json").await.unwrap();
        assert_eq!(data, b"{}");
        assert_eq!(content_type, "application/json");
    }
}

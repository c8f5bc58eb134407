// src/utils.rs
use anyhow::{Context, Result};
use std::path::Path;

/// Make a user-typed name safe to use as a file stem.
///
/// Keeps spaces and unicode letters; only path separators, characters
/// reserved on common filesystems and control characters are replaced.
pub fn sanitize_file_stem(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim_matches('.')
        .to_string()
}

/// Get file extension in lowercase
pub fn get_file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Ensure directory exists
pub async fn ensure_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        tokio::fs::create_dir_all(path)
            .await
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read file content as string with proper error context
pub async fn read_file_content(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Write bytes, creating parent directories as needed
pub async fn write_file_bytes(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_directory(parent).await?;
    }

    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_stem() {
        assert_eq!(sanitize_file_stem("Jane Doe"), "Jane Doe");
        assert_eq!(sanitize_file_stem("  José Núñez "), "José Núñez");
        assert_eq!(sanitize_file_stem("../etc/passwd"), "_etc_passwd");
        assert_eq!(sanitize_file_stem("a:b*c?"), "a_b_c_");
        assert_eq!(sanitize_file_stem("   "), "");
    }

    #[test]
    fn test_get_file_extension() {
        assert_eq!(get_file_extension("cv.TOML"), Some("toml".to_string()));
        assert_eq!(get_file_extension("photo.png"), Some("png".to_string()));
        assert_eq!(get_file_extension("noext"), None);
    }

    #[tokio::test]
    async fn test_write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/out/cv.pdf");

        write_file_bytes(&target, b"%PDF-1.7").await.unwrap();

        assert_eq!(tokio::fs::read(&target).await.unwrap(), b"%PDF-1.7");
        let text = read_file_content(&target).await.unwrap();
        assert!(text.starts_with("%PDF"));
    }
}

use crate::types::FileTask;
use anyhow::{Context, Result, anyhow};
use std::{
    fs,
    path::{Path, PathBuf},
};
use walkdir::{DirEntry, WalkDir};

/// Nhận .tif/.tiff (không phân biệt hoa thường).
/// So trên bytes nên tên file không phải UTF-8 vẫn được nhận.
pub fn is_raster_file(p: &Path) -> bool {
    let Some(name) = p.file_name() else {
        return false;
    };
    let bytes = name.as_encoded_bytes();
    [".tif", ".tiff"].iter().any(|suffix| {
        bytes.len() >= suffix.len()
            && bytes[bytes.len() - suffix.len()..].eq_ignore_ascii_case(suffix.as_bytes())
    })
}

/// File thường, hoặc symlink trỏ tới file thường
fn is_regular_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

/// Output root nằm bên trong source root => không đi vào đó,
/// tránh đọc lại chính file vừa ghi ra.
fn nested_output_dir(source_root: &Path, output_root: &Path) -> Option<PathBuf> {
    let src = std::path::absolute(source_root).ok()?;
    let out = std::path::absolute(output_root).ok()?;
    if out != src && out.starts_with(&src) {
        Some(out)
    } else {
        None
    }
}

/// Quét đệ quy source_root, trả về raster theo đúng thứ tự filesystem liệt kê.
pub fn discover_rasters(source_root: &Path, output_root: &Path) -> Vec<PathBuf> {
    if !source_root.exists() {
        tracing::warn!(root = %source_root.display(), "source root does not exist");
        return Vec::new();
    }

    let skip_dir = nested_output_dir(source_root, output_root);
    let mut out = Vec::new();

    // file trước, folder con sau (giống os.walk); sort stable nên giữ thứ tự filesystem
    let walker = WalkDir::new(source_root)
        .sort_by(|a, b| a.file_type().is_dir().cmp(&b.file_type().is_dir()))
        .into_iter()
        .filter_entry(|e| match &skip_dir {
            Some(skip) if e.depth() > 0 && e.file_type().is_dir() => {
                std::path::absolute(e.path())
                    .map(|p| &p != skip)
                    .unwrap_or(true)
            }
            _ => true,
        });

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable entry");
                continue;
            }
        };

        if !is_regular_file(&entry) || !is_raster_file(entry.path()) {
            continue;
        }

        out.push(entry.into_path());
    }

    out
}

/// Tạo FileTask: output = output_root + (source path tương đối với source_root)
pub fn build_task(source_root: &Path, output_root: &Path, source_path: &Path) -> Result<FileTask> {
    let relative_path = source_path
        .strip_prefix(source_root)
        .map_err(|_| {
            anyhow!(
                "{} is not under source root {}",
                source_path.display(),
                source_root.display()
            )
        })?
        .to_path_buf();

    if relative_path.as_os_str().is_empty() {
        return Err(anyhow!(
            "source path {} is the source root itself",
            source_path.display()
        ));
    }

    Ok(FileTask {
        source_path: source_path.to_path_buf(),
        output_path: output_root.join(&relative_path),
        relative_path,
    })
}

/// create_dir_all cho folder cha của output; gọi nhiều lần vẫn OK
pub fn ensure_parent_dir(output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if parent.as_os_str().is_empty() {
            return Ok(());
        }
        fs::create_dir_all(parent)
            .with_context(|| format!("create_dir_all {}", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tempfile::tempdir;

    fn touch(p: &Path) {
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, b"II*\0").unwrap();
    }

    fn names(paths: &[PathBuf], root: &Path) -> BTreeSet<String> {
        paths
            .iter()
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_is_raster_file_suffixes() {
        assert!(is_raster_file(Path::new("a/b/dem.tif")));
        assert!(is_raster_file(Path::new("dem.TIF")));
        assert!(is_raster_file(Path::new("dem.Tiff")));
        assert!(!is_raster_file(Path::new("dem.tif.aux.xml")));
        assert!(!is_raster_file(Path::new("dem.png")));
        assert!(!is_raster_file(Path::new("tif")));
        assert!(!is_raster_file(Path::new("dem.gtiff2")));
    }

    #[test]
    fn test_discover_recurses_and_filters() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("raw");
        touch(&src.join("region1/ESA_WorldCover_2021.tif"));
        touch(&src.join("region1/elevation.TIFF"));
        touch(&src.join("region1/notes.txt"));
        touch(&src.join("deep/a/b/slope.tif"));
        // folder có đuôi .tif không được chọn
        fs::create_dir_all(src.join("folder.tif")).unwrap();

        let found = discover_rasters(&src, &dir.path().join("out"));
        let expected: BTreeSet<String> = [
            "region1/ESA_WorldCover_2021.tif",
            "region1/elevation.TIFF",
            "deep/a/b/slope.tif",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        assert_eq!(names(&found, &src), expected);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_name_is_selected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let name = OsStr::from_bytes(b"dem_\xff.TIF");
        assert!(is_raster_file(Path::new(name)));
        assert!(!is_raster_file(Path::new(OsStr::from_bytes(b"dem_\xff.png"))));

        let dir = tempdir().unwrap();
        let src = dir.path().join("raw");
        fs::create_dir_all(&src).unwrap();
        // một số filesystem (vd: APFS) từ chối tên không phải UTF-8
        if fs::write(src.join(name), b"II*\0").is_err() {
            return;
        }

        let found = discover_rasters(&src, &dir.path().join("out"));
        assert_eq!(found, vec![src.join(name)]);
    }

    #[test]
    fn test_files_listed_before_subdirectories() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("raw");
        touch(&src.join("a_sub/inner.tif"));
        touch(&src.join("top.tif"));
        touch(&src.join("z_sub/deeper/leaf.tif"));

        let found = discover_rasters(&src, &dir.path().join("out"));
        assert_eq!(found.len(), 3);
        assert_eq!(found[0], src.join("top.tif"));
    }

    #[test]
    fn test_discover_missing_or_empty_root() {
        let dir = tempdir().unwrap();
        assert!(discover_rasters(&dir.path().join("nope"), dir.path()).is_empty());

        let empty = dir.path().join("empty");
        fs::create_dir_all(&empty).unwrap();
        assert!(discover_rasters(&empty, dir.path()).is_empty());
    }

    #[test]
    fn test_discover_skips_nested_output_root() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("data");
        let out = src.join("warped");
        touch(&src.join("dem.tif"));
        touch(&out.join("dem.tif"));

        let found = discover_rasters(&src, &out);
        assert_eq!(found, vec![src.join("dem.tif")]);
    }

    #[test]
    fn test_discover_output_equal_to_source_is_not_skipped() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("dem.tif"));
        assert_eq!(discover_rasters(dir.path(), dir.path()).len(), 1);
    }

    #[test]
    fn test_build_task_mirrors_relative_path() {
        let src = Path::new("raw");
        let out = Path::new("out");
        let task = build_task(src, out, &src.join("region1").join("elevation.tif")).unwrap();

        assert_eq!(task.relative_path, Path::new("region1").join("elevation.tif"));
        assert_eq!(task.output_path, out.join("region1").join("elevation.tif"));
        assert_eq!(task.source_path, src.join("region1").join("elevation.tif"));
    }

    #[test]
    fn test_build_task_rejects_foreign_path() {
        assert!(build_task(Path::new("raw"), Path::new("out"), Path::new("other/x.tif")).is_err());
        assert!(build_task(Path::new("raw"), Path::new("out"), Path::new("raw")).is_err());
    }

    #[test]
    fn test_ensure_parent_dir_idempotent() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("a/b/c/out.tif");

        ensure_parent_dir(&target).unwrap();
        assert!(dir.path().join("a/b/c").is_dir());
        ensure_parent_dir(&target).unwrap();
        assert!(!target.exists());
    }

    #[test]
    fn test_ensure_parent_dir_fails_when_parent_is_file() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("blocker"));
        assert!(ensure_parent_dir(&dir.path().join("blocker/out.tif")).is_err());
    }
}

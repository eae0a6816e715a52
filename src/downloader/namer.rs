// src/downloader/namer.rs

use crate::{constants, utils};
use log::debug;
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

/// 为每个下载项分配一个本次运行内唯一、且不覆盖已有文件的保存路径。
///
/// "检查是否存在 + 登记" 在同一把锁内完成，并发下载时也不会分到同一路径。
#[derive(Debug, Default)]
pub struct FileNamer {
    reserved: Mutex<HashSet<PathBuf>>,
}

impl FileNamer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name_file(&self, suggested: Option<&str>, dest_dir: &Path) -> PathBuf {
        let base_name = match suggested.map(str::trim).filter(|s| !s.is_empty()) {
            Some(name) => utils::sanitize_filename(name),
            None => fallback_filename(),
        };
        let (stem, ext) = utils::split_extension(&base_name);

        let mut reserved = self.reserved.lock().unwrap_or_else(PoisonError::into_inner);
        let mut candidate = dest_dir.join(&base_name);
        let mut counter = 1;
        while candidate.exists() || reserved.contains(&candidate) {
            let name = match ext {
                Some(ext) => format!("{}_{}.{}", stem, counter, ext),
                None => format!("{}_{}", stem, counter),
            };
            candidate = dest_dir.join(name);
            counter += 1;
        }
        if counter > 1 {
            debug!("文件名 '{}' 已被占用，改用 {:?}", base_name, candidate.file_name());
        }
        reserved.insert(candidate.clone());
        candidate
    }
}

/// 无法得知文件名时使用 `file_<unix 时间戳>.downloaded`
fn fallback_filename() -> String {
    format!(
        "{}{}.{}",
        constants::FALLBACK_FILE_PREFIX,
        chrono::Utc::now().timestamp(),
        constants::FALLBACK_FILE_EXTENSION
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn file_name(path: &Path) -> String {
        path.file_name().unwrap().to_string_lossy().into_owned()
    }

    #[test]
    fn test_same_name_gets_numeric_suffix_in_call_order() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().to_path_buf();
        let namer = FileNamer::new();
        let names: Vec<String> = (0..3)
            .map(|_| file_name(&namer.name_file(Some("report.pdf"), &dir)))
            .collect();
        assert_eq!(names, vec!["report.pdf", "report_1.pdf", "report_2.pdf"]);
    }

    #[test]
    fn test_existing_files_on_disk_are_not_overwritten() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().to_path_buf();
        fs::write(dir.join("photo.jpg"), b"x").unwrap();
        fs::write(dir.join("photo_1.jpg"), b"x").unwrap();
        fs::write(dir.join("README"), b"x").unwrap();

        let namer = FileNamer::new();
        assert_eq!(file_name(&namer.name_file(Some("photo.jpg"), &dir)), "photo_2.jpg");
        assert_eq!(file_name(&namer.name_file(Some("README"), &dir)), "README_1");
    }

    #[test]
    fn test_missing_name_uses_timestamp_fallback() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().to_path_buf();
        let namer = FileNamer::new();
        let first = file_name(&namer.name_file(None, &dir));
        let second = file_name(&namer.name_file(Some("   "), &dir));
        assert!(first.starts_with("file_") && first.ends_with(".downloaded"), "{}", first);
        assert!(second.starts_with("file_") && second.ends_with(".downloaded"), "{}", second);
        assert_ne!(first, second);
    }

    #[test]
    fn test_unsafe_names_stay_inside_destination() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().to_path_buf();
        let namer = FileNamer::new();
        let path = namer.name_file(Some("../../etc/passwd"), &dir);
        assert_eq!(path.parent(), Some(dir.as_path()));
        assert_eq!(file_name(&path), "etc passwd");
    }

    #[test]
    fn test_different_names_never_collide() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().to_path_buf();
        let namer = FileNamer::new();
        let inputs = ["a.txt", "a_1.txt", "a.txt", "a.txt"];
        let paths: HashSet<PathBuf> = inputs
            .iter()
            .map(|n| namer.name_file(Some(n), &dir))
            .collect();
        assert_eq!(paths.len(), inputs.len());
    }
}

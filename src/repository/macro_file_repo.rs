// ==========================================
// 仓储收货定位系统 - 宏文件输出
// ==========================================
// 输出位置: 配置的目录 + 固定文件名 macro_final.mac（最后一次导出为准）
// 写入方式: 同目录 NamedTempFile 写完后 persist（rename），读者不会看到半截文件
// ==========================================

use crate::domain::macro_script::{MacroScript, MACRO_FILE_NAME};
use crate::engine::repositories::MacroSink;
use crate::repository::error::{RepositoryError, RepositoryResult};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct MacroFileRepository {
    output_dir: PathBuf,
}

impl MacroFileRepository {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 导出文件完整路径
    pub fn target_path(&self) -> PathBuf {
        self.output_dir.join(MACRO_FILE_NAME)
    }

    fn write_err(path: &Path, err: std::io::Error) -> RepositoryError {
        RepositoryError::FileWriteError {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

impl MacroSink for MacroFileRepository {
    fn write_script(&self, script: &MacroScript) -> RepositoryResult<String> {
        fs::create_dir_all(&self.output_dir).map_err(|e| Self::write_err(&self.output_dir, e))?;

        let target = self.target_path();

        // 临时文件在任何失败路径上随 drop 删除
        let mut tmp = tempfile::Builder::new()
            .prefix(MACRO_FILE_NAME)
            .suffix(".tmp")
            .tempfile_in(&self.output_dir)
            .map_err(|e| Self::write_err(&self.output_dir, e))?;
        tmp.write_all(script.render().as_bytes())
            .map_err(|e| Self::write_err(tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| Self::write_err(tmp.path(), e))?;

        tmp.persist(&target)
            .map_err(|e| Self::write_err(&target, e.error))?;

        tracing::info!(path = %target.display(), lines = script.line_count(), "宏文件已写入");
        Ok(target.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::macro_script::{Keystroke, MacroLine};

    #[test]
    fn test_write_overwrites_previous_export() {
        let dir = tempfile::tempdir().unwrap();
        let repo = MacroFileRepository::new(dir.path().join("output"));

        let first = MacroScript::new(vec![MacroLine::new().text("A").key(Keystroke::Pf6)]);
        let second = MacroScript::new(vec![MacroLine::new().text("B").key(Keystroke::Pf6)]);

        let path = repo.write_script(&first).unwrap();
        repo.write_script(&second).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains(r#"value="B[pf6]""#));
        assert!(!content.contains("A[pf6]"));
        assert!(path.ends_with(MACRO_FILE_NAME));
        assert_eq!(fs::read_dir(repo.output_dir()).unwrap().count(), 1);
    }

    #[test]
    fn test_failed_rename_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let repo = MacroFileRepository::new(dir.path());
        // 目标路径被目录占用，rename 失败
        fs::create_dir(repo.target_path()).unwrap();

        let script = MacroScript::new(vec![MacroLine::new().text("A").key(Keystroke::Pf6)]);
        let result = repo.write_script(&script);

        assert!(matches!(result, Err(RepositoryError::FileWriteError { .. })));
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .filter(|name| name != MACRO_FILE_NAME)
            .collect();
        assert!(leftovers.is_empty(), "temp files left: {:?}", leftovers);
    }
}

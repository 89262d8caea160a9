//! 结果打印服务 - 业务能力层
//!
//! 只负责"把结果页写成文本文件"，不关心内容怎么排版

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::debug;

/// 结果打印服务
pub struct ReportWriter {
    report_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(report_dir: impl Into<PathBuf>) -> Self {
        Self {
            report_dir: report_dir.into(),
        }
    }

    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }

    /// 写入一份结果
    ///
    /// 文件名带时间戳，不会覆盖之前打印的结果。
    ///
    /// # 返回
    /// 返回写入的文件路径
    pub async fn write(&self, body: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.report_dir)
            .await
            .with_context(|| format!("无法创建目录: {}", self.report_dir.display()))?;

        let now = chrono::Local::now();
        let path = self
            .report_dir
            .join(format!("hasil-tka-{}.txt", now.format("%Y%m%d-%H%M%S%3f")));

        let header = format!(
            "{}\nHasil Simulasi TKA - UPT SMPN 4 Mappedeceng\nDicetak: {}\n{}\n\n",
            "=".repeat(60),
            now.format("%Y-%m-%d %H:%M:%S"),
            "=".repeat(60)
        );

        debug!("写入结果: {} | 长度: {} 字符", path.display(), body.len());

        fs::write(&path, format!("{header}{body}"))
            .await
            .with_context(|| format!("无法写入文件: {}", path.display()))?;

        Ok(path)
    }
}

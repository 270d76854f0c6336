use crate::error::ConfigError;
use crate::models::matrix::{default_exam_matrix, ExamMatrixEntry};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;
use tracing::{info, warn};

/// 矩阵文件的顶层结构
#[derive(Debug, Deserialize)]
struct MatrixFile {
    #[serde(default)]
    entries: Vec<ExamMatrixEntry>,
}

/// 解析 TOML 格式的出题矩阵
pub fn parse_exam_matrix(content: &str, path: &str) -> Result<Vec<ExamMatrixEntry>> {
    let file: MatrixFile = toml::from_str(content).map_err(|e| ConfigError::MatrixParseFailed {
        path: path.to_string(),
        message: e.to_string(),
    })?;

    if file.entries.is_empty() {
        return Err(ConfigError::EmptyMatrix.into());
    }

    let entries = file
        .entries
        .into_iter()
        .map(|mut entry| {
            let total = entry.difficulty.total();
            if entry.count != total {
                warn!(
                    "⚠️ 矩阵项 {} 的题量 {} 与难度分布之和 {} 不一致，以难度分布为准",
                    entry.category, entry.count, total
                );
                entry.count = total;
            }
            entry
        })
        .collect();

    Ok(entries)
}

/// 从 TOML 文件加载出题矩阵
pub async fn load_exam_matrix(path: &Path) -> Result<Vec<ExamMatrixEntry>> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取矩阵文件: {}", path.display()))?;

    parse_exam_matrix(&content, &path.to_string_lossy())
}

/// 优先使用配置的矩阵文件，失败时回退到内置矩阵
pub async fn resolve_exam_matrix(matrix_file: Option<&str>) -> Vec<ExamMatrixEntry> {
    let Some(path) = matrix_file else {
        return default_exam_matrix();
    };

    match load_exam_matrix(Path::new(path)).await {
        Ok(entries) => {
            info!("✓ 已加载自定义出题矩阵: {} ({} 项)", path, entries.len());
            entries
        }
        Err(e) => {
            warn!("⚠️ 加载出题矩阵失败，使用内置矩阵: {:#}", e);
            default_exam_matrix()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::TopicCategory;

    const SAMPLE: &str = r#"
[[entries]]
category = "geometry"
count = 5
topics = ["Hình trụ, Hình nón, Hình cầu"]

[entries.difficulty]
nb = 2
th = 2
vd = 2
"#;

    #[test]
    fn test_parse_matrix_and_fix_count() {
        let entries = parse_exam_matrix(SAMPLE, "sample.toml").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, TopicCategory::Geometry);
        assert_eq!(entries[0].count, 6);
    }

    #[test]
    fn test_parse_empty_matrix_fails() {
        assert!(parse_exam_matrix("entries = []", "empty.toml").is_err());
    }

    #[test]
    fn test_parse_invalid_category_fails() {
        let bad = SAMPLE.replace("geometry", "physics");
        assert!(parse_exam_matrix(&bad, "bad.toml").is_err());
    }

    #[test]
    fn test_resolve_falls_back_to_default() {
        let entries = tokio_test::block_on(resolve_exam_matrix(Some("/nonexistent/matrix.toml")));
        assert_eq!(entries, default_exam_matrix());
        assert_eq!(tokio_test::block_on(resolve_exam_matrix(None)), default_exam_matrix());
    }
}

use crate::utils::error::ClassifyError;
use crate::Result;
use std::fs;
use std::path::Path;

/// 有序标签列表，行号即类别索引
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelList {
    labels: Vec<String>,
}

impl LabelList {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// 每行一个标签，只去掉行尾换行符，标签内的空格原样保留。
    /// 中间空行保留以维持索引，末尾空行去掉。
    pub fn parse(content: &str) -> Self {
        let mut labels: Vec<String> = content
            .lines()
            .map(|line| line.trim_end_matches('\r').to_string())
            .collect();

        while labels.last().is_some_and(|l| l.is_empty()) {
            labels.pop();
        }

        Self { labels }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ClassifyError::ResourceNotFound(format!(
                "Label file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)?;
        let labels = Self::parse(&content);
        tracing::info!("Loaded {} labels from: {}", labels.len(), path.display());
        Ok(labels)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for LabelList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

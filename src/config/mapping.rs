// src/config/mapping.rs

use crate::{error::AppResult, models::ToolKind};
use log::{debug, info, warn};
use serde_json::{Map, Value};
use std::{fs, path::Path};

/// 自动模式使用的 "后端 -> 域名子串" 映射。
///
/// 条目顺序与文件中的键顺序一致，解析时按此顺序取第一个匹配项。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutomaticMapping {
    entries: Vec<(ToolKind, Vec<String>)>,
}

impl AutomaticMapping {
    pub fn new(entries: Vec<(ToolKind, Vec<String>)>) -> Self {
        Self { entries }
    }

    /// 读取映射文件。文件缺失时返回空映射；无法读取或格式错误时同样返回空映射并记录警告。
    pub fn load(path: &Path) -> Self {
        if !path.is_file() {
            info!("自动模式映射文件 {:?} 不存在，自动模式将无法解析任何链接。", path);
            return Self::default();
        }
        match fs::read_to_string(path)
            .map_err(Into::into)
            .and_then(|content| Self::from_json(&content))
        {
            Ok(mapping) => {
                debug!("已加载 {} 个自动模式映射条目", mapping.len());
                mapping
            }
            Err(e) => {
                warn!("自动模式映射文件 {:?} 解析失败: {}，使用空映射。", path, e);
                Self::default()
            }
        }
    }

    pub fn from_json(content: &str) -> AppResult<Self> {
        let raw: Map<String, Value> = serde_json::from_str(content)?;
        let mut entries = Vec::with_capacity(raw.len());
        for (key, value) in raw {
            let Some(tool) = ToolKind::from_identifier(&key).filter(ToolKind::is_concrete) else {
                warn!("自动模式映射中的后端 '{}' 无效，已忽略。", key);
                continue;
            };
            let substrings: Vec<String> = match value {
                Value::String(s) => vec![s],
                Value::Array(items) => items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s),
                        other => {
                            warn!("后端 '{}' 的映射值 {} 不是字符串，已忽略。", key, other);
                            None
                        }
                    })
                    .collect(),
                other => {
                    warn!("后端 '{}' 的映射值 {} 格式无效，已忽略。", key, other);
                    continue;
                }
            };
            let substrings: Vec<String> = substrings
                .into_iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
            entries.push((tool, substrings));
        }
        Ok(Self { entries })
    }

    /// 按顺序返回第一个域名包含任一子串的后端
    pub fn find(&self, domain: &str) -> Option<ToolKind> {
        self.entries
            .iter()
            .find(|(_, substrings)| substrings.iter().any(|s| domain.contains(s.as_str())))
            .map(|(tool, _)| *tool)
    }

    pub fn entries(&self) -> &[(ToolKind, Vec<String>)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

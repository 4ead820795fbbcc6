use bevy::prelude::*;
use std::collections::HashMap;

use super::schema::{ItemEntry, ItemList};

/// 物品表加载完成后的索引，按 id 查原型
#[derive(Resource, Default, Clone, Debug)]
pub struct ItemCatalog {
    entries: HashMap<String, ItemEntry>,
}

impl ItemCatalog {
    pub fn from_entries(entries: impl IntoIterator<Item = ItemEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.id.clone(), e)).collect(),
        }
    }

    pub fn from_list(list: &ItemList) -> Self {
        Self::from_entries(list.items.iter().cloned())
    }

    pub fn get(&self, id: &str) -> Option<&ItemEntry> {
        self.entries.get(id)
    }

    /// 大小写不敏感查询，供 CLI 使用
    pub fn find(&self, id: &str) -> Option<&ItemEntry> {
        self.get(id)
            .or_else(|| self.entries.values().find(|e| e.id.eq_ignore_ascii_case(id)))
    }

    /// 未知 id 退化成占位原型，保证存档数据不会丢
    pub fn resolve(&self, id: &str) -> ItemEntry {
        match self.get(id) {
            Some(entry) => entry.clone(),
            None => {
                warn!("未知物品 id {id}，按默认原型处理");
                ItemEntry {
                    id: id.to_string(),
                    name: id.to_string(),
                    max_stack: 64,
                    ..default()
                }
            }
        }
    }

    /// 按 id 排序遍历
    pub fn iter(&self) -> impl Iterator<Item = &ItemEntry> {
        let mut entries: Vec<&ItemEntry> = self.entries.values().collect();
        entries.sort_by(|a, b| a.id.cmp(&b.id));
        entries.into_iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

use bevy::asset::Asset;
use bevy::reflect::TypePath;
use serde::Deserialize;

/// 容器型物品的两种形态
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum BundleKind {
    /// 收纳袋：总数量受 capacity 限制，每条目最多半组
    Bundle { capacity: u32 },
    /// 箱子：固定 27 格，按自然堆叠上限合并
    Crate,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ItemEntry {
    pub id:   String,
    pub name: String,
    #[serde(default = "default_max_stack")] pub max_stack: u32,
    #[serde(default)] pub tags:   Vec<String>,
    #[serde(default)] pub bundle: Option<BundleKind>,
}

fn default_max_stack() -> u32 {
    64
}

impl ItemEntry {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

#[derive(Asset, TypePath, Deserialize, Debug)]
pub struct ItemList {
    pub items: Vec<ItemEntry>,
}

impl ItemList {
    /// id 必须唯一，堆叠上限至少为 1
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = std::collections::HashSet::new();
        for item in &self.items {
            if item.max_stack == 0 {
                return Err(format!("{} has max_stack 0", item.id));
            }
            if !seen.insert(item.id.as_str()) {
                return Err(format!("duplicate id {}", item.id));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::asset::ron;

    #[test]
    fn parses_item_table() {
        let list: ItemList = ron::de::from_str(
            r#"(items: [
                (id: "stone", name: "Stone"),
                (id: "sword", name: "Sword", max_stack: 1),
                (id: "bundle", name: "Bundle", max_stack: 1, bundle: Some(Bundle(capacity: 64))),
                (id: "crate", name: "Crate", max_stack: 1, tags: ["bundle_ignored"], bundle: Some(Crate)),
            ])"#,
        )
        .unwrap();

        assert_eq!(list.items.len(), 4);
        assert_eq!(list.items[0].max_stack, 64);
        assert_eq!(list.items[1].max_stack, 1);
        assert_eq!(list.items[2].bundle, Some(BundleKind::Bundle { capacity: 64 }));
        assert!(list.items[3].has_tag("bundle_ignored"));
        assert!(list.validate().is_ok());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let list: ItemList =
            ron::de::from_str(r#"(items: [(id: "a", name: "A"), (id: "a", name: "A2")])"#).unwrap();
        assert_eq!(list.validate(), Err("duplicate id a".to_string()));
    }
}

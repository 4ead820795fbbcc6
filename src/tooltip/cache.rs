use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

use crate::inventory::components::ItemStack;
use crate::inventory::item_data::ItemData;

/// 单个条目的比较键：种类 + 数量 + 附加数据
#[derive(Debug, Clone, PartialEq)]
struct EntryKey {
    id: String,
    count: u32,
    data: ItemData,
}

/// 按顺序逐条比较的内容指纹，决定缓存是否还能用
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentFingerprint(Vec<EntryKey>);

impl ContentFingerprint {
    pub fn of(contents: &[ItemStack]) -> Self {
        Self(
            contents
                .iter()
                .map(|s| EntryKey {
                    id: s.proto.id.clone(),
                    count: s.count,
                    data: s.data.clone(),
                })
                .collect(),
        )
    }
}

/// tooltip 里画的一个图标（数量恒为 1）
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayUnit {
    pub stack: ItemStack,
    pub label: String,
    /// 网格内每一步的像素偏移
    pub offset: (i32, i32),
}

#[derive(Resource, Default)]
pub struct TooltipRenderCache {
    key: Option<ContentFingerprint>,
    units: Arc<Vec<DisplayUnit>>,
}

impl TooltipRenderCache {
    pub fn is_valid_for(&self, contents: &[ItemStack]) -> bool {
        self.key.as_ref() == Some(&ContentFingerprint::of(contents))
    }

    /// 内容没变就返回同一份展开结果，变了才重新展开、随机偏移并打乱
    pub fn refresh(&mut self, contents: &[ItemStack], rng: &mut impl Rng) -> Arc<Vec<DisplayUnit>> {
        let key = ContentFingerprint::of(contents);
        if self.key.as_ref() != Some(&key) {
            self.units = Arc::new(expand(contents, rng));
            self.key = Some(key);
            debug!("tooltip cache rebuilt: {} units", self.units.len());
        }
        Arc::clone(&self.units)
    }

    pub fn invalidate(&mut self) {
        self.key = None;
    }
}

fn expand(contents: &[ItemStack], rng: &mut impl Rng) -> Vec<DisplayUnit> {
    let mut units = Vec::new();
    for stack in contents {
        for i in 0..stack.count {
            units.push(DisplayUnit {
                stack: ItemStack { count: 1, ..stack.clone() },
                label: format!("stack_{i}"),
                offset: (6 + rng.gen_range(0..4), 4 + rng.gen_range(0..4)),
            });
        }
    }
    units.shuffle(rng);
    units
}

/// 放进 Resource 的随机源，配置里给了种子就可复现
#[derive(Resource)]
pub struct TooltipRng(pub rand::rngs::StdRng);

impl TooltipRng {
    pub fn new(seed: Option<u64>) -> Self {
        use rand::SeedableRng;
        match seed {
            Some(seed) => Self(rand::rngs::StdRng::seed_from_u64(seed)),
            None => Self(rand::rngs::StdRng::from_entropy()),
        }
    }
}

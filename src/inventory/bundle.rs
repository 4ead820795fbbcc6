//! 收纳袋内容模型
//!
//! 内容以 [`StoredStack`] 记录列表的形式保存在袋子自身的 [`ItemData`] 里。
//! 两种形态：
//! - `Bundle`：总数量不超过 capacity；同种物品只占一个条目，直到该条目达到半组
//!   上限后才开新条目。每次 `add` 最多动一个条目，所以相同的最终物品组合可能因为
//!   放入顺序不同而得到不同的条目划分。
//! - `Crate`：固定 27 格，按自然堆叠上限合并。
//!
//! 所有操作在前置条件不满足时都是空操作，通过返回值告诉调用方结果。

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::components::ItemStack;
use super::item_data::ItemData;
use crate::data::catalog::ItemCatalog;
use crate::data::schema::BundleKind;

pub const CRATE_SLOTS: usize = 27;

const BUNDLE_ITEMS: &[&str] = &["Items"];
const CRATE_ITEMS: &[&str] = &["BlockEntityTag", "Items"];

/// 持久化格式中的一条记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredStack {
    pub id: String,
    #[serde(rename = "Count")]
    pub count: u32,
    #[serde(rename = "Slot", default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<u8>,
    #[serde(default, skip_serializing_if = "ItemData::is_empty")]
    pub tag: ItemData,
}

impl StoredStack {
    fn from_stack(stack: &ItemStack, slot: Option<u8>) -> Self {
        Self {
            id: stack.proto.id.clone(),
            count: stack.count,
            slot,
            tag: stack.data.clone(),
        }
    }
}

/// 清空收纳袋时接收物品的一方（通常是玩家背包）
pub trait ItemRecipient {
    /// 尽量放入，放不下的留在 `stack` 里；全部放下时返回 true
    fn insert(&mut self, stack: &mut ItemStack) -> bool;
    fn drop_item(&mut self, stack: ItemStack);
    /// 创造模式下溢出的物品直接丢弃
    fn unlimited(&self) -> bool;
}

pub fn is_bundle(stack: &ItemStack) -> bool {
    bundle_kind(stack).is_some()
}

fn bundle_kind(stack: &ItemStack) -> Option<&BundleKind> {
    if stack.is_empty() {
        return None;
    }
    stack.proto.bundle.as_ref()
}

/// 单个条目的半组上限
pub fn half_stack(stack: &ItemStack) -> u32 {
    (stack.max_stack() / 2).max(1)
}

/// 操作收纳袋所需的外部信息：物品表（把记录还原成物品）和黑名单标签
#[derive(Clone, Copy)]
pub struct BundleContext<'a> {
    pub catalog: &'a ItemCatalog,
    pub ignored_tags: &'a [String],
}

impl<'a> BundleContext<'a> {
    pub fn new(catalog: &'a ItemCatalog, ignored_tags: &'a [String]) -> Self {
        Self { catalog, ignored_tags }
    }

    /// 收纳袋返回全部条目；箱子有数据时返回 27 格（含空格），否则为空
    pub fn items(&self, bundle: &ItemStack) -> Vec<ItemStack> {
        match bundle_kind(bundle) {
            Some(BundleKind::Bundle { .. }) => self.read_entries(bundle),
            Some(BundleKind::Crate) => self.read_crate(bundle).unwrap_or_default(),
            None => Vec::new(),
        }
    }

    pub fn items_count(&self, bundle: &ItemStack) -> u32 {
        self.items(bundle).iter().map(|s| s.count).sum()
    }

    pub fn is_empty(&self, bundle: &ItemStack) -> bool {
        self.items_count(bundle) == 0
    }

    pub fn is_full(&self, bundle: &ItemStack) -> bool {
        match bundle_kind(bundle) {
            Some(BundleKind::Bundle { capacity }) => self.items_count(bundle) >= *capacity,
            Some(BundleKind::Crate) => {
                self.items(bundle).iter().filter(|s| !s.is_empty()).count() > CRATE_SLOTS
            }
            None => false,
        }
    }

    pub fn is_ignored(&self, stack: &ItemStack) -> bool {
        self.ignored_tags.iter().any(|tag| stack.proto.has_tag(tag))
    }

    pub fn can_accept(&self, bundle: &ItemStack, candidate: &ItemStack) -> bool {
        if candidate.is_empty() || is_bundle(candidate) || self.is_ignored(candidate) {
            return false;
        }
        match bundle_kind(bundle) {
            // 没满就一定能放：要么补进同类条目，要么开新条目
            Some(BundleKind::Bundle { .. }) => !self.is_full(bundle),
            Some(BundleKind::Crate) => match self.read_crate(bundle) {
                None => true,
                Some(slots) => slots.iter().any(|s| {
                    s.is_empty() || (s.same_kind(candidate) && s.count < s.max_stack())
                }),
            },
            None => false,
        }
    }

    /// 把 `candidate` 放进袋子，返回实际移动的数量（同时从 candidate 扣除）
    pub fn add(&self, bundle: &mut ItemStack, candidate: &mut ItemStack) -> u32 {
        if !self.can_accept(bundle, candidate) {
            return 0;
        }
        let moved = match bundle_kind(bundle).cloned() {
            Some(BundleKind::Bundle { capacity }) => self.add_to_bundle(bundle, capacity, candidate),
            Some(BundleKind::Crate) => self.add_to_crate(bundle, candidate),
            None => 0,
        };
        debug!("{} ×{moved} → {}", candidate.proto.id, bundle.proto.id);
        moved
    }

    fn add_to_bundle(&self, bundle: &mut ItemStack, capacity: u32, candidate: &mut ItemStack) -> u32 {
        let mut entries = self.read_entries(bundle);
        let total: u32 = entries.iter().map(|e| e.count).sum();
        let cap = half_stack(candidate);
        let mut moved = candidate
            .count
            .min(cap)
            .max(1)
            .min(capacity.saturating_sub(total));
        if moved == 0 {
            return 0;
        }

        // 不可堆叠的物品每件单独一个条目
        let stackable = candidate.max_stack() > 1;
        match entries
            .iter_mut()
            .find(|e| stackable && e.same_kind(candidate) && e.count < cap)
        {
            Some(entry) => {
                moved = moved.min(cap - entry.count);
                entry.count += moved;
            }
            None => entries.push(ItemStack { count: moved, ..candidate.clone() }),
        }

        Self::write_entries(bundle, &entries);
        candidate.count -= moved;
        moved
    }

    fn add_to_crate(&self, bundle: &mut ItemStack, candidate: &mut ItemStack) -> u32 {
        let mut slots = self
            .read_crate(bundle)
            .unwrap_or_else(|| vec![ItemStack::empty(); CRATE_SLOTS]);
        let before = candidate.count;
        let max = candidate.max_stack();

        for slot in slots.iter_mut() {
            if candidate.is_empty() {
                break;
            }
            if slot.same_kind(candidate) && slot.count < max {
                let moved = candidate.count.min(max - slot.count);
                slot.count += moved;
                candidate.count -= moved;
            }
        }
        if !candidate.is_empty() {
            if let Some(slot) = slots.iter_mut().find(|s| s.is_empty()) {
                *slot = candidate.take();
            }
        }

        let moved = before - candidate.count;
        if moved > 0 {
            Self::write_crate(bundle, &slots);
        }
        moved
    }

    /// 取出第一个（`from_end` 时为最后一个）非空条目；袋子为空时返回空物品
    pub fn remove_first(&self, bundle: &mut ItemStack, from_end: bool) -> ItemStack {
        match bundle_kind(bundle).cloned() {
            Some(BundleKind::Bundle { .. }) => {
                let mut entries = self.read_entries(bundle);
                if entries.is_empty() {
                    return ItemStack::empty();
                }
                let index = if from_end { entries.len() - 1 } else { 0 };
                let stack = entries.remove(index);
                Self::write_entries(bundle, &entries);
                stack
            }
            Some(BundleKind::Crate) => {
                let Some(mut slots) = self.read_crate(bundle) else {
                    return ItemStack::empty();
                };
                let found = if from_end {
                    slots.iter().rposition(|s| !s.is_empty())
                } else {
                    slots.iter().position(|s| !s.is_empty())
                };
                let Some(index) = found else {
                    return ItemStack::empty();
                };
                let stack = slots[index].take();
                Self::write_crate(bundle, &slots);
                stack
            }
            None => ItemStack::empty(),
        }
    }

    /// 倒空袋子，返回处理的条目数。接收方放不下的部分掉到世界里（创造模式除外）
    pub fn empty_into(&self, bundle: &mut ItemStack, recipient: &mut impl ItemRecipient) -> usize {
        if !is_bundle(bundle) || self.is_empty(bundle) {
            return 0;
        }
        let items: Vec<ItemStack> = self
            .items(bundle)
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();
        let drained = items.len();
        let is_crate = matches!(bundle_kind(bundle), Some(BundleKind::Crate));

        for mut item in items {
            recipient.insert(&mut item);
            if !item.is_empty() && !recipient.unlimited() {
                recipient.drop_item(item);
            }
        }

        if is_crate {
            Self::write_crate(bundle, &[]);
        } else {
            Self::write_entries(bundle, &[]);
        }
        drained
    }

    fn rehydrate(&self, record: StoredStack) -> ItemStack {
        ItemStack {
            proto: self.catalog.resolve(&record.id),
            count: record.count,
            data: record.tag,
        }
    }

    fn read_entries(&self, bundle: &ItemStack) -> Vec<ItemStack> {
        bundle
            .data
            .get_list::<StoredStack>(BUNDLE_ITEMS)
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.count > 0)
            .map(|r| self.rehydrate(r))
            .collect()
    }

    fn read_crate(&self, bundle: &ItemStack) -> Option<Vec<ItemStack>> {
        let records = bundle.data.get_list::<StoredStack>(CRATE_ITEMS)?;
        let mut slots = vec![ItemStack::empty(); CRATE_SLOTS];
        for record in records {
            match record.slot.map(usize::from) {
                Some(index) if index < CRATE_SLOTS => slots[index] = self.rehydrate(record),
                other => warn!("箱子记录的格子编号无效: {other:?}"),
            }
        }
        Some(slots)
    }

    fn write_entries(bundle: &mut ItemStack, entries: &[ItemStack]) {
        let records: Vec<StoredStack> = entries
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| StoredStack::from_stack(s, None))
            .collect();
        if let Err(e) = bundle.data.set_list(BUNDLE_ITEMS, &records) {
            warn!("写入收纳袋内容失败: {e}");
        }
    }

    fn write_crate(bundle: &mut ItemStack, slots: &[ItemStack]) {
        let records: Vec<StoredStack> = slots
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_empty())
            .map(|(i, s)| StoredStack::from_stack(s, Some(i as u8)))
            .collect();
        if let Err(e) = bundle.data.set_list(CRATE_ITEMS, &records) {
            warn!("写入箱子内容失败: {e}");
        }
    }
}

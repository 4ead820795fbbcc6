use bevy::prelude::*;

use super::bundle::ItemRecipient;
use super::item_data::ItemData;
use crate::data::schema::ItemEntry;

/// 运行时物品实例
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItemStack {
    pub proto: ItemEntry, // 直接复制静态表条目即可
    pub count: u32,
    pub data:  ItemData,
}

impl ItemStack {
    pub fn new(proto: ItemEntry, count: u32) -> Self {
        Self { proto, count, data: ItemData::default() }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn max_stack(&self) -> u32 {
        self.proto.max_stack.max(1)
    }

    /// 同 id 且附加数据相同才算同一种物品
    pub fn same_kind(&self, other: &ItemStack) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.proto.id == other.proto.id
            && self.data == other.data
    }

    pub fn take(&mut self) -> ItemStack {
        std::mem::take(self)
    }
}

/// 槽位类型：只有普通存储格会被收纳袋逻辑拦截
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SlotKind {
    #[default]
    Storage,
    CraftingResult,
    /// 不能取出
    Locked,
    /// 不显示 / 不可交互
    Disabled,
}

/// 宿主主动暴露的槽位编号，替代反射读私有字段
pub trait SlotIndexAccess {
    /// 菜单里的全局编号
    fn menu_index(&self) -> usize;
    /// 所属容器内的编号；拿不到时返回 None
    fn container_index(&self) -> Option<usize> {
        None
    }
}

/// 请求里携带的格子编号，连同它属于哪种编号方式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotIndex {
    Menu(usize),
    Container(usize),
}

/// 创造模式菜单用容器内编号，其他情况（或拿不到时）用菜单编号
pub fn resolve_slot_index(slot: &impl SlotIndexAccess, creative_menu: bool) -> SlotIndex {
    match (creative_menu, slot.container_index()) {
        (true, Some(index)) => SlotIndex::Container(index),
        _ => SlotIndex::Menu(slot.menu_index()),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotRef {
    pub menu_index: usize,
    pub container_index: Option<usize>,
    pub kind: SlotKind,
}

impl SlotRef {
    pub fn can_take(&self) -> bool {
        self.kind != SlotKind::Locked
    }

    pub fn is_enabled(&self) -> bool {
        self.kind != SlotKind::Disabled
    }

    pub fn is_crafting_result(&self) -> bool {
        self.kind == SlotKind::CraftingResult
    }
}

impl SlotIndexAccess for SlotRef {
    fn menu_index(&self) -> usize {
        self.menu_index
    }

    fn container_index(&self) -> Option<usize> {
        self.container_index
    }
}

/// 玩家背包（挂在 Resource）
#[derive(Resource, Default)]
pub struct Backpack {
    pub slots: Vec<ItemStack>, // 固定容量，空位用 count=0 占位
    pub kinds: Vec<SlotKind>,
    /// 背包在菜单中的起始编号
    pub menu_offset: usize,
}

impl Backpack {
    pub fn new(capacity: usize, menu_offset: usize) -> Self {
        Self {
            slots: vec![ItemStack::empty(); capacity],
            kinds: vec![SlotKind::Storage; capacity],
            menu_offset,
        }
    }

    pub fn slot_ref(&self, index: usize) -> Option<SlotRef> {
        let kind = *self.kinds.get(index)?;
        Some(SlotRef {
            menu_index: self.menu_offset + index,
            container_index: Some(index),
            kind,
        })
    }

    /// resolve_slot_index 的逆运算：把请求里的编号换回背包下标
    pub fn index_from_request(&self, slot: SlotIndex) -> Option<usize> {
        let index = match slot {
            SlotIndex::Container(index) => index,
            SlotIndex::Menu(index) => index.checked_sub(self.menu_offset)?,
        };
        (index < self.slots.len()).then_some(index)
    }

    /// 先合并到同类堆叠，再放进空位；剩余留在 stack 里
    pub fn insert(&mut self, stack: &mut ItemStack) -> bool {
        for slot in self.slots.iter_mut() {
            if stack.is_empty() {
                break;
            }
            if slot.same_kind(stack) && slot.count < slot.max_stack() {
                let moved = stack.count.min(slot.max_stack() - slot.count);
                slot.count += moved;
                stack.count -= moved;
            }
        }
        while !stack.is_empty() {
            let Some(slot) = self.slots.iter_mut().find(|s| s.is_empty()) else {
                break;
            };
            let moved = stack.count.min(stack.max_stack());
            *slot = ItemStack { count: moved, ..stack.clone() };
            stack.count -= moved;
        }
        stack.is_empty()
    }
}

/// 鼠标上拿着的物品
#[derive(Resource, Default)]
pub struct Carried(pub ItemStack);

/// 掉落到世界里的物品
#[derive(Resource, Default)]
pub struct DroppedItems(pub Vec<ItemStack>);

/// 清空收纳袋时的接收方
pub struct PlayerInventory<'a> {
    pub backpack: &'a mut Backpack,
    pub drops: &'a mut DroppedItems,
    pub creative: bool,
}

impl ItemRecipient for PlayerInventory<'_> {
    fn insert(&mut self, stack: &mut ItemStack) -> bool {
        self.backpack.insert(stack)
    }

    fn drop_item(&mut self, stack: ItemStack) {
        info!("背包放不下，掉落 {} ×{}", stack.proto.name, stack.count);
        self.drops.0.push(stack);
    }

    fn unlimited(&self) -> bool {
        self.creative
    }
}

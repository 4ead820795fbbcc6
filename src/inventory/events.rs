use bevy::prelude::*;

use super::components::{ItemStack, SlotIndex};

pub const LEFT_BUTTON: u8 = 0;
pub const RIGHT_BUTTON: u8 = 1;

#[derive(Event)]
pub struct GiveItemEvent {
    pub id:    String,
    pub count: u32,
}

#[derive(Event)]
pub struct ListInventoryEvent;   // 让 CLI 请求打印背包

/// 在背包某格按下鼠标
#[derive(Event, Debug, Clone)]
pub struct SlotClickEvent {
    pub slot:     usize,
    pub button:   u8,
    pub modifier: bool, // 是否按着 Shift
}

/// 按住鼠标拖到另一格
#[derive(Event, Debug, Clone)]
pub struct SlotDragEvent {
    pub slot:     usize,
    pub button:   u8,
    pub modifier: bool,
}

#[derive(Event)]
pub struct MouseReleaseEvent;

/// 发往权威端的"移入/移出收纳袋"请求；本地不做预测，统一由处理系统执行
#[derive(Event, Debug, Clone)]
pub struct BundleRequest {
    pub stack:    ItemStack, // 发起请求时的袋子快照，处理时与现场核对
    pub slot:     SlotIndex, // 经 resolve_slot_index 得到的编号
    pub clear:    bool,      // true = 倒空该格上的袋子
    pub modifier: bool,
}

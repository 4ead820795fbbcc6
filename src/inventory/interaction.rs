//! 右键 / 右键拖动的拦截逻辑：决定一次输入要不要变成 [`BundleRequest`]

use bevy::prelude::*;

use super::bundle::{is_bundle, BundleContext};
use super::components::{resolve_slot_index, ItemStack, SlotRef};
use super::events::{BundleRequest, RIGHT_BUTTON};

/// 一次右键后拖动期间保持的状态
#[derive(Resource, Default, Debug)]
pub struct BundleInteraction {
    /// 上一次经过的格子（菜单编号），松开鼠标后清空
    pub last_slot: Option<usize>,
    /// true = 往袋子里装；false = 从袋子里往外倒
    pub filling: bool,
}

/// 鼠标下的格子及其内容
pub struct SlotView<'a> {
    pub slot:  SlotRef,
    pub stack: &'a ItemStack,
}

impl SlotView<'_> {
    fn interactable(&self) -> bool {
        !self.slot.is_crafting_result() && self.slot.can_take() && self.slot.is_enabled()
    }
}

fn fills(ctx: &BundleContext, target: &SlotView, carried: &ItemStack) -> bool {
    !target.stack.is_empty() && is_bundle(carried) && ctx.can_accept(carried, target.stack)
}

fn unloads(ctx: &BundleContext, target: &SlotView, carried: &ItemStack) -> bool {
    target.stack.is_empty() && is_bundle(carried) && !ctx.is_empty(carried)
}

fn move_request(carried: &ItemStack, slot: &SlotRef, modifier: bool, creative: bool) -> BundleRequest {
    BundleRequest {
        stack: carried.clone(),
        slot: resolve_slot_index(slot, creative),
        clear: false,
        modifier,
    }
}

impl BundleInteraction {
    pub fn on_click(
        &mut self,
        ctx: &BundleContext,
        target: SlotView,
        carried: &ItemStack,
        button: u8,
        modifier: bool,
        creative: bool,
    ) -> Option<BundleRequest> {
        if button != RIGHT_BUTTON {
            return None;
        }
        let request = if !target.interactable() {
            None
        } else if fills(ctx, &target, carried) {
            self.filling = true;
            Some(move_request(carried, &target.slot, modifier, creative))
        } else if unloads(ctx, &target, carried) {
            self.filling = false;
            Some(move_request(carried, &target.slot, modifier, creative))
        } else if is_bundle(target.stack) {
            Some(BundleRequest {
                stack: target.stack.clone(),
                slot: resolve_slot_index(&target.slot, creative),
                clear: true,
                modifier,
            })
        } else {
            None
        };
        self.last_slot = Some(target.slot.menu_index);
        request
    }

    /// 拖动只延续按下时的模式，且同一格只处理一次
    pub fn on_drag(
        &mut self,
        ctx: &BundleContext,
        target: SlotView,
        carried: &ItemStack,
        button: u8,
        modifier: bool,
        creative: bool,
    ) -> Option<BundleRequest> {
        if button != RIGHT_BUTTON || self.last_slot == Some(target.slot.menu_index) {
            return None;
        }
        let request = if self.last_slot.is_none() || !target.interactable() {
            None
        } else if self.filling && fills(ctx, &target, carried) {
            Some(move_request(carried, &target.slot, modifier, creative))
        } else if !self.filling && unloads(ctx, &target, carried) {
            Some(move_request(carried, &target.slot, modifier, creative))
        } else {
            None
        };
        self.last_slot = Some(target.slot.menu_index);
        request
    }

    pub fn on_release(&mut self) {
        self.last_slot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::bundle::tests::{catalog, stack};
    use crate::inventory::components::{Backpack, SlotIndex, SlotKind};
    use crate::inventory::events::LEFT_BUTTON;

    fn tags() -> Vec<String> {
        vec!["bundle_ignored".into()]
    }

    fn view<'a>(backpack: &'a Backpack, index: usize) -> SlotView<'a> {
        SlotView {
            slot: backpack.slot_ref(index).unwrap(),
            stack: &backpack.slots[index],
        }
    }

    #[test]
    fn right_click_on_stack_starts_filling() {
        let catalog = catalog();
        let tags = tags();
        let ctx = BundleContext::new(&catalog, &tags);
        let mut backpack = Backpack::new(4, 9);
        backpack.slots[1] = stack(&catalog, "stone", 5);
        let carried = stack(&catalog, "bundle", 1);

        let mut state = BundleInteraction::default();
        let req = state
            .on_click(&ctx, view(&backpack, 1), &carried, RIGHT_BUTTON, false, false)
            .unwrap();
        assert!(!req.clear);
        assert_eq!(req.slot, SlotIndex::Menu(10));
        assert!(state.filling);
        assert_eq!(state.last_slot, Some(10));
    }

    #[test]
    fn left_click_is_not_intercepted() {
        let catalog = catalog();
        let tags = tags();
        let ctx = BundleContext::new(&catalog, &tags);
        let mut backpack = Backpack::new(2, 0);
        backpack.slots[0] = stack(&catalog, "stone", 5);
        let carried = stack(&catalog, "bundle", 1);

        let mut state = BundleInteraction::default();
        assert!(state
            .on_click(&ctx, view(&backpack, 0), &carried, LEFT_BUTTON, false, false)
            .is_none());
        assert_eq!(state.last_slot, None);
    }

    #[test]
    fn right_click_on_empty_slot_unloads_non_empty_bundle() {
        let catalog = catalog();
        let tags = tags();
        let ctx = BundleContext::new(&catalog, &tags);
        let backpack = Backpack::new(2, 0);
        let mut carried = stack(&catalog, "bundle", 1);

        let mut state = BundleInteraction { filling: true, ..default() };
        assert!(state
            .on_click(&ctx, view(&backpack, 0), &carried, RIGHT_BUTTON, false, false)
            .is_none());

        ctx.add(&mut carried, &mut stack(&catalog, "stone", 3));
        let req = state
            .on_click(&ctx, view(&backpack, 0), &carried, RIGHT_BUTTON, true, false)
            .unwrap();
        assert!(req.modifier);
        assert!(!state.filling);
    }

    #[test]
    fn emptied_crate_does_not_unload() {
        let catalog = catalog();
        let tags = tags();
        let ctx = BundleContext::new(&catalog, &tags);
        let backpack = Backpack::new(2, 0);
        let mut carried = stack(&catalog, "crate", 1);
        ctx.add(&mut carried, &mut stack(&catalog, "stone", 3));
        ctx.remove_first(&mut carried, false);
        // 数据还在，只是 27 格全空
        assert_eq!(ctx.items(&carried).len(), 27);

        let mut state = BundleInteraction::default();
        assert!(state
            .on_click(&ctx, view(&backpack, 0), &carried, RIGHT_BUTTON, false, false)
            .is_none());
    }

    #[test]
    fn right_click_on_bundle_in_slot_requests_clear() {
        let catalog = catalog();
        let tags = tags();
        let ctx = BundleContext::new(&catalog, &tags);
        let mut backpack = Backpack::new(3, 9);
        backpack.slots[2] = stack(&catalog, "bundle", 1);

        let mut state = BundleInteraction::default();
        let req = state
            .on_click(&ctx, view(&backpack, 2), &ItemStack::empty(), RIGHT_BUTTON, false, true)
            .unwrap();
        assert!(req.clear);
        // 创造模式用容器内编号
        assert_eq!(req.slot, SlotIndex::Container(2));
    }

    #[test]
    fn crafting_result_and_locked_slots_are_ignored() {
        let catalog = catalog();
        let tags = tags();
        let ctx = BundleContext::new(&catalog, &tags);
        let mut backpack = Backpack::new(2, 0);
        backpack.slots[0] = stack(&catalog, "stone", 5);
        backpack.slots[1] = stack(&catalog, "stone", 5);
        backpack.kinds[0] = SlotKind::CraftingResult;
        backpack.kinds[1] = SlotKind::Locked;
        let carried = stack(&catalog, "bundle", 1);

        let mut state = BundleInteraction::default();
        for index in 0..2 {
            assert!(state
                .on_click(&ctx, view(&backpack, index), &carried, RIGHT_BUTTON, false, false)
                .is_none());
        }
    }

    #[test]
    fn drag_continues_fill_once_per_slot_until_release() {
        let catalog = catalog();
        let tags = tags();
        let ctx = BundleContext::new(&catalog, &tags);
        let mut backpack = Backpack::new(4, 0);
        for i in 0..3 {
            backpack.slots[i] = stack(&catalog, "pearl", 2);
        }
        let carried = stack(&catalog, "bundle", 1);

        let mut state = BundleInteraction::default();
        assert!(state
            .on_click(&ctx, view(&backpack, 0), &carried, RIGHT_BUTTON, false, false)
            .is_some());
        assert!(state
            .on_drag(&ctx, view(&backpack, 0), &carried, RIGHT_BUTTON, false, false)
            .is_none());
        assert!(state
            .on_drag(&ctx, view(&backpack, 1), &carried, RIGHT_BUTTON, false, false)
            .is_some());
        // 装填模式下经过空格不做任何事
        assert!(state
            .on_drag(&ctx, view(&backpack, 3), &carried, RIGHT_BUTTON, false, false)
            .is_none());

        state.on_release();
        assert!(state
            .on_drag(&ctx, view(&backpack, 2), &carried, RIGHT_BUTTON, false, false)
            .is_none());
        assert_eq!(state.last_slot, Some(2));
    }
}

use super::bundle::{is_bundle, BundleContext};
use super::interaction::{BundleInteraction, SlotView};
use super::{components::*, events::*};
use crate::core::events::LogEvent;
use crate::core::resources::BundleConfig;
use crate::data::catalog::ItemCatalog;
use bevy::prelude::*;

/// 处理"give"——往背包里塞 ItemStack
pub fn give_item(
    mut ev_give: EventReader<GiveItemEvent>,
    mut backpack: ResMut<Backpack>,
    mut drops: ResMut<DroppedItems>,
    catalog: Res<ItemCatalog>,
    mut log_event: EventWriter<LogEvent>,
) {
    for ev in ev_give.read() {
        let Some(proto) = catalog.find(&ev.id) else {
            log_event.write(LogEvent(format!("不存在物品 ID {}", ev.id)));
            continue;
        };
        let mut stack = ItemStack::new(proto.clone(), ev.count);
        if !backpack.insert(&mut stack) {
            warn!("背包已满，{} ×{} 掉在地上", proto.name, stack.count);
            drops.0.push(stack);
        }
        log_event.write(LogEvent(format!("获得 {} ×{}", proto.name, ev.count)));
    }
}

/// 打印背包内容
pub fn print_inventory(
    mut ev_list: EventReader<ListInventoryEvent>,
    backpack: Res<Backpack>,
    carried: Res<Carried>,
    catalog: Res<ItemCatalog>,
    config: Res<BundleConfig>,
    mut log_event: EventWriter<LogEvent>,
) {
    if ev_list.is_empty() {
        return;
    }
    ev_list.clear();

    let ctx = BundleContext::new(&catalog, &config.ignored_tags);
    let describe = |stack: &ItemStack| {
        if is_bundle(stack) {
            format!(
                "{} ×{} (id={}, 内含 {} 件)",
                stack.proto.name,
                stack.count,
                stack.proto.id,
                ctx.items_count(stack)
            )
        } else {
            format!("{} ×{} (id={})", stack.proto.name, stack.count, stack.proto.id)
        }
    };

    let mut empty = true;
    for (idx, stack) in backpack.slots.iter().enumerate() {
        if stack.count > 0 {
            empty = false;
            log_event.write(LogEvent(format!("[{idx}] {}", describe(stack))));
        }
    }
    if empty {
        log_event.write(LogEvent("  (empty)".into()));
    }
    if !carried.0.is_empty() {
        log_event.write(LogEvent(format!("[手上] {}", describe(&carried.0))));
    }
}

/// 左键：手上物品与格子交换，同类则合并
fn swap_with_carried(slot: &mut ItemStack, carried: &mut ItemStack) {
    if slot.same_kind(carried) {
        let moved = carried.count.min(slot.max_stack().saturating_sub(slot.count));
        slot.count += moved;
        carried.count -= moved;
        if carried.is_empty() {
            *carried = ItemStack::empty();
        }
    } else {
        std::mem::swap(slot, carried);
    }
}

pub fn handle_slot_click(
    mut clicks: EventReader<SlotClickEvent>,
    mut interaction: ResMut<BundleInteraction>,
    mut backpack: ResMut<Backpack>,
    mut carried: ResMut<Carried>,
    catalog: Res<ItemCatalog>,
    config: Res<BundleConfig>,
    mut requests: EventWriter<BundleRequest>,
) {
    let ctx = BundleContext::new(&catalog, &config.ignored_tags);
    for ev in clicks.read() {
        let Some(slot) = backpack.slot_ref(ev.slot) else {
            warn!("背包索引超出范围: {}", ev.slot);
            continue;
        };
        let target = SlotView { slot, stack: &backpack.slots[ev.slot] };
        match interaction.on_click(&ctx, target, &carried.0, ev.button, ev.modifier, config.creative) {
            Some(request) => {
                requests.write(request);
            }
            None if ev.button == LEFT_BUTTON && slot.can_take() && slot.is_enabled() => {
                swap_with_carried(&mut backpack.slots[ev.slot], &mut carried.0);
            }
            None => {}
        }
    }
}

pub fn handle_slot_drag(
    mut drags: EventReader<SlotDragEvent>,
    mut interaction: ResMut<BundleInteraction>,
    backpack: Res<Backpack>,
    carried: Res<Carried>,
    catalog: Res<ItemCatalog>,
    config: Res<BundleConfig>,
    mut requests: EventWriter<BundleRequest>,
) {
    let ctx = BundleContext::new(&catalog, &config.ignored_tags);
    for ev in drags.read() {
        let Some(slot) = backpack.slot_ref(ev.slot) else {
            continue;
        };
        let target = SlotView { slot, stack: &backpack.slots[ev.slot] };
        if let Some(request) =
            interaction.on_drag(&ctx, target, &carried.0, ev.button, ev.modifier, config.creative)
        {
            requests.write(request);
        }
    }
}

pub fn handle_mouse_release(
    mut releases: EventReader<MouseReleaseEvent>,
    mut interaction: ResMut<BundleInteraction>,
) {
    if releases.is_empty() {
        return;
    }
    releases.clear();
    interaction.on_release();
}

/// 快照和现场必须是同一种收纳袋，否则请求已过期
fn snapshot_matches(snapshot: &ItemStack, live: &ItemStack) -> bool {
    is_bundle(snapshot) && is_bundle(live) && snapshot.proto.id == live.proto.id
}

/// 权威端：执行移入 / 移出 / 倒空请求
pub fn process_bundle_request(
    mut requests: EventReader<BundleRequest>,
    mut backpack: ResMut<Backpack>,
    mut carried: ResMut<Carried>,
    mut drops: ResMut<DroppedItems>,
    catalog: Res<ItemCatalog>,
    config: Res<BundleConfig>,
    mut log_event: EventWriter<LogEvent>,
) {
    let ctx = BundleContext::new(&catalog, &config.ignored_tags);
    for req in requests.read() {
        let Some(index) = backpack.index_from_request(req.slot) else {
            warn!("收纳袋请求的格子无效: {:?}", req.slot);
            continue;
        };

        if req.clear {
            // 袋子留在原格子里，避免倒出来的物品占到它的位置
            let mut bundle = backpack.slots[index].clone();
            if !snapshot_matches(&req.stack, &bundle) {
                warn!("格子 {index} 上的物品与请求不符（{}），忽略", req.stack.proto.id);
                continue;
            }
            let mut player = PlayerInventory {
                backpack: &mut *backpack,
                drops: &mut *drops,
                creative: config.creative,
            };
            let drained = ctx.empty_into(&mut bundle, &mut player);
            backpack.slots[index].data = bundle.data;
            log_event.write(LogEvent(format!("倒空 {}：{drained} 组物品", bundle.proto.name)));
            continue;
        }

        if !snapshot_matches(&req.stack, &carried.0) {
            warn!("手上的物品与请求不符（{}），忽略", req.stack.proto.id);
            continue;
        }
        let slot = &mut backpack.slots[index];
        if slot.is_empty() {
            let out = ctx.remove_first(&mut carried.0, req.modifier);
            if !out.is_empty() {
                log_event.write(LogEvent(format!("取出 {} ×{} → [{index}]", out.proto.name, out.count)));
                *slot = out;
            }
        } else {
            let name = slot.proto.name.clone();
            let moved = ctx.add(&mut carried.0, slot);
            if slot.is_empty() {
                *slot = ItemStack::empty();
            }
            if moved > 0 {
                log_event.write(LogEvent(format!("放入 {name} ×{moved}")));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::bundle::tests::{catalog, stack};

    fn app(capacity: usize) -> App {
        let catalog = catalog();
        let mut app = App::new();
        app.add_event::<LogEvent>()
            .add_event::<SlotClickEvent>()
            .add_event::<SlotDragEvent>()
            .add_event::<MouseReleaseEvent>()
            .add_event::<BundleRequest>()
            .insert_resource(BundleConfig::default())
            .insert_resource(Backpack::new(capacity, 0))
            .insert_resource(catalog)
            .init_resource::<Carried>()
            .init_resource::<DroppedItems>()
            .init_resource::<BundleInteraction>()
            .add_systems(
                Update,
                (
                    handle_slot_click,
                    handle_slot_drag,
                    handle_mouse_release,
                    process_bundle_request,
                )
                    .chain(),
            );
        app
    }

    fn click(app: &mut App, slot: usize, button: u8) {
        app.world_mut().send_event(SlotClickEvent { slot, button, modifier: false });
        app.update();
    }

    fn put(app: &mut App, index: usize, id: &str, count: u32) {
        let catalog = app.world().resource::<ItemCatalog>().clone();
        app.world_mut().resource_mut::<Backpack>().slots[index] = stack(&catalog, id, count);
    }

    fn bundle_count(app: &App) -> u32 {
        let world = app.world();
        let ctx_catalog = world.resource::<ItemCatalog>();
        let config = world.resource::<BundleConfig>();
        let ctx = BundleContext::new(ctx_catalog, &config.ignored_tags);
        ctx.items_count(&world.resource::<Carried>().0)
    }

    #[test]
    fn pick_up_bundle_then_fill_and_unload() {
        let mut app = app(4);
        {
            let catalog = app.world().resource::<ItemCatalog>().clone();
            let mut backpack = app.world_mut().resource_mut::<Backpack>();
            backpack.slots[0] = stack(&catalog, "bundle", 1);
            backpack.slots[1] = stack(&catalog, "stone", 10);
        }

        click(&mut app, 0, LEFT_BUTTON);
        assert!(app.world().resource::<Backpack>().slots[0].is_empty());

        click(&mut app, 1, RIGHT_BUTTON);
        assert_eq!(bundle_count(&app), 10);
        assert!(app.world().resource::<Backpack>().slots[1].is_empty());

        app.world_mut().send_event(MouseReleaseEvent);
        click(&mut app, 2, RIGHT_BUTTON);
        assert_eq!(bundle_count(&app), 0);
        assert_eq!(app.world().resource::<Backpack>().slots[2].count, 10);
    }

    #[test]
    fn clearing_a_bundle_in_a_slot_spills_into_backpack_and_world() {
        let mut app = app(2);
        {
            let catalog = app.world().resource::<ItemCatalog>().clone();
            let config = BundleConfig::default();
            let ctx = BundleContext::new(&catalog, &config.ignored_tags);
            let mut bundle = stack(&catalog, "bundle", 1);
            ctx.add(&mut bundle, &mut stack(&catalog, "stone", 20));
            ctx.add(&mut bundle, &mut stack(&catalog, "pearl", 5));
            let mut backpack = app.world_mut().resource_mut::<Backpack>();
            backpack.slots[0] = bundle;
        }

        click(&mut app, 0, RIGHT_BUTTON);

        let world = app.world();
        let backpack = world.resource::<Backpack>();
        assert_eq!(backpack.slots[0].proto.id, "bundle");
        assert_eq!(backpack.slots[1].proto.id, "stone");
        assert_eq!(backpack.slots[1].count, 20);
        let drops = &world.resource::<DroppedItems>().0;
        assert_eq!(drops.len(), 1);
        assert_eq!((drops[0].proto.id.as_str(), drops[0].count), ("pearl", 5));

        let catalog = world.resource::<ItemCatalog>();
        let config = world.resource::<BundleConfig>();
        let ctx = BundleContext::new(catalog, &config.ignored_tags);
        assert!(ctx.is_empty(&backpack.slots[0]));
    }

    #[test]
    fn requests_whose_snapshot_no_longer_matches_are_ignored() {
        let mut app = app(3);
        let catalog = app.world().resource::<ItemCatalog>().clone();
        app.world_mut().resource_mut::<Carried>().0 = stack(&catalog, "pouch", 1);
        put(&mut app, 0, "stone", 5);
        put(&mut app, 1, "bundle", 1);

        // 快照不是收纳袋
        app.world_mut().send_event(BundleRequest {
            stack: stack(&catalog, "stone", 1),
            slot: SlotIndex::Menu(0),
            clear: false,
            modifier: false,
        });
        // 快照是另一种收纳袋
        app.world_mut().send_event(BundleRequest {
            stack: stack(&catalog, "bundle", 1),
            slot: SlotIndex::Menu(0),
            clear: false,
            modifier: false,
        });
        // 倒空请求的快照与格子上的袋子不同
        app.world_mut().send_event(BundleRequest {
            stack: stack(&catalog, "pouch", 1),
            slot: SlotIndex::Menu(1),
            clear: true,
            modifier: false,
        });
        app.update();

        assert_eq!(app.world().resource::<Backpack>().slots[0].count, 5);
        assert_eq!(bundle_count(&app), 0);
        assert!(app.world().resource::<DroppedItems>().0.is_empty());

        app.world_mut().send_event(BundleRequest {
            stack: stack(&catalog, "pouch", 1),
            slot: SlotIndex::Menu(0),
            clear: false,
            modifier: false,
        });
        app.update();
        assert_eq!(app.world().resource::<Backpack>().slots[0].count, 1);
        assert_eq!(bundle_count(&app), 4);
    }
}

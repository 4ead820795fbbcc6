pub mod bundle;
pub mod components;
pub mod events;
pub mod interaction;
pub mod item_data;
mod systems;

use bevy::prelude::*;
use crate::core::{resources::BundleConfig, states::AppState};
use components::*;
use events::*;
use interaction::BundleInteraction;
use systems::*;

/// 背包在菜单里从第 9 格开始（前面是合成区）
const BACKPACK_MENU_OFFSET: usize = 9;

pub struct InventoryPlugin;
impl Plugin for InventoryPlugin {
    fn build(&self, app: &mut App) {
        let capacity = app
            .world()
            .get_resource::<BundleConfig>()
            .map_or(BundleConfig::default().backpack_capacity, |c| c.backpack_capacity);

        app
            .insert_resource(Backpack::new(capacity, BACKPACK_MENU_OFFSET))
            .init_resource::<Carried>()
            .init_resource::<DroppedItems>()
            .init_resource::<BundleInteraction>()
            .add_event::<GiveItemEvent>()
            .add_event::<ListInventoryEvent>()
            .add_event::<SlotClickEvent>()
            .add_event::<SlotDragEvent>()
            .add_event::<MouseReleaseEvent>()
            .add_event::<BundleRequest>()
            .add_systems(
                Update,
                (
                    give_item,
                    (
                        handle_slot_click,
                        handle_slot_drag,
                        handle_mouse_release,
                        process_bundle_request,
                    )
                        .chain(),
                    print_inventory,
                )
                    .chain()
                    .run_if(in_state(AppState::InGame)),
            );
    }
}

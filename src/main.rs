use bevy::prelude::*;

mod core;
mod data;
mod interface;
mod inventory;
mod tooltip;

use crate::core::{resources::BundleConfig, states, CorePlugin};
use crate::interface::debug_cli::DebugCliPlugin;

fn main() {
    let config = BundleConfig::load(crate::core::resources::CONFIG_PATH).unwrap_or_else(|e| {
        eprintln!("配置读取失败，使用默认值: {e:#}");
        BundleConfig::default()
    });

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                visible: false,
                ..default()
            }),   // visible窗口，实现“无 UI”
            ..default()
        }))
        .add_plugins(CorePlugin { config })
        .add_plugins(data::DataPlugin)
        .add_plugins(inventory::InventoryPlugin)
        .add_plugins(tooltip::TooltipPlugin)
        .add_plugins(DebugCliPlugin)
        .add_systems(Update, forward_log_event)
        .add_systems(Startup, |mut next: ResMut<NextState<states::AppState>>| {
            next.set(states::AppState::Loading);
        })
        .run();
}

fn forward_log_event(mut reader: EventReader<crate::core::events::LogEvent>) {
    for e in reader.read() {
        println!("> {}", e.0);
    }
}

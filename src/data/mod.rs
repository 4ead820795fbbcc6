pub mod catalog;
pub mod schema;
pub mod loader;

use bevy::prelude::*;
use catalog::ItemCatalog;
use schema::ItemList;
use crate::core::{resources::BundleConfig, states::AppState};

// --------------------------- 资源 ---------------------------
#[derive(Resource, Default)]
pub struct ItemAssets {
    pub handle: Option<Handle<ItemList>>,
}

// --------------------------- 插件 ---------------------------
pub struct DataPlugin;
impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app
            // 注册资产类型 & Loader
            .init_asset::<ItemList>()
            .register_asset_loader(loader::RonItemLoader)
            .init_resource::<ItemAssets>()
            .init_resource::<ItemCatalog>()
            // Loading 流程
            .add_systems(OnEnter(AppState::Loading), start_loading)
            .add_systems(
                Update,
                check_loaded.run_if(in_state(AppState::Loading)),
            );
    }
}

// --------------------------- 系统 ---------------------------
fn start_loading(
    mut item_assets: ResMut<ItemAssets>,
    asset_server: Res<AssetServer>,
    config: Res<BundleConfig>,
) {
    let handle: Handle<ItemList> = asset_server.load(config.items_path.clone());
    item_assets.handle = Some(handle);
}

fn check_loaded(
    mut next: ResMut<NextState<AppState>>,
    mut catalog: ResMut<ItemCatalog>,
    item_assets: Res<ItemAssets>,
    lists: Res<Assets<ItemList>>,
    config: Res<BundleConfig>,
) {
    if let Some(list) = item_assets.handle.as_ref().and_then(|h| lists.get(h)) {
        *catalog = ItemCatalog::from_list(list);
        if catalog.is_empty() {
            warn!("物品表 {} 是空的", config.items_path);
        }
        info!("✔ Items loaded: {}", catalog.len());
        next.set(AppState::InGame);
    }
}

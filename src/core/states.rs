use bevy::prelude::*;

/// 启动 → 读取物品表 → 游戏中
#[derive(States, Debug, Clone, Eq, PartialEq, Hash, Default)]
pub enum AppState {
    #[default]
    Startup,
    Loading,
    InGame,
}

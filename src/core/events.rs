use bevy::prelude::*;

use super::resources::BundleConfig;

/// 面向用户的输出，由 main 统一打印
#[derive(Event)]
pub struct LogEvent(pub String);

pub fn announce_config(config: Res<BundleConfig>, mut writer: EventWriter<LogEvent>) {
    let mode = if config.creative { "creative" } else { "survival" };
    writer.write(LogEvent(format!(
        "Bundles ready ({mode}, backpack {} slots). 输入 help 查看命令",
        config.backpack_capacity
    )));
}

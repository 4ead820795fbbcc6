//! 文字 CLI：读取 stdin → 解析命令 → 转成事件

use bevy::app::AppExit;
use bevy::prelude::*;
use once_cell::sync::Lazy;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::core::{events::LogEvent, states::AppState};
use crate::data::catalog::ItemCatalog;
use crate::inventory::components::DroppedItems;
use crate::inventory::events::{
    GiveItemEvent, ListInventoryEvent, MouseReleaseEvent, SlotClickEvent, SlotDragEvent,
    LEFT_BUTTON, RIGHT_BUTTON,
};
use crate::tooltip::ShowTooltipEvent;

static CLI_BUFFER: Lazy<Arc<Mutex<VecDeque<String>>>> =
    Lazy::new(|| Arc::new(Mutex::new(VecDeque::new())));

/// CLI 里没有真实鼠标，tooltip 固定从这里弹出
const DEFAULT_MOUSE: IVec2 = IVec2::new(120, 80);

/// 插件入口
pub struct DebugCliPlugin;
impl Plugin for DebugCliPlugin {
    fn build(&self, app: &mut App) {
        {
            let buffer = CLI_BUFFER.clone();
            std::thread::spawn(move || {
                use std::io::{self, BufRead};
                let stdin = io::stdin();
                for line in stdin.lock().lines().map_while(Result::ok) {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match buffer.lock() {
                        Ok(mut buf) => buf.push_back(line.to_string()),
                        Err(_) => break,
                    }
                }
            });
        }
        app
            // 事件：原始输入行
            .add_event::<CliLine>()
            // 每帧从 buffer 取出所有命令行写入事件
            .add_systems(Update, read_stdin)
            // 仅在 InGame 处理命令
            .add_systems(
                Update,
                execute_cli_commands.run_if(in_state(AppState::InGame)),
            );
    }
}

/* ---------------------------- 事件与枚举 ---------------------------- */

/// 终端敲的一整行
#[derive(Event)]
struct CliLine(String);

/// 我们支持的命令
#[derive(Debug, PartialEq)]
enum Command {
    Help,
    Status,
    Exit,
    Items(Option<String>), // None=全部；Some(token)=按 id/uuid/name 查询
    Give { id: String, count: u32 },
    Inventory,
    Click { slot: usize, button: u8, modifier: bool },
    Drag { slot: usize, modifier: bool },
    Release,
    Tooltip(Option<usize>), // None=手上的物品
    Drops,
    Unsupported(String),
}

/* ---------------------------- 读取 stdin ---------------------------- */

fn read_stdin(mut writer: EventWriter<CliLine>) {
    let Ok(mut buffer) = CLI_BUFFER.lock() else {
        return;
    };
    while let Some(line) = buffer.pop_front() {
        writer.write(CliLine(line));
    }
}

/* ---------------------------- 命令执行 ---------------------------- */

#[allow(clippy::too_many_arguments)]
fn execute_cli_commands(
    mut line_reader: EventReader<CliLine>,
    mut app_exit: EventWriter<AppExit>,
    mut log: EventWriter<LogEvent>,
    state: Res<State<AppState>>,
    catalog: Res<ItemCatalog>,
    drops: Res<DroppedItems>,
    mut ev_give: EventWriter<GiveItemEvent>,
    mut ev_list: EventWriter<ListInventoryEvent>,
    mut ev_click: EventWriter<SlotClickEvent>,
    mut ev_drag: EventWriter<SlotDragEvent>,
    mut ev_release: EventWriter<MouseReleaseEvent>,
    mut ev_tooltip: EventWriter<ShowTooltipEvent>,
) {
    for CliLine(input) in line_reader.read() {
        match parse_command(input) {
            Command::Help => {
                log.write(LogEvent(
                    "命令列表:
  help                          查看帮助
  status                        查看当前状态
  exit / quit                   退出程序
  items [token]                 列出物品 / 用 id、uuid、名称查询
  give <id> [count]             给予物品
  inventory                     查看背包和手上的物品
  click <slot> [left|right] [shift]
                                点击格子（左键拿起/放下，右键装入/倒出收纳袋）
  drag <slot> [shift]           按住右键拖到格子
  release                       松开鼠标
  tooltip [slot]                显示收纳袋 tooltip（省略 slot 为手上）
  drops                         查看掉在地上的物品
  ".into()));
            }

            Command::Status => {
                log.write(LogEvent(format!(
                    "State: {:?}, Items Loaded: {}, Dropped: {}",
                    state.get(),
                    catalog.len(),
                    drops.0.len()
                )));
            }

            Command::Exit => {
                log.write(LogEvent("Bye~".into()));
                app_exit.write(AppExit::Success);
            }

            Command::Items(None) => {
                for entry in catalog.iter() {
                    let uuid = uuid_from_id(&entry.id);
                    log.write(LogEvent(format!(
                        "{} | {} | {} | x{}",
                        uuid, entry.id, entry.name, entry.max_stack
                    )));
                }
            }

            Command::Items(Some(t)) => {
                let t_low = t.to_lowercase();
                if let Some(e) = catalog.iter().find(|e| {
                    e.id.eq_ignore_ascii_case(&t_low)
                        || e.name.eq_ignore_ascii_case(&t_low)
                        || uuid_from_id(&e.id).to_string() == t_low
                }) {
                    let uuid = uuid_from_id(&e.id);
                    log.write(LogEvent(format!(
                        "==================================================
UUID   : {uuid}
ID     : {}
Name   : {}
Stack  : {}
Tags   : {:?}
Bundle : {:?}
==================================================",
                        e.id, e.name, e.max_stack, e.tags, e.bundle
                    )));
                } else {
                    log.write(LogEvent("未找到匹配物品".into()));
                }
            }

            Command::Give { id, count } => {
                ev_give.write(GiveItemEvent { id, count });
            }

            Command::Inventory => {
                ev_list.write(ListInventoryEvent);
            }

            Command::Click { slot, button, modifier } => {
                ev_click.write(SlotClickEvent { slot, button, modifier });
                ev_list.write(ListInventoryEvent);
            }

            Command::Drag { slot, modifier } => {
                ev_drag.write(SlotDragEvent { slot, button: RIGHT_BUTTON, modifier });
                ev_list.write(ListInventoryEvent);
            }

            Command::Release => {
                ev_release.write(MouseReleaseEvent);
            }

            Command::Tooltip(slot) => {
                ev_tooltip.write(ShowTooltipEvent { slot, mouse: DEFAULT_MOUSE });
            }

            Command::Drops => {
                if drops.0.is_empty() {
                    log.write(LogEvent("  (nothing)".into()));
                }
                for stack in &drops.0 {
                    log.write(LogEvent(format!("  {} ×{}", stack.proto.name, stack.count)));
                }
            }

            Command::Unsupported(cmd) => {
                log.write(LogEvent(format!("不支持的命令: {cmd}")));
            }
        }
    }
}

/* ---------------------------- 工具函数 ---------------------------- */

fn parse_command(input: &str) -> Command {
    let mut parts = input.split_whitespace();
    let cmd = parts.next().unwrap_or("").to_lowercase();
    let rest: Vec<String> = parts.map(|s| s.to_lowercase()).collect();
    let modifier = rest.iter().any(|s| s == "shift");
    let slot = || rest.first().and_then(|s| s.parse::<usize>().ok());

    match cmd.as_str() {
        "help" | "h" | "?" => Command::Help,
        "status" | "s" => Command::Status,
        "exit" | "quit" | "q" => Command::Exit,
        "items" | "item" | "i" => Command::Items(rest.first().cloned()),
        "give" => {
            let id = rest.first().cloned().unwrap_or_default();
            let count = rest.get(1).and_then(|s| s.parse().ok()).unwrap_or(1);
            Command::Give { id, count }
        }
        "inventory" | "inv" => Command::Inventory,
        "click" | "c" => match slot() {
            Some(slot) => {
                let button = match rest.get(1).map(String::as_str) {
                    Some("left" | "l" | "0") => LEFT_BUTTON,
                    _ => RIGHT_BUTTON,
                };
                Command::Click { slot, button, modifier }
            }
            None => Command::Unsupported(input.to_string()),
        },
        "drag" | "d" => match slot() {
            Some(slot) => Command::Drag { slot, modifier },
            None => Command::Unsupported(input.to_string()),
        },
        "release" | "r" => Command::Release,
        "tooltip" | "tip" => Command::Tooltip(slot()),
        "drops" => Command::Drops,
        other => Command::Unsupported(other.into()),
    }
}

fn uuid_from_id(id: &str) -> Uuid {
    // 用固定 namespace + id 字节生成版本 5 UUID，保证可重复得到同一值
    Uuid::new_v5(&Uuid::NAMESPACE_OID, id.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mouse_commands() {
        assert_eq!(
            parse_command("click 3"),
            Command::Click { slot: 3, button: RIGHT_BUTTON, modifier: false }
        );
        assert_eq!(
            parse_command("CLICK 4 left shift"),
            Command::Click { slot: 4, button: LEFT_BUTTON, modifier: true }
        );
        assert_eq!(parse_command("drag 5 shift"), Command::Drag { slot: 5, modifier: true });
        assert_eq!(parse_command("release"), Command::Release);
        assert_eq!(parse_command("click x"), Command::Unsupported("click x".into()));
    }

    #[test]
    fn parses_give_and_tooltip() {
        assert_eq!(
            parse_command("give stone 12"),
            Command::Give { id: "stone".into(), count: 12 }
        );
        assert_eq!(parse_command("give pearl"), Command::Give { id: "pearl".into(), count: 1 });
        assert_eq!(parse_command("tooltip"), Command::Tooltip(None));
        assert_eq!(parse_command("tip 2"), Command::Tooltip(Some(2)));
    }

    #[test]
    fn uuid_is_stable() {
        assert_eq!(uuid_from_id("stone"), uuid_from_id("stone"));
        assert_ne!(uuid_from_id("stone"), uuid_from_id("pearl"));
    }
}

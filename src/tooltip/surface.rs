use bevy::math::IRect;

use crate::inventory::components::ItemStack;

/// 宿主提供的绘制接口
pub trait TooltipSurface {
    fn text_width(&self, text: &str) -> i32;
    /// 按像素宽度折行
    fn wrap(&self, text: &str, width: i32) -> Vec<String>;
    fn fill_gradient(&mut self, rect: IRect, top: u32, bottom: u32);
    fn draw_text(&mut self, text: &str, x: i32, y: i32);
    fn draw_item(&mut self, stack: &ItemStack, label: &str, x: i32, y: i32);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Fill { rect: IRect, top: u32, bottom: u32 },
    Text { text: String, x: i32, y: i32 },
    Item { id: String, label: String, x: i32, y: i32 },
}

/// 等宽字体、只记录绘制命令的实现，CLI 用它把 tooltip 打出来
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    pub char_width: i32,
    pub commands: Vec<DrawCommand>,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self { char_width: 6, commands: Vec::new() }
    }
}

impl RecordingSurface {
    pub fn texts(&self) -> impl Iterator<Item = (&str, i32, i32)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, x, y } => Some((text.as_str(), *x, *y)),
            _ => None,
        })
    }

    pub fn items(&self) -> impl Iterator<Item = (&str, i32, i32)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Item { id, x, y, .. } => Some((id.as_str(), *x, *y)),
            _ => None,
        })
    }
}

impl TooltipSurface for RecordingSurface {
    fn text_width(&self, text: &str) -> i32 {
        text.chars().count() as i32 * self.char_width
    }

    fn wrap(&self, text: &str, width: i32) -> Vec<String> {
        let per_line = (width / self.char_width.max(1)).max(1) as usize;
        let mut lines = Vec::new();
        let mut current = String::new();

        for word in text.split_whitespace() {
            let word_len = word.chars().count();
            let current_len = current.chars().count();
            if !current.is_empty() && current_len + 1 + word_len <= per_line {
                current.push(' ');
                current.push_str(word);
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            // 单词本身超宽时硬切
            let chars: Vec<char> = word.chars().collect();
            let mut chunks = chars.chunks(per_line).peekable();
            while let Some(chunk) = chunks.next() {
                let piece: String = chunk.iter().collect();
                if chunks.peek().is_some() {
                    lines.push(piece);
                } else {
                    current = piece;
                }
            }
        }
        if !current.is_empty() || lines.is_empty() {
            lines.push(current);
        }
        lines
    }

    fn fill_gradient(&mut self, rect: IRect, top: u32, bottom: u32) {
        self.commands.push(DrawCommand::Fill { rect, top, bottom });
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32) {
        self.commands.push(DrawCommand::Text { text: text.to_string(), x, y });
    }

    fn draw_item(&mut self, stack: &ItemStack, label: &str, x: i32, y: i32) {
        self.commands.push(DrawCommand::Item {
            id: stack.proto.id.clone(),
            label: label.to_string(),
            x,
            y,
        });
    }
}

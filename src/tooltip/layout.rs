use bevy::math::{IRect, IVec2};

use super::cache::DisplayUnit;
use super::surface::TooltipSurface;

pub const BACKGROUND_COLOR: u32 = 0xF010_0010;
pub const BORDER_COLOR_START: u32 = 0x5050_00FF;
pub const BORDER_COLOR_END: u32 = 0x5028_007F;

/// 每满 16 个图标，框体宽高各加 23 像素
const ICONS_PER_STEP: usize = 16;
const ICON_GROWTH: i32 = 23;
const LINE_HEIGHT: i32 = 10;
const TITLE_GAP: i32 = 2;
const ICON_BLOCK_HEIGHT: i32 = 40;
const EDGE_MARGIN: i32 = 4;

pub struct TooltipRequest<'a> {
    pub lines: &'a [String],
    pub mouse: IVec2,
    pub screen: IVec2,
    /// <= 0 表示不限制
    pub max_width: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipLayout {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub lines: Vec<String>,
    /// 标题折行后占的行数
    pub title_lines: usize,
}

/// 没有文字时不画 tooltip
pub fn compute_layout(
    req: &TooltipRequest,
    unit_count: usize,
    surface: &impl TooltipSurface,
) -> Option<TooltipLayout> {
    if req.lines.is_empty() {
        return None;
    }
    let (mouse, screen) = (req.mouse, req.screen);

    let mut width = req
        .lines
        .iter()
        .map(|l| surface.text_width(l))
        .max()
        .unwrap_or(0);
    let mut needs_wrap = false;
    let mut title_lines = 1;

    let mut x = mouse.x + 12;
    if x + width + EDGE_MARGIN > screen.x {
        x = mouse.x - 16 - width;
        if x < EDGE_MARGIN {
            width = if mouse.x > screen.x / 2 {
                mouse.x - 12 - 8
            } else {
                screen.x - 16 - mouse.x
            };
            needs_wrap = true;
        }
    }

    if req.max_width > 0 && width > req.max_width {
        width = req.max_width;
        needs_wrap = true;
    }

    let mut lines = req.lines.to_vec();
    if needs_wrap {
        let mut wrapped_width = 0;
        let mut wrapped = Vec::new();
        for (i, line) in req.lines.iter().enumerate() {
            let parts = surface.wrap(line, width);
            if i == 0 {
                title_lines = parts.len();
            }
            for part in parts {
                wrapped_width = wrapped_width.max(surface.text_width(&part));
                wrapped.push(part);
            }
        }
        width = wrapped_width;
        lines = wrapped;
        x = if mouse.x > screen.x / 2 {
            mouse.x - 16 - width
        } else {
            mouse.x + 12
        };
    }

    let mut y = mouse.y - 12;
    let mut height = 8;
    if lines.len() > 1 {
        height += (lines.len() as i32 - 1) * LINE_HEIGHT;
        if lines.len() > title_lines {
            height += TITLE_GAP;
        }
    }

    let growth = (unit_count / ICONS_PER_STEP) as i32 * ICON_GROWTH;
    width += growth;
    height += growth;

    if y < EDGE_MARGIN {
        y = EDGE_MARGIN;
    } else if y + height + EDGE_MARGIN > screen.y {
        y = screen.y - height - EDGE_MARGIN;
    }

    Some(TooltipLayout { x, y, width, height, lines, title_lines })
}

fn draw_background(layout: &TooltipLayout, surface: &mut impl TooltipSurface) {
    let (x, y, w, h) = (layout.x, layout.y, layout.width, layout.height);
    let bg = BACKGROUND_COLOR;
    let rects = [
        (IRect::new(x - 3, y - 4, x + w + 3, y - 3), bg, bg),
        (IRect::new(x - 3, y + h + 3, x + w + 3, y + h + 4), bg, bg),
        (IRect::new(x - 3, y - 3, x + w + 3, y + h + 3), bg, bg),
        (IRect::new(x - 4, y - 3, x - 3, y + h + 3), bg, bg),
        (IRect::new(x + w + 3, y - 3, x + w + 4, y + h + 3), bg, bg),
        (IRect::new(x - 3, y - 2, x - 2, y + h + 2), BORDER_COLOR_START, BORDER_COLOR_END),
        (IRect::new(x + w + 2, y - 2, x + w + 3, y + h + 2), BORDER_COLOR_START, BORDER_COLOR_END),
        (IRect::new(x - 3, y - 3, x + w + 3, y - 2), BORDER_COLOR_START, BORDER_COLOR_START),
        (IRect::new(x - 3, y + h + 2, x + w + 3, y + h + 3), BORDER_COLOR_END, BORDER_COLOR_END),
    ];
    for (rect, top, bottom) in rects {
        surface.fill_gradient(rect, top, bottom);
    }
}

/// 背景 → 标题 → 图标网格 → 其余文字
pub fn draw_tooltip(layout: &TooltipLayout, units: &[DisplayUnit], surface: &mut impl TooltipSurface) {
    draw_background(layout, surface);

    let x = layout.x;
    let mut y = layout.y;
    surface.draw_text(&layout.lines[0], x, y);
    y += LINE_HEIGHT;

    for (i, unit) in units.iter().enumerate() {
        let (ix, iy) = if i == 0 {
            (x, y)
        } else {
            (
                x + (i % 16) as i32 * unit.offset.0,
                y + (i % 4) as i32 * unit.offset.1,
            )
        };
        surface.draw_item(&unit.stack, &unit.label, ix, iy);
    }
    y += ICON_BLOCK_HEIGHT;

    for (n, line) in layout.lines.iter().enumerate().skip(1) {
        surface.draw_text(line, x, y);
        if n + 1 == layout.title_lines {
            y += TITLE_GAP;
        }
        y += LINE_HEIGHT;
    }
}

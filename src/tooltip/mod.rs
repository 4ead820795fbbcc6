pub mod cache;
pub mod layout;
pub mod surface;

use bevy::prelude::*;
use rand::Rng;

use crate::core::{events::LogEvent, resources::BundleConfig, states::AppState};
use crate::data::{catalog::ItemCatalog, schema::BundleKind};
use crate::inventory::bundle::{is_bundle, BundleContext};
use crate::inventory::components::{Backpack, Carried, ItemStack};
use cache::{TooltipRenderCache, TooltipRng};
use layout::{compute_layout, draw_tooltip, TooltipLayout, TooltipRequest};
use surface::{DrawCommand, RecordingSurface, TooltipSurface};

/// 请求显示某格（None = 手上）物品的 tooltip
#[derive(Event)]
pub struct ShowTooltipEvent {
    pub slot:  Option<usize>,
    pub mouse: IVec2,
}

pub struct TooltipPlugin;
impl Plugin for TooltipPlugin {
    fn build(&self, app: &mut App) {
        let seed = app
            .world()
            .get_resource::<BundleConfig>()
            .and_then(|c| c.tooltip_seed);

        app.init_resource::<TooltipRenderCache>()
            .insert_resource(TooltipRng::new(seed))
            .add_event::<ShowTooltipEvent>()
            .add_systems(Update, show_tooltip.run_if(in_state(AppState::InGame)));
    }
}

/// 默认文字：名字 + 已用容量
pub fn tooltip_lines(ctx: &BundleContext, bundle: &ItemStack) -> Vec<String> {
    let mut lines = vec![bundle.proto.name.clone()];
    match &bundle.proto.bundle {
        Some(BundleKind::Bundle { capacity }) => {
            lines.push(format!("{}/{}", ctx.items_count(bundle), capacity));
        }
        Some(BundleKind::Crate) => {
            let used = ctx.items(bundle).iter().filter(|s| !s.is_empty()).count();
            lines.push(format!("{used}/{} 格", crate::inventory::bundle::CRATE_SLOTS));
        }
        None => {}
    }
    lines
}

/// 不是收纳袋时返回 None，交给宿主默认 tooltip
pub fn render_bundle_tooltip(
    cache: &mut TooltipRenderCache,
    rng: &mut impl Rng,
    ctx: &BundleContext,
    bundle: &ItemStack,
    req: &TooltipRequest,
    surface: &mut impl TooltipSurface,
) -> Option<TooltipLayout> {
    if !is_bundle(bundle) {
        return None;
    }
    let units = cache.refresh(&ctx.items(bundle), rng);
    let layout = compute_layout(req, units.len(), &*surface)?;
    draw_tooltip(&layout, &units, surface);
    Some(layout)
}

fn show_tooltip(
    mut events: EventReader<ShowTooltipEvent>,
    mut cache: ResMut<TooltipRenderCache>,
    mut rng: ResMut<TooltipRng>,
    backpack: Res<Backpack>,
    carried: Res<Carried>,
    catalog: Res<ItemCatalog>,
    config: Res<BundleConfig>,
    mut log: EventWriter<LogEvent>,
) {
    let ctx = BundleContext::new(&catalog, &config.ignored_tags);
    for ev in events.read() {
        let stack = match ev.slot {
            Some(i) => backpack.slots.get(i),
            None => Some(&carried.0),
        };
        let Some(stack) = stack.filter(|s| is_bundle(s)) else {
            log.write(LogEvent("那里没有收纳袋".into()));
            continue;
        };

        let lines = tooltip_lines(&ctx, stack);
        let req = TooltipRequest {
            lines: &lines,
            mouse: ev.mouse,
            screen: IVec2::new(config.screen_width, config.screen_height),
            max_width: config.max_tooltip_width,
        };
        let mut surface = RecordingSurface::default();
        let Some(layout) =
            render_bundle_tooltip(&mut cache, &mut rng.0, &ctx, stack, &req, &mut surface)
        else {
            continue;
        };

        log.write(LogEvent(format!(
            "tooltip @({}, {}) {}x{}",
            layout.x, layout.y, layout.width, layout.height
        )));
        for command in &surface.commands {
            match command {
                DrawCommand::Text { text, x, y } => {
                    log.write(LogEvent(format!("  text ({x:>4},{y:>4}) {text}")));
                }
                DrawCommand::Item { id, label, x, y } => {
                    log.write(LogEvent(format!("  icon ({x:>4},{y:>4}) {id} [{label}]")));
                }
                DrawCommand::Fill { .. } => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::bundle::tests::{catalog, stack};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn renders_bundle_and_reuses_cache_between_frames() {
        let catalog = catalog();
        let tags = vec!["bundle_ignored".to_string()];
        let ctx = BundleContext::new(&catalog, &tags);
        let mut bundle = stack(&catalog, "bundle", 1);
        ctx.add(&mut bundle, &mut stack(&catalog, "stone", 3));
        ctx.add(&mut bundle, &mut stack(&catalog, "pearl", 2));

        let lines = tooltip_lines(&ctx, &bundle);
        assert_eq!(lines, vec!["bundle".to_string(), "5/64".to_string()]);

        let req = TooltipRequest {
            lines: &lines,
            mouse: IVec2::new(50, 50),
            screen: IVec2::new(427, 240),
            max_width: 0,
        };
        let mut cache = TooltipRenderCache::default();
        let mut rng = StdRng::seed_from_u64(9);

        let mut first = RecordingSurface::default();
        render_bundle_tooltip(&mut cache, &mut rng, &ctx, &bundle, &req, &mut first).unwrap();
        let mut second = RecordingSurface::default();
        render_bundle_tooltip(&mut cache, &mut rng, &ctx, &bundle, &req, &mut second).unwrap();

        assert_eq!(first.items().count(), 5);
        assert_eq!(first.commands, second.commands);
    }

    #[test]
    fn non_bundles_fall_through() {
        let catalog = catalog();
        let tags: Vec<String> = Vec::new();
        let ctx = BundleContext::new(&catalog, &tags);
        let stone = stack(&catalog, "stone", 3);
        let lines = vec!["Stone".to_string()];
        let req = TooltipRequest {
            lines: &lines,
            mouse: IVec2::ZERO,
            screen: IVec2::new(427, 240),
            max_width: 0,
        };
        let mut surface = RecordingSurface::default();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(render_bundle_tooltip(
            &mut TooltipRenderCache::default(),
            &mut rng,
            &ctx,
            &stone,
            &req,
            &mut surface
        )
        .is_none());
        assert!(surface.commands.is_empty());
    }
}

//! Screen implementations. Each screen is a top-level Component.

mod inventory;
mod map;
mod report;

use sodo_config::Config;

use crate::component::Component;
use crate::screen::ScreenId;
use inventory::InventoryScreen;
use map::MapScreen;
use report::ReportScreen;

/// One instance of every screen, in tab order.
pub fn create_screens(config: &Config) -> Vec<(ScreenId, Box<dyn Component>)> {
    ScreenId::ALL
        .into_iter()
        .map(|id| {
            let screen: Box<dyn Component> = match id {
                ScreenId::Map => Box::new(MapScreen::new(
                    config.editor.nudge_step,
                    config.editor.handle_offset,
                )),
                ScreenId::Inventory => Box::new(InventoryScreen::new()),
                ScreenId::Report => Box::new(ReportScreen::new()),
            };
            (id, screen)
        })
        .collect()
}

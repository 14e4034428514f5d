pub mod text_surface;

use tradewatch_domain::repositories::render_surface::{Mount, RenderSurface};
use tradewatch_domain::services::diagnostics::Diagnostic;
use tradewatch_domain::services::renderer::FeedRenderer;

/// Paints every projection onto `surface`. Mounts the surface lacks are skipped and reported;
/// the remaining mounts still paint.
pub fn paint(renderer: &FeedRenderer, surface: &mut dyn RenderSurface) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for mount in Mount::ALL {
        if !surface.has_mount(mount) {
            diagnostics.push(Diagnostic::missing_mount(mount));
            continue;
        }
        match mount {
            Mount::Connection => surface.paint_connection(renderer.connection(), renderer.market()),
            Mount::Balance => surface.paint_balance(renderer.balance_view().as_ref()),
            Mount::EquityChart => surface.paint_equity(&renderer.equity_points()),
            Mount::Trades => surface.paint_trades(&renderer.trade_views(), renderer.filter()),
            Mount::Positions => {
                surface.paint_positions(&renderer.position_views(), renderer.filter())
            }
            Mount::Orders => surface.paint_orders(&renderer.order_views()),
            Mount::Log => surface.paint_log(&renderer.log_views()),
            Mount::Filters => surface.paint_filters(renderer.filter()),
        }
    }
    diagnostics
}

//! Generates the simulated list the command line runs against.

use sift_view::simulated::{SimulatedItem, SimulatedView};

use crate::config::SimulationSettings;

/// Build a view populated per the `[simulation]` settings. Items are laid
/// out top to bottom at a fixed spacing; a fraction can start out already
/// selected or unlabeled to exercise the skip paths.
pub fn build_view(settings: &SimulationSettings) -> SimulatedView {
    let mut view = if settings.total_extent > settings.initial_extent && settings.lazy_chunk > 0.0
    {
        SimulatedView::lazy(
            settings.viewport_extent,
            settings.initial_extent,
            settings.total_extent,
            settings.lazy_chunk,
        )
    } else {
        SimulatedView::new(settings.viewport_extent, settings.total_extent)
    };

    for index in 0..settings.items {
        let top = f64::from(index) * settings.item_spacing;
        let label = format!("photo-{index:04}");
        let preselected =
            settings.preselected_every > 0 && (index + 1) % settings.preselected_every == 0;
        let unlabeled =
            settings.unlabeled_every > 0 && (index + 1) % settings.unlabeled_every == 0;

        let item = if preselected {
            SimulatedItem::selected(&label, top)
        } else if unlabeled {
            SimulatedItem::unlabeled(top, 8.0)
        } else {
            SimulatedItem::unselected(&label, top)
        };
        view = view.with_item(item);
    }
    view
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use sift_view::view::{ItemState, ItemView};

    use super::build_view;
    use crate::config::CliConfig;

    fn settings() -> crate::config::SimulationSettings {
        let mut settings = CliConfig::default_values().simulation;
        settings.items = 10;
        settings.item_spacing = 100.0;
        settings.viewport_extent = 500.0;
        settings.initial_extent = 1000.0;
        settings.total_extent = 1000.0;
        settings.lazy_chunk = 0.0;
        settings
    }

    #[tokio::test]
    async fn lays_items_out_at_the_configured_spacing() {
        let view = build_view(&settings());
        let frame = view.scroll_frame().await.unwrap();
        assert_eq!(frame.viewport_extent, 500.0);
        assert_eq!(frame.content_extent, 1000.0);

        // Tops 0..400 fall inside the initial window.
        let visible = view.list_items().await.unwrap();
        assert_eq!(visible.len(), 5);
    }

    #[tokio::test]
    async fn preselects_every_nth_item() {
        let mut s = settings();
        s.preselected_every = 3;
        let view = build_view(&s);

        let handles = view.list_items().await.unwrap();
        let mut selected = 0;
        for handle in handles {
            if view.item_state(handle).await.unwrap() == ItemState::Selected {
                selected += 1;
            }
        }
        // The 3rd and 6th items are preselected; only the 3rd falls inside
        // the five-row window.
        assert_eq!(selected, 1);
    }

    #[tokio::test]
    async fn unlabeled_items_report_no_label() {
        let mut s = settings();
        s.unlabeled_every = 2;
        let view = build_view(&s);

        let handles = view.list_items().await.unwrap();
        let first = view.item_label(handles[0]).await.unwrap();
        let second = view.item_label(handles[1]).await.unwrap();
        assert_eq!(first.as_deref(), Some("photo-0000"));
        assert_eq!(second, None);
    }
}

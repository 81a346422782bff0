//! Bidirectional scroll and transient-highlight coordination.
//!
//! Correlation prefers exact block identifiers over the approximate
//! content-fingerprint line mapping. A sync triggered from one side
//! suppresses reciprocal triggers for a short cooldown window so the two
//! panes cannot feed back into each other.

use crate::element::{InlineStyle, Pane};
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Feedback-loop suppression window (valid 16–50ms).
    pub cooldown: Duration,
    /// How long a transient highlight stays applied.
    pub highlight_duration: Duration,
    /// Visual treatment applied while highlighted.
    pub highlight_background: String,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_millis(32),
            highlight_duration: Duration::from_millis(1500),
            highlight_background: "rgba(255, 213, 79, 0.45)".to_string(),
        }
    }
}

struct ActiveHighlight {
    index: usize,
    saved: InlineStyle,
    expires_at: Instant,
}

pub struct SyncController {
    options: SyncOptions,
    syncing_until: Option<Instant>,
    id_index: HashMap<String, usize>,
    highlights: Vec<ActiveHighlight>,
}

impl SyncController {
    pub fn new(options: SyncOptions) -> Self {
        Self {
            options,
            syncing_until: None,
            id_index: HashMap::new(),
            highlights: Vec::new(),
        }
    }

    /// Whether a sync is currently suppressing reciprocal triggers.
    pub fn is_syncing(&self, now: Instant) -> bool {
        self.syncing_until.map(|until| now < until).unwrap_or(false)
    }

    fn begin_sync(&mut self, now: Instant) -> bool {
        if self.is_syncing(now) {
            return false;
        }
        self.syncing_until = Some(now + self.options.cooldown);
        true
    }

    /// Rebuild the block-id → element index. Call whenever the pane's
    /// content changes (elements are re-created on each render pass).
    pub fn rebuild_index(&mut self, pane: &dyn Pane) {
        self.id_index.clear();
        for index in 0..pane.element_count() {
            if let Some(element) = pane.element(index) {
                if let Some(id) = &element.block_id {
                    self.id_index.entry(id.clone()).or_insert(index);
                }
            }
        }
        // Stale highlight indices would restore onto the wrong elements.
        self.highlights.clear();
    }

    /// Preferred correlation: exact block id, then nearest line.
    pub fn resolve_element(
        &self,
        pane: &dyn Pane,
        block_id: Option<&str>,
        line: Option<u32>,
    ) -> Option<usize> {
        if let Some(id) = block_id {
            if let Some(&index) = self.id_index.get(id) {
                return Some(index);
            }
        }
        line.and_then(|line| self.nearest_line_element(pane, line))
    }

    fn nearest_line_element(&self, pane: &dyn Pane, line: u32) -> Option<usize> {
        let mut best: Option<(usize, u32)> = None;
        for index in 0..pane.element_count() {
            let Some(element) = pane.element(index) else {
                continue;
            };
            let Some(element_line) = element.line else {
                continue;
            };
            let distance = element_line.abs_diff(line);
            if best.map(|(_, d)| distance < d).unwrap_or(true) {
                best = Some((index, distance));
            }
        }
        best.map(|(index, _)| index)
    }

    /// Scroll the pane so the element nearest `line` is visible. No
    /// mapping means no-op — never a jump to a wrong location.
    pub fn scroll_to_line(&mut self, pane: &mut dyn Pane, line: u32, now: Instant) -> bool {
        let Some(index) = self.nearest_line_element(pane, line) else {
            tracing::debug!(line, "no element mapped for line, skipping sync");
            return false;
        };
        self.scroll_to_element(pane, index, now)
    }

    /// Scroll the pane to the element with the given block id.
    pub fn scroll_to_block(&mut self, pane: &mut dyn Pane, block_id: &str, now: Instant) -> bool {
        let Some(&index) = self.id_index.get(block_id) else {
            return false;
        };
        self.scroll_to_element(pane, index, now)
    }

    pub fn scroll_to_element(&mut self, pane: &mut dyn Pane, index: usize, now: Instant) -> bool {
        let (top, height) = match pane.element(index) {
            Some(element) => (element.top, element.height),
            None => return false,
        };
        if !self.begin_sync(now) {
            return false;
        }
        let centered = top - pane.viewport_height() / 2.0 + height / 2.0;
        pane.scroll_to(clamp_offset(pane, centered));
        true
    }

    /// Percentage-based proportional scroll for simple dual-pane cases.
    pub fn sync_from_source(
        &mut self,
        source: &dyn Pane,
        target: &mut dyn Pane,
        now: Instant,
    ) -> bool {
        self.proportional(source, target, now)
    }

    pub fn sync_from_target(
        &mut self,
        target: &dyn Pane,
        source: &mut dyn Pane,
        now: Instant,
    ) -> bool {
        self.proportional(target, source, now)
    }

    fn proportional(&mut self, from: &dyn Pane, to: &mut dyn Pane, now: Instant) -> bool {
        if !self.begin_sync(now) {
            return false;
        }
        let from_range = (from.scroll_height() - from.viewport_height()).max(1.0);
        let ratio = (from.scroll_offset() / from_range).clamp(0.0, 1.0);
        let to_range = (to.scroll_height() - to.viewport_height()).max(0.0);
        to.scroll_to(ratio * to_range);
        true
    }

    /// Apply the transient highlight treatment to an element, capturing
    /// its exact prior inline style. The style is restored — not cleared
    /// — when [`SyncController::tick`] observes the expiry.
    pub fn highlight(&mut self, pane: &mut dyn Pane, index: usize, now: Instant) -> bool {
        let duration = self.options.highlight_duration;
        self.highlight_for(pane, index, duration, now)
    }

    /// [`SyncController::highlight`] with an explicit duration.
    pub fn highlight_for(
        &mut self,
        pane: &mut dyn Pane,
        index: usize,
        duration: Duration,
        now: Instant,
    ) -> bool {
        let saved = match pane.element(index) {
            Some(element) => element.style.clone(),
            None => return false,
        };

        if let Some(active) = self.highlights.iter_mut().find(|h| h.index == index) {
            // Re-highlighting extends the window; the original capture
            // stays authoritative.
            active.expires_at = now + duration;
            return true;
        }

        let mut applied = saved.clone();
        applied.background = Some(self.options.highlight_background.clone());
        applied.transition = Some("background-color 0.3s ease".to_string());
        pane.set_style(index, applied);

        self.highlights.push(ActiveHighlight {
            index,
            saved,
            expires_at: now + duration,
        });
        true
    }

    /// Restore expired highlights. Driven from the editing surface's
    /// frame loop so timing stays deterministic.
    pub fn tick(&mut self, pane: &mut dyn Pane, now: Instant) {
        let mut index = 0;
        while index < self.highlights.len() {
            if self.highlights[index].expires_at <= now {
                let expired = self.highlights.swap_remove(index);
                pane.set_style(expired.index, expired.saved);
            } else {
                index += 1;
            }
        }
    }

    pub fn active_highlight_count(&self) -> usize {
        self.highlights.len()
    }
}

impl Default for SyncController {
    fn default() -> Self {
        Self::new(SyncOptions::default())
    }
}

fn clamp_offset(pane: &dyn Pane, offset: f64) -> f64 {
    let max = (pane.scroll_height() - pane.viewport_height()).max(0.0);
    offset.clamp(0.0, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::PaneElement;

    struct TestPane {
        elements: Vec<PaneElement>,
        scroll: f64,
        scroll_height: f64,
        viewport: f64,
    }

    impl TestPane {
        fn new(elements: Vec<PaneElement>, scroll_height: f64, viewport: f64) -> Self {
            Self {
                elements,
                scroll: 0.0,
                scroll_height,
                viewport,
            }
        }
    }

    impl Pane for TestPane {
        fn element_count(&self) -> usize {
            self.elements.len()
        }

        fn element(&self, index: usize) -> Option<&PaneElement> {
            self.elements.get(index)
        }

        fn set_style(&mut self, index: usize, style: InlineStyle) {
            if let Some(element) = self.elements.get_mut(index) {
                element.style = style;
            }
        }

        fn scroll_offset(&self) -> f64 {
            self.scroll
        }

        fn scroll_to(&mut self, offset: f64) {
            self.scroll = offset;
        }

        fn scroll_height(&self) -> f64 {
            self.scroll_height
        }

        fn viewport_height(&self) -> f64 {
            self.viewport
        }
    }

    fn preview_pane() -> TestPane {
        TestPane::new(
            vec![
                PaneElement::new(0.0, 40.0).with_block_id("b-1").with_line(1),
                PaneElement::new(400.0, 40.0).with_block_id("b-2").with_line(10),
                PaneElement::new(900.0, 40.0).with_block_id("b-3").with_line(25),
            ],
            1200.0,
            300.0,
        )
    }

    #[test]
    fn test_scroll_to_line_picks_nearest() {
        let mut pane = preview_pane();
        let mut controller = SyncController::default();
        let now = Instant::now();

        assert!(controller.scroll_to_line(&mut pane, 11, now));
        // Element at top=400 centered in a 300px viewport.
        assert_eq!(pane.scroll_offset(), 400.0 - 150.0 + 20.0);
    }

    #[test]
    fn test_no_line_mapping_is_a_noop() {
        let mut pane = TestPane::new(vec![PaneElement::new(0.0, 40.0)], 600.0, 300.0);
        let mut controller = SyncController::default();

        assert!(!controller.scroll_to_line(&mut pane, 5, Instant::now()));
        assert_eq!(pane.scroll_offset(), 0.0);
    }

    #[test]
    fn test_cooldown_suppresses_reciprocal_sync() {
        let mut pane = preview_pane();
        let mut controller = SyncController::default();
        let now = Instant::now();

        assert!(controller.scroll_to_line(&mut pane, 1, now));
        // A reciprocal trigger inside the window is suppressed.
        assert!(!controller.scroll_to_line(&mut pane, 25, now + Duration::from_millis(10)));
        // After the window passes it works again.
        assert!(controller.scroll_to_line(&mut pane, 25, now + Duration::from_millis(100)));
    }

    #[test]
    fn test_block_id_preferred_over_line() {
        let pane = preview_pane();
        let mut controller = SyncController::default();
        controller.rebuild_index(&pane);

        // The line alone would pick element 0; the id wins.
        let index = controller.resolve_element(&pane, Some("b-3"), Some(1));
        assert_eq!(index, Some(2));

        // Unknown id falls back to the nearest line.
        let index = controller.resolve_element(&pane, Some("gone"), Some(9));
        assert_eq!(index, Some(1));
    }

    #[test]
    fn test_scroll_to_block() {
        let mut pane = preview_pane();
        let mut controller = SyncController::default();
        controller.rebuild_index(&pane);

        assert!(controller.scroll_to_block(&mut pane, "b-2", Instant::now()));
        assert!(pane.scroll_offset() > 0.0);
        assert!(!controller.scroll_to_block(&mut pane, "missing", Instant::now()));
    }

    #[test]
    fn test_proportional_sync() {
        let mut source = preview_pane();
        source.scroll = 450.0; // half of the 900px scrollable range
        let mut target = TestPane::new(vec![], 2300.0, 300.0);

        let mut controller = SyncController::default();
        assert!(controller.sync_from_source(&source, &mut target, Instant::now()));
        assert_eq!(target.scroll_offset(), 1000.0);
    }

    #[test]
    fn test_highlight_captures_and_restores_prior_style() {
        let mut pane = preview_pane();
        pane.elements[1].style = InlineStyle {
            background: Some("steelblue".to_string()),
            outline: Some("1px solid red".to_string()),
            transition: None,
        };
        let prior = pane.elements[1].style.clone();

        let mut controller = SyncController::default();
        let now = Instant::now();
        assert!(controller.highlight(&mut pane, 1, now));

        // Treatment applied, prior outline preserved.
        assert_ne!(pane.elements[1].style.background, prior.background);
        assert_eq!(pane.elements[1].style.outline, prior.outline);

        // Before expiry nothing is restored.
        controller.tick(&mut pane, now + Duration::from_millis(100));
        assert_ne!(pane.elements[1].style, prior);

        // After the duration the exact prior style comes back.
        controller.tick(&mut pane, now + Duration::from_millis(1600));
        assert_eq!(pane.elements[1].style, prior);
        assert_eq!(controller.active_highlight_count(), 0);
    }

    #[test]
    fn test_rehighlight_extends_without_losing_capture() {
        let mut pane = preview_pane();
        let mut controller = SyncController::default();
        let now = Instant::now();

        controller.highlight(&mut pane, 0, now);
        let highlighted = pane.elements[0].style.clone();

        // Re-highlight mid-window: style unchanged, expiry extended.
        controller.highlight(&mut pane, 0, now + Duration::from_millis(1000));
        assert_eq!(pane.elements[0].style, highlighted);

        controller.tick(&mut pane, now + Duration::from_millis(1600));
        assert_eq!(
            controller.active_highlight_count(),
            1,
            "extended highlight should still be active"
        );

        controller.tick(&mut pane, now + Duration::from_millis(2600));
        assert_eq!(pane.elements[0].style, InlineStyle::default());
    }
}

use crate::types::VisemeEvent;

/// Drops an event when the last kept event shows the same viseme less than
/// `window_secs` earlier. Order is preserved and the pass is idempotent.
pub fn collapse_near_duplicates(events: &[VisemeEvent], window_secs: f64) -> Vec<VisemeEvent> {
    let mut kept: Vec<VisemeEvent> = Vec::with_capacity(events.len());
    for &event in events {
        if let Some(prev) = kept.last() {
            if prev.viseme == event.viseme && (event.time - prev.time).abs() < window_secs {
                continue;
            }
        }
        kept.push(event);
    }
    if kept.len() != events.len() {
        tracing::debug!(
            dropped = events.len() - kept.len(),
            "postprocess: collapsed near-duplicate visemes"
        );
    }
    kept
}

use crate::curve::WatchingCurve;
use crate::events::VideoEvent;

/// Sweeps a video's events, sorted by video time, into a watcher-count curve.
///
/// A point `(x, n)` is emitted whenever video time moves past `x`, where
/// `n` already includes the first event at the new time. The closing
/// point applies the last event's delta a second time. Returns `None` for
/// an empty input.
pub fn watching_curve(events: &[VideoEvent]) -> Option<WatchingCurve> {
    let last = events.last()?;

    let mut curve = WatchingCurve::new();
    let mut current_watchers: i64 = 0;
    let mut previous_x = 0.0;

    for event in events {
        current_watchers += event.kind.watcher_delta();
        if event.video_time != previous_x {
            curve.push(previous_x, current_watchers);
        }
        previous_x = event.video_time;
    }

    current_watchers += last.kind.watcher_delta();
    curve.push(previous_x, current_watchers);

    Some(curve)
}

use crate::models::{AbsoluteInterval, TaggedInterval};

/// Removes every busy overlap from the open intervals, preserving the
/// modality tag on each surviving fragment. The result is independent of
/// the order of the busy list. Worst-case cost is proportional to
/// `open.len() * busy.len()`, which is why callers run this through the
/// compute executor.
pub fn subtract_busy(base: Vec<TaggedInterval>, busy: &[AbsoluteInterval]) -> Vec<TaggedInterval> {
    let mut open = base;
    for blocked in busy {
        open = open
            .iter()
            .flat_map(|tagged| {
                interval_diff(&tagged.interval, blocked)
                    .into_iter()
                    .map(move |fragment| TaggedInterval {
                        interval: fragment,
                        appointment_type: tagged.appointment_type,
                    })
            })
            .collect();
    }
    open
}

/// `r - b` by endpoint sorting: a lead fragment survives when `r` starts
/// first, a trail fragment when `r` ends last. Zero-width fragments are
/// dropped, so a busy interval covering `r` erases it and one inside `r`
/// splits it in two.
fn interval_diff(r: &AbsoluteInterval, b: &AbsoluteInterval) -> Vec<AbsoluteInterval> {
    let mut endpoints = [r.start, r.end, b.start, b.end];
    endpoints.sort();

    let mut fragments = Vec::with_capacity(2);
    if endpoints[0] == r.start && endpoints[0] < endpoints[1] {
        fragments.push(AbsoluteInterval {
            start: endpoints[0],
            end: endpoints[1],
        });
    }
    if endpoints[3] == r.end && endpoints[2] < endpoints[3] {
        fragments.push(AbsoluteInterval {
            start: endpoints[2],
            end: endpoints[3],
        });
    }
    fragments
}

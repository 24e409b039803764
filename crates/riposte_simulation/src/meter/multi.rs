//! Multi-segment meter (e.g. health bar made of several stacked bars).

use super::Meter;

/// Segments are ordered bottom-up: segment 0 empties last.
///
/// The active segment starts at the top (last) one. Adjustments cascade:
/// overflow past an emptied segment carries into the previous one, stopping at
/// segment 0; overflow past a filled segment carries into the next one, stopping
/// at the last.
#[derive(Debug)]
pub struct MultiMeter {
    meters: Vec<Meter>,
    index: usize,
}

impl MultiMeter {
    /// Returns `None` for an empty segment list
    pub fn new(meters: Vec<Meter>) -> Option<Self> {
        if meters.is_empty() {
            return None;
        }
        let index = meters.len() - 1;
        Some(Self { meters, index })
    }

    pub fn active_index(&self) -> usize {
        self.index
    }

    pub fn active_meter(&self) -> &Meter {
        &self.meters[self.index]
    }

    pub fn meters(&self) -> &[Meter] {
        &self.meters
    }

    /// Sum of all segment ranges
    pub fn total(&self) -> f32 {
        self.meters.iter().map(Meter::range).sum()
    }

    /// Minimum of the first segment
    pub fn min(&self) -> f32 {
        self.meters[0].min()
    }

    /// Maximum of the last segment
    pub fn max(&self) -> f32 {
        self.meters[self.meters.len() - 1].max()
    }

    /// Adjust starting from the active segment, carrying overflow segment to segment.
    ///
    /// With `clamp = false` only the active segment moves (an unclamped segment has
    /// no remainder to hand on).
    pub fn adjust(&mut self, delta: f32, clamp: bool) {
        if !clamp {
            self.meters[self.index].adjust(delta, false);
            return;
        }

        let last = self.meters.len() - 1;
        let mut delta = delta;

        while delta != 0.0 {
            let adjustment = self.meters[self.index].adjust_with_overflow(delta, true);
            let carry = -adjustment.overflow;
            let active = &self.meters[self.index];

            if delta < 0.0 && active.is_empty() {
                if self.index == 0 {
                    break;
                }
                self.index -= 1;
            } else if delta > 0.0 && active.is_full() {
                if self.index == last {
                    break;
                }
                self.index += 1;
            } else {
                break;
            }

            delta = carry;
        }
    }
}

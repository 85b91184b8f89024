use serde::{Deserialize, Serialize};

use crate::{Notification, NotificationQueue};

/// Lowest value the brightness slider can take.
pub const MIN_BRIGHTNESS: u32 = 25;
/// Highest value the brightness slider can take.
pub const MAX_BRIGHTNESS: u32 = 103;
/// Midpoint of the slider range, used when there is too little data to judge.
pub const DEFAULT_BRIGHTNESS: u32 = (MIN_BRIGHTNESS + MAX_BRIGHTNESS) / 2;

/// Buffers shorter than this always get [`DEFAULT_BRIGHTNESS`].
pub const HEURISTIC_MIN_DATA: usize = 100;
/// Share of the buffer the most frequent byte values have to cover.
const HEURISTIC_THRESHOLD: f64 = 0.66;
const HEURISTIC_MIN: u32 = 38;
const HEURISTIC_MAX: u32 = 66;
// Decrease to reduce noise; overdoing it hides sparse data.
const HEURISTIC_SCALING: f64 = 2.5;

/// Suggests a brightness for `data` from its byte-value histogram.
///
/// Concentrated (low entropy) data needs only a handful of byte values to
/// cover two thirds of the buffer and ends up near [`HEURISTIC_MAX`];
/// near-uniform data needs many and bottoms out at [`HEURISTIC_MIN`]. The
/// result is always narrower than the slider range so a manual override can
/// still reach the extremes.
pub fn suggest_brightness(data: &[u8]) -> u32 {
    let size = data.len();
    if size < HEURISTIC_MIN_DATA {
        return DEFAULT_BRIGHTNESS;
    }

    let mut counts = [0u64; 256];
    for &byte in data {
        counts[usize::from(byte)] += 1;
    }
    counts.sort_unstable();

    let threshold = HEURISTIC_THRESHOLD * size as f64;
    let mut sum = 0u64;
    let mut offset = 0u32;
    for &count in counts.iter().rev() {
        if sum as f64 >= threshold {
            break;
        }
        sum += count;
        offset += 1;
    }

    let offset = (f64::from(offset) / HEURISTIC_SCALING) as u32;
    HEURISTIC_MAX.saturating_sub(offset).max(HEURISTIC_MIN)
}

/// Per-point intensity for a brightness value: `brightness³ / data_size`.
///
/// Points are blended additively, so the intensity has to fall faster than
/// linearly as either the slider or the number of points grows. An empty
/// buffer has nothing to draw and maps to zero.
pub fn intensity(brightness: u32, data_size: usize) -> f32 {
    if data_size == 0 {
        return 0.0;
    }
    let brightness = brightness as f32;
    brightness * brightness * brightness / data_size as f32
}

/// Brightness value, heuristic flag and the derived intensity.
///
/// `intensity` is recomputed eagerly whenever the value or the data size
/// changes and is never derived at draw time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrightnessState {
    value: u32,
    heuristic_enabled: bool,
    intensity: f32,
}

impl Default for BrightnessState {
    fn default() -> Self {
        Self::new(DEFAULT_BRIGHTNESS, true)
    }
}

impl BrightnessState {
    /// Creates a state with `value` clamped to the slider range. The intensity
    /// stays at zero until [`Self::apply`] is called with a data size.
    pub fn new(value: u32, heuristic_enabled: bool) -> Self {
        Self {
            value: value.clamp(MIN_BRIGHTNESS, MAX_BRIGHTNESS),
            heuristic_enabled,
            intensity: 0.0,
        }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn heuristic_enabled(&self) -> bool {
        self.heuristic_enabled
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Stores `value` and recomputes the intensity for `data_size` points.
    pub fn apply(&mut self, value: u32, data_size: usize) {
        self.value = value.clamp(MIN_BRIGHTNESS, MAX_BRIGHTNESS);
        self.intensity = intensity(self.value, data_size);
    }

    /// Recomputes the suggestion if the heuristic is on. Returns `true` when
    /// the stored value changed; an unchanged suggestion raises nothing.
    pub fn auto_apply(&mut self, data: &[u8], notes: &mut NotificationQueue) -> bool {
        if !self.heuristic_enabled {
            return false;
        }

        let suggested = suggest_brightness(data);
        if suggested == self.value {
            return false;
        }

        tracing::debug!(
            previous = self.value,
            brightness = suggested,
            size = data.len(),
            "applying heuristic brightness"
        );
        self.apply(suggested, data.len());
        notes.push(Notification::BrightnessChanged(self.value));
        true
    }

    /// Handles the brightness slider. Moving it onto the current value does
    /// nothing; any other value turns the heuristic off and is applied as is.
    pub fn slider_moved(&mut self, value: u32, data_size: usize, notes: &mut NotificationQueue) {
        let value = value.clamp(MIN_BRIGHTNESS, MAX_BRIGHTNESS);
        if value == self.value {
            return;
        }

        if self.heuristic_enabled {
            self.heuristic_enabled = false;
            notes.push(Notification::HeuristicToggled(false));
        }
        tracing::debug!(brightness = value, "manual brightness override");
        self.apply(value, data_size);
    }

    /// Handles the heuristic checkbox. Only the flag changes here; the caller
    /// follows an enable with [`Self::auto_apply`] on the data being drawn.
    pub fn set_heuristic_enabled(&mut self, enabled: bool) {
        if enabled != self.heuristic_enabled {
            tracing::debug!(enabled, "brightness heuristic toggled");
        }
        self.heuristic_enabled = enabled;
    }
}

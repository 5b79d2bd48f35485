//! Blackbody color temperature model.
//!
//! Maps a color temperature in Kelvin to an 8-bit RGB color. The hue curve is
//! the usual piecewise fit of the Planckian locus; on top of it a brightness
//! factor dims low temperatures so the strip starts out as a faint red glow
//! and only reaches full output near daylight temperatures.
//!
//! Every intermediate value is clamped, so any input (including NaN or
//! negative temperatures) yields a valid color.

use libm::{log, pow};
use palette::Srgb;

/// 8-bit RGB color used throughout the crate.
pub type RgbColor = Srgb<u8>;

/// All channels off.
pub const COLOR_OFF: RgbColor = Srgb::new(0, 0, 0);

/// Temperature (in hundreds of Kelvin) where the red/green/blue curves switch branches.
const BRANCH_POINT: f64 = 66.0;

/// Below this temperature (in hundreds of Kelvin) blue is fully off.
const BLUE_CUTOFF: f64 = 19.0;

/// Damping for the yellow range, which otherwise looks too green on the strip.
const GREEN_ATTENUATION: f64 = 0.75;

/// Temperature offset (hundreds of Kelvin) where brightness reaches zero.
const BRIGHTNESS_OFFSET: f64 = 6.59;

/// Temperature span (hundreds of Kelvin) over which brightness ramps to full.
const BRIGHTNESS_SPAN: f64 = 35.0;

/// Exponent shaping the brightness ramp.
const BRIGHTNESS_GAMMA: f64 = 0.2;

/// Returns the strip color for a blackbody at `kelvin`.
///
/// Channels are truncated to integers after clamping, then scaled by
/// [`brightness`] and truncated again.
pub fn color_for_temperature(kelvin: f64) -> RgbColor {
    let hue = hue_for_temperature(kelvin);
    let level = brightness(kelvin);

    Srgb::new(
        dim(hue.red, level),
        dim(hue.green, level),
        dim(hue.blue, level),
    )
}

/// Returns the undimmed hue for a blackbody at `kelvin`.
pub fn hue_for_temperature(kelvin: f64) -> RgbColor {
    let t = kelvin / 100.0;

    let red = if t <= BRANCH_POINT {
        255
    } else {
        channel(329.698727446 * pow(t - 60.0, -0.1332047592))
    };

    let green = if t <= BRANCH_POINT {
        channel(GREEN_ATTENUATION * (99.4708025861 * log(t) - 161.1195681661))
    } else {
        channel(288.1221695283 * pow(t - 60.0, -0.0755148492))
    };

    let blue = if t >= BRANCH_POINT {
        255
    } else if t <= BLUE_CUTOFF {
        0
    } else {
        channel(138.5177312231 * log(t - 10.0) - 305.0447927307)
    };

    Srgb::new(red, green, blue)
}

/// Brightness factor in `[0, 1]` for a blackbody at `kelvin`.
///
/// Zero at and below roughly 659 K, where the ramp base turns negative.
pub fn brightness(kelvin: f64) -> f64 {
    let base = (kelvin / 100.0 - BRIGHTNESS_OFFSET) / BRIGHTNESS_SPAN;
    if base.is_nan() || base <= 0.0 {
        return 0.0;
    }
    pow(base, BRIGHTNESS_GAMMA).clamp(0.0, 1.0)
}

/// Clamps to the 8-bit range and truncates. NaN maps to zero.
#[inline]
fn channel(value: f64) -> u8 {
    value.clamp(0.0, 255.0) as u8
}

#[inline]
fn dim(value: u8, level: f64) -> u8 {
    (f64::from(value) * level) as u8
}

//! Small numeric helpers shared by every subsystem. Pure functions, no state.

use rand::Rng;

/// Clamp `v` into `[lo, hi]`.
///
/// Never panics when `lo > hi`; the lower bound wins.
pub fn clamp(v: f32, lo: f32, hi: f32) -> f32 {
    lo.max(hi.min(v))
}

/// Linear interpolation from `a` to `b` by `t`.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Uniform value in `[a, b)`.  Safe for `a == b` (returns `a`).
pub fn rand_range<R: Rng + ?Sized>(rng: &mut R, a: f32, b: f32) -> f32 {
    a + rng.gen::<f32>() * (b - a)
}

/// Circle–circle overlap using squared distances (touching counts as a hit).
pub fn circle_hit(ax: f32, ay: f32, ar: f32, bx: f32, by: f32, br: f32) -> bool {
    let dx = ax - bx;
    let dy = ay - by;
    let reach = ar + br;
    dx * dx + dy * dy <= reach * reach
}

/// Position of element `i` in a symmetric fan of `n`, normalised to `[-1, 1]`.
/// A single element sits on the axis.
pub fn fan_offset(i: usize, n: usize) -> f32 {
    if n <= 1 {
        return 0.0;
    }
    let half = (n as f32 - 1.0) / 2.0;
    (i as f32 - half) / half
}

/// `mm:ss` for an elapsed duration in seconds (negative clamps to zero).
pub fn format_clock(seconds: f32) -> String {
    let total = seconds.max(0.0) as u32;
    format!("{:02}:{:02}", total / 60, total % 60)
}

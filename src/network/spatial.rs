//! Distance attenuation for 3D playback

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::SpatialConfig;
use crate::constants::DEFAULT_MAX_DISTANCE;

/// Linear falloff gain for `distance`
///
/// `1.0` at the emitter, `0.0` at `max_distance`, `None` beyond it (the
/// chunk is not sent at all). A range that is not a positive finite
/// number has no audible region, so every distance is out of range.
pub fn attenuation(distance: f32, max_distance: f32) -> Option<f32> {
    if !max_distance.is_finite() || max_distance <= 0.0 {
        return None;
    }
    if distance.is_nan() || distance > max_distance {
        return None;
    }
    Some((1.0 - distance / max_distance).clamp(0.0, 1.0))
}

/// Write `src` scaled by `gain` into `dest`, reusing its allocation
pub fn apply_gain(src: &[f32], gain: f32, dest: &mut Vec<f32>) {
    dest.clear();
    dest.extend(src.iter().map(|s| s * gain));
}

/// 3D settings of one network engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialSettings {
    /// Apply distance attenuation
    pub enabled: bool,
    /// Distance at which the stream becomes silent
    pub max_distance: f32,
    /// World position of the emitter
    pub emitter_position: Vec3,
    /// Snap the emitter to the listener every tick
    pub follow_listener: bool,
}

impl SpatialSettings {
    /// Non-spatial delivery
    pub fn flat() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn from_config(config: &SpatialConfig, enabled: bool) -> Self {
        Self {
            enabled,
            max_distance: config.max_distance,
            emitter_position: Vec3::ZERO,
            follow_listener: config.follow_listener,
        }
    }

    /// Gain for a listener at `listener_position`, `None` if out of range
    pub fn gain_at(&self, listener_position: Vec3) -> Option<f32> {
        let distance = self.emitter_position.distance(listener_position);
        attenuation(distance, self.max_distance)
    }
}

impl Default for SpatialSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_distance: DEFAULT_MAX_DISTANCE,
            emitter_position: Vec3::ZERO,
            follow_listener: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_attenuation_boundaries() {
        assert_eq!(attenuation(0.0, 50.0), Some(1.0));
        assert_eq!(attenuation(50.0, 50.0), Some(0.0));
        assert_eq!(attenuation(50.001, 50.0), None);
        assert_relative_eq!(attenuation(25.0, 50.0).unwrap(), 0.5);
        assert_eq!(attenuation(f32::NAN, 50.0), None);
    }

    #[test]
    fn test_degenerate_range_is_out_of_range() {
        assert_eq!(attenuation(0.0, 0.0), None);
        assert_eq!(attenuation(0.0, -5.0), None);
        assert_eq!(attenuation(1.0, f32::NAN), None);
        assert_eq!(attenuation(1.0, f32::INFINITY), None);

        let settings = SpatialSettings {
            max_distance: 0.0,
            ..SpatialSettings::default()
        };
        assert!(settings.gain_at(Vec3::ZERO).is_none());
    }

    #[test]
    fn test_gain_uses_euclidean_distance() {
        let settings = SpatialSettings {
            emitter_position: Vec3::new(1.0, 2.0, 3.0),
            max_distance: 10.0,
            ..SpatialSettings::default()
        };
        // 3-4-5 triangle in the xy plane
        let gain = settings.gain_at(Vec3::new(4.0, 6.0, 3.0)).unwrap();
        assert_relative_eq!(gain, 0.5);
        assert!(settings.gain_at(Vec3::new(20.0, 2.0, 3.0)).is_none());
    }

    #[test]
    fn test_apply_gain_reuses_destination() {
        let mut dest = Vec::with_capacity(8);
        apply_gain(&[1.0, -0.5], 0.5, &mut dest);
        assert_eq!(dest, vec![0.5, -0.25]);
        apply_gain(&[1.0], 0.0, &mut dest);
        assert_eq!(dest, vec![0.0]);
    }

    proptest! {
        #[test]
        fn attenuation_is_monotonic_and_bounded(a in 0.0f32..100.0, b in 0.0f32..100.0, max in 1.0f32..100.0) {
            let (near, far) = if a <= b { (a, b) } else { (b, a) };
            match (attenuation(near, max), attenuation(far, max)) {
                (Some(g_near), Some(g_far)) => {
                    prop_assert!((0.0..=1.0).contains(&g_near));
                    prop_assert!(g_near >= g_far);
                }
                (Some(_), None) => prop_assert!(far > max),
                (None, None) => prop_assert!(near > max),
                (None, Some(_)) => prop_assert!(false, "nearer distance was culled"),
            }
        }
    }
}

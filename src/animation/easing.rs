use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    EaseInQuad,
    #[default]
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInOutSine,
    EaseOutExpo,
    EaseInOutExpo,
}

impl Easing {
    /// Maps linear time `t` in `[0, 1]` onto eased progress.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - f64::powi(-2.0 * t + 2.0, 2) / 2.0
                }
            }
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => 1.0 - f64::powi(1.0 - t, 3),
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - f64::powi(-2.0 * t + 2.0, 3) / 2.0
                }
            }
            Easing::EaseInOutSine => -(f64::cos(std::f64::consts::PI * t) - 1.0) / 2.0,
            Easing::EaseOutExpo => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - f64::powf(2.0, -10.0 * t)
                }
            }
            Easing::EaseInOutExpo => {
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else if t < 0.5 {
                    f64::powf(2.0, 20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - f64::powf(2.0, -20.0 * t + 10.0)) / 2.0
                }
            }
        }
    }
}

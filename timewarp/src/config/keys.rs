//! In-memory key/value surface over [`Config`], e.g. for console commands.

use std::str::FromStr;

use super::{Config, ConfigError};

#[derive(Clone, Copy)]
enum Range {
    Any,
    NonNegative,
    Unit,
}

impl Range {
    fn contains(self, value: f32) -> bool {
        match self {
            Range::Any => true,
            Range::NonNegative => value >= 0.0,
            Range::Unit => (0.0..=1.0).contains(&value),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Range::Any => "any number",
            Range::NonNegative => "a non-negative number",
            Range::Unit => "a number within 0..=1",
        }
    }
}

impl Config {
    pub const KEYS: &'static [&'static str] = &[
        "warp.mode",
        "warp.point",
        "warp.timewarp_mode",
        "warp.rotation",
        "warp.translation",
        "warp.require_depth_for_translation",
        "warp.after_ui",
        "warp.max_yaw_deg",
        "warp.max_pitch_deg",
        "warp.max_roll_deg",
        "warp.max_translation",
        "present.enabled",
        "present.target_fps",
        "present.freeze",
        "present.max_cache_age_ms",
        "present.allow_hud_stable",
        "present.reproject_movement",
        "present.hud_mask_threshold",
        "auto.min_refresh_delta_hz",
        "auto.fps_window_ms",
        "auto.max_fps_std_dev",
        "auto.max_warp_deg",
        "auto.max_translation",
        "input.enabled",
        "input.yaw_deg_per_unit",
        "input.pitch_deg_per_unit",
        "debug.overlay",
        "debug.freeze_warp",
        "debug.refresh_hz_override",
    ];

    /// Parses `value` and assigns it to the option named `key`.
    ///
    /// On error the configuration is left untouched.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();

        match key {
            "warp.mode" => {
                self.warp.mode = parse_enum(key, value, "off, on or auto")?;
            }
            "warp.point" => {
                self.warp.point = parse_enum(
                    key,
                    value,
                    "end-of-post-process or post-render-view-family",
                )?;
            }
            "warp.timewarp_mode" => {
                self.warp.timewarp_mode = parse_enum(
                    key,
                    value,
                    "full-render, freeze-and-warp, decimated-no-warp or \
                     decimated-and-warp",
                )?;
            }
            "warp.rotation" => {
                self.warp.rotation = parse_bool(key, value)?;
            }
            "warp.translation" => {
                self.warp.translation = parse_bool(key, value)?;
            }
            "warp.require_depth_for_translation" => {
                self.warp.require_depth_for_translation =
                    parse_bool(key, value)?;
            }
            "warp.after_ui" => {
                self.warp.after_ui = parse_bool(key, value)?;
            }
            "warp.max_yaw_deg" => {
                self.warp.max_yaw_deg =
                    parse_f32(key, value, Range::NonNegative)?;
            }
            "warp.max_pitch_deg" => {
                self.warp.max_pitch_deg =
                    parse_f32(key, value, Range::NonNegative)?;
            }
            "warp.max_roll_deg" => {
                self.warp.max_roll_deg =
                    parse_f32(key, value, Range::NonNegative)?;
            }
            "warp.max_translation" => {
                self.warp.max_translation =
                    parse_f32(key, value, Range::NonNegative)?;
            }
            "present.enabled" => {
                self.present.enabled = parse_bool(key, value)?;
            }
            "present.target_fps" => {
                self.present.target_fps =
                    parse_f32(key, value, Range::NonNegative)?;
            }
            "present.freeze" => {
                self.present.freeze = parse_bool(key, value)?;
            }
            "present.max_cache_age_ms" => {
                self.present.max_cache_age_ms =
                    parse_f32(key, value, Range::NonNegative)?;
            }
            "present.allow_hud_stable" => {
                self.present.allow_hud_stable = parse_bool(key, value)?;
            }
            "present.reproject_movement" => {
                self.present.reproject_movement = parse_bool(key, value)?;
            }
            "present.hud_mask_threshold" => {
                self.present.hud_mask_threshold =
                    parse_f32(key, value, Range::Unit)?;
            }
            "auto.min_refresh_delta_hz" => {
                self.auto.min_refresh_delta_hz =
                    parse_f32(key, value, Range::Any)?;
            }
            "auto.fps_window_ms" => {
                self.auto.fps_window_ms =
                    parse_f32(key, value, Range::NonNegative)?;
            }
            "auto.max_fps_std_dev" => {
                self.auto.max_fps_std_dev =
                    parse_f32(key, value, Range::NonNegative)?;
            }
            "auto.max_warp_deg" => {
                self.auto.max_warp_deg =
                    parse_f32(key, value, Range::NonNegative)?;
            }
            "auto.max_translation" => {
                self.auto.max_translation =
                    parse_f32(key, value, Range::NonNegative)?;
            }
            "input.enabled" => {
                self.input.enabled = parse_bool(key, value)?;
            }
            "input.yaw_deg_per_unit" => {
                self.input.yaw_deg_per_unit =
                    parse_f32(key, value, Range::Any)?;
            }
            "input.pitch_deg_per_unit" => {
                self.input.pitch_deg_per_unit =
                    parse_f32(key, value, Range::Any)?;
            }
            "debug.overlay" => {
                self.debug.overlay = parse_bool(key, value)?;
            }
            "debug.freeze_warp" => {
                self.debug.freeze_warp = parse_bool(key, value)?;
            }
            "debug.refresh_hz_override" => {
                self.debug.refresh_hz_override =
                    parse_f32(key, value, Range::NonNegative)?;
            }
            _ => {
                return Err(ConfigError::UnknownKey(key.to_owned()));
            }
        }

        Ok(())
    }

    /// Returns the current value of the option named `key`, formatted the
    /// way [`Config::set()`] accepts it.
    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        let value = match key {
            "warp.mode" => self.warp.mode.to_string(),
            "warp.point" => self.warp.point.to_string(),
            "warp.timewarp_mode" => self.warp.timewarp_mode.to_string(),
            "warp.rotation" => self.warp.rotation.to_string(),
            "warp.translation" => self.warp.translation.to_string(),
            "warp.require_depth_for_translation" => {
                self.warp.require_depth_for_translation.to_string()
            }
            "warp.after_ui" => self.warp.after_ui.to_string(),
            "warp.max_yaw_deg" => self.warp.max_yaw_deg.to_string(),
            "warp.max_pitch_deg" => self.warp.max_pitch_deg.to_string(),
            "warp.max_roll_deg" => self.warp.max_roll_deg.to_string(),
            "warp.max_translation" => self.warp.max_translation.to_string(),
            "present.enabled" => self.present.enabled.to_string(),
            "present.target_fps" => self.present.target_fps.to_string(),
            "present.freeze" => self.present.freeze.to_string(),
            "present.max_cache_age_ms" => {
                self.present.max_cache_age_ms.to_string()
            }
            "present.allow_hud_stable" => {
                self.present.allow_hud_stable.to_string()
            }
            "present.reproject_movement" => {
                self.present.reproject_movement.to_string()
            }
            "present.hud_mask_threshold" => {
                self.present.hud_mask_threshold.to_string()
            }
            "auto.min_refresh_delta_hz" => {
                self.auto.min_refresh_delta_hz.to_string()
            }
            "auto.fps_window_ms" => self.auto.fps_window_ms.to_string(),
            "auto.max_fps_std_dev" => self.auto.max_fps_std_dev.to_string(),
            "auto.max_warp_deg" => self.auto.max_warp_deg.to_string(),
            "auto.max_translation" => self.auto.max_translation.to_string(),
            "input.enabled" => self.input.enabled.to_string(),
            "input.yaw_deg_per_unit" => {
                self.input.yaw_deg_per_unit.to_string()
            }
            "input.pitch_deg_per_unit" => {
                self.input.pitch_deg_per_unit.to_string()
            }
            "debug.overlay" => self.debug.overlay.to_string(),
            "debug.freeze_warp" => self.debug.freeze_warp.to_string(),
            "debug.refresh_hz_override" => {
                self.debug.refresh_hz_override.to_string()
            }
            _ => return Err(ConfigError::UnknownKey(key.to_owned())),
        };

        Ok(value)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        _ => Err(invalid_value(key, value, "a boolean")),
    }
}

fn parse_f32(
    key: &str,
    value: &str,
    range: Range,
) -> Result<f32, ConfigError> {
    let parsed = value
        .parse::<f32>()
        .ok()
        .filter(|parsed| parsed.is_finite())
        .ok_or_else(|| invalid_value(key, value, "a finite number"))?;

    if !range.contains(parsed) {
        return Err(ConfigError::OutOfRange {
            key: key.to_owned(),
            value: value.to_owned(),
            range: range.describe(),
        });
    }

    Ok(parsed)
}

fn parse_enum<T>(
    key: &str,
    value: &str,
    expected: &'static str,
) -> Result<T, ConfigError>
where
    T: FromStr,
{
    value
        .parse()
        .map_err(|_| invalid_value(key, value, expected))
}

fn invalid_value(
    key: &str,
    value: &str,
    expected: &'static str,
) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_owned(),
        value: value.to_owned(),
        expected,
    }
}

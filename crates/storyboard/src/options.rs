//! Option tables for the cinematographic tags. Segments store the bare value;
//! values outside these tables are kept as-is.

pub const SHOT_SIZES: &[(&str, &str)] = &[
    ("ECU", "ECU: Extreme Close Up"),
    ("CU", "CU: Close Up"),
    ("MCU", "MCU: Medium Close Up"),
    ("MS", "MS: Medium Shot"),
    ("FS", "FS: Full Shot"),
    ("MLS", "MLS: Medium Long Shot"),
    ("LS", "LS: Long Shot"),
    ("WS", "WS: Wide Shot"),
    ("ELS", "ELS: Extreme Long Shot"),
    ("Two Shot", "Two Shot"),
    ("Single", "Single"),
    ("OTS", "OTS: Over The Shoulder"),
];

pub const SHOT_TYPES: &[(&str, &str)] = &[
    ("EL", "EL: Eye Level"),
    ("HA", "HA: High Angle"),
    ("LA", "LA: Low Angle"),
    ("POV", "POV: Point of View"),
    ("Top", "Bird's Eye View"),
    ("Dutch", "Dutch Angle"),
    ("Ground", "Ground Level"),
    ("ES", "ES: Establishing Shot"),
];

pub const CAMERA_MOTIONS: &[(&str, &str)] = &[
    ("Pan", "Pan"),
    ("Tilt", "Tilt"),
    ("Dolly In", "Dolly In"),
    ("Dolly Out", "Dolly Out"),
    ("Tracking", "Tracking"),
    ("Crane", "Crane"),
    ("Arc Shot", "Arc Shot"),
    ("Steadicam", "Steadicam"),
    ("Static", "Static"),
    ("Zoom", "Zoom"),
    ("Dolly Zoom", "Dolly Zoom"),
    ("Handheld", "Handheld"),
    ("POV Shot", "POV Shot"),
    ("Aerial", "Aerial"),
    ("Whip Pan", "Whip Pan"),
    ("Time-lapse", "Time-lapse"),
    ("Creeping Dolly", "Creeping Dolly"),
];

/// Display label for `value`, if it is one of the known options.
pub fn option_label(options: &[(&'static str, &'static str)], value: &str) -> Option<&'static str> {
    options
        .iter()
        .find(|(v, _)| *v == value)
        .map(|(_, label)| *label)
}

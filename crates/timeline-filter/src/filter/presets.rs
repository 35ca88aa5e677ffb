//! Built-in forensic filter presets.
//!
//! Each preset is an ordinary query. Presets only use the `ANY` field so they
//! apply to every export layout.

use strsim::levenshtein;

use super::error::{FilterError, FilterResult};

/// Maximum Levenshtein distance to consider a preset name as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// A named, pre-built filter query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    /// Name used on the command line.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// The query text.
    pub query: &'static str,
}

/// The preset catalog.
pub const PRESETS: &[Preset] = &[
    Preset {
        name: "prefetch",
        description: "Windows Prefetch execution artifacts",
        query: r#"ANY iregex "\\prefetch\\|\.pf\b""#,
    },
    Preset {
        name: "lnk",
        description: "Shortcut (LNK) files and jump lists",
        query: r#"ANY iregex "\.lnk\b|automaticdestinations|customdestinations""#,
    },
    Preset {
        name: "usb",
        description: "USB device connection traces",
        query: r#"ANY iregex "usbstor|\\enum\\usb\\|vid_[0-9a-f]{4}""#,
    },
    Preset {
        name: "run-keys",
        description: "Registry Run / RunOnce autostart keys",
        query: r#"ANY iregex "\\currentversion\\run(once)?\b""#,
    },
    Preset {
        name: "services",
        description: "Service installation and configuration",
        query: r#"ANY iregex "\\currentcontrolset\\services\\|event_identifier\W+7045\b""#,
    },
    Preset {
        name: "scheduled-tasks",
        description: "Scheduled task definitions and executions",
        query: r#"ANY iregex "\\windows\\tasks\\|\\system32\\tasks\\|schtasks|\.job\b""#,
    },
    Preset {
        name: "logons",
        description: "Logon, logoff and credential events",
        query: r#"ANY iregex "event_identifier\W+(4624|4625|4634|4647|4648|4672)\b""#,
    },
    Preset {
        name: "browser",
        description: "Web browser history and cache",
        query: r#"ANY iregex "chrome|firefox|msie|webcache|edge history|safari""#,
    },
    Preset {
        name: "shellbags",
        description: "Shell bag folder access records",
        query: r#"ANY iregex "shell_?bags?|bagmru""#,
    },
];

/// Looks up a preset by name, case-insensitively.
///
/// # Errors
///
/// Returns `FilterError::UnknownPreset`, with the closest name as a
/// suggestion when one is near enough.
pub fn find_preset(name: &str) -> FilterResult<&'static Preset> {
    if let Some(preset) = PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name)) {
        return Ok(preset);
    }

    let name_lower = name.to_lowercase();
    let suggestion = PRESETS
        .iter()
        .map(|p| (p.name, levenshtein(&name_lower, p.name)))
        .min_by_key(|(_, distance)| *distance)
        .filter(|(_, distance)| *distance <= MAX_SUGGESTION_DISTANCE)
        .map(|(name, _)| name.to_string());

    Err(FilterError::UnknownPreset {
        name: name.to_string(),
        suggestion,
    })
}

//! Visual theme presets a form can pick from

/// A named visual preset for a form's header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePreset {
    pub id: &'static str,
    pub label: &'static str,
    /// Header background hint
    pub header: &'static str,
    /// Accent (title) color hint
    pub accent: &'static str,
    pub is_dark: bool,
}

pub const THEME_PRESETS: [ThemePreset; 5] = [
    ThemePreset {
        id: "professional-white",
        label: "Professional White",
        header: "#ffffff",
        accent: "#18181b",
        is_dark: false,
    },
    ThemePreset {
        id: "light-purple",
        label: "Soft Lavender",
        header: "#f5f3ff",
        accent: "#6d28d9",
        is_dark: false,
    },
    ThemePreset {
        id: "light-blue",
        label: "Sky Professional",
        header: "#f0f9ff",
        accent: "#0369a1",
        is_dark: false,
    },
    ThemePreset {
        id: "light-green",
        label: "Mint Minimal",
        header: "#f0fdf4",
        accent: "#15803d",
        is_dark: false,
    },
    ThemePreset {
        id: "light-slate",
        label: "Slate Professional",
        header: "#f8fafc",
        accent: "#334155",
        is_dark: false,
    },
];

/// Preset assigned to new forms
pub const DEFAULT_THEME_ID: &str = "professional-white";

/// Resolve a preset id, falling back to the first preset
pub fn theme_by_id(id: Option<&str>) -> &'static ThemePreset {
    id.and_then(|id| THEME_PRESETS.iter().find(|preset| preset.id == id))
        .unwrap_or(&THEME_PRESETS[0])
}

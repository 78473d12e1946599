use std::process::Command;

const GNOME_INTERFACE_SCHEMA: &str = "org.gnome.desktop.interface";

/// One-shot probe of the desktop's color-scheme preference.
///
/// Checks `GTK_THEME`, then the GNOME `color-scheme` key, then the GNOME
/// `gtk-theme` name. Returns `None` when no source gives an answer.
pub fn detect_prefers_dark() -> Option<bool> {
    if let Some(prefers_dark) = std::env::var("GTK_THEME")
        .ok()
        .and_then(|name| prefers_dark_from_theme_name(&name))
    {
        tracing::debug!(prefers_dark, "color scheme from GTK_THEME");
        return Some(prefers_dark);
    }

    if let Some(prefers_dark) =
        gsettings_value("color-scheme").and_then(|raw| prefers_dark_from_color_scheme(&raw))
    {
        tracing::debug!(prefers_dark, "color scheme from gsettings color-scheme");
        return Some(prefers_dark);
    }

    let prefers_dark =
        gsettings_value("gtk-theme").and_then(|raw| prefers_dark_from_theme_name(&raw))?;
    tracing::debug!(prefers_dark, "color scheme from gsettings gtk-theme");
    Some(prefers_dark)
}

fn gsettings_value(key: &str) -> Option<String> {
    let output = Command::new("gsettings")
        .args(["get", GNOME_INTERFACE_SCHEMA, key])
        .output()
        .map_err(|err| tracing::trace!(?err, key, "gsettings unavailable"))
        .ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn prefers_dark_from_color_scheme(raw: &str) -> Option<bool> {
    match raw.trim().trim_matches('\'') {
        "prefer-dark" => Some(true),
        "prefer-light" => Some(false),
        _ => None,
    }
}

fn prefers_dark_from_theme_name(theme_name: &str) -> Option<bool> {
    let normalized = theme_name.trim().trim_matches('\'').to_ascii_lowercase();
    if normalized.is_empty() {
        return None;
    }
    if normalized.contains("dark") {
        return Some(true);
    }
    if normalized.contains("light") {
        return Some(false);
    }
    None
}

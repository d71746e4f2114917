use ratatui::style::Color;

use crate::model::UiConfig;
use crate::model::agent::AgentTaskStatus;
use crate::model::issue::IssueStatus;

/// Parsed color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    /// Titles, the cursor bar and the active field
    pub primary: Color,
    pub muted: Color,
    pub dim: Color,
    pub border: Color,
    pub selection_bg: Color,
    /// Remote numbers and file references
    pub accent: Color,
    pub red: Color,
    pub green: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Rgb(0x1A, 0x18, 0x16),
            text: Color::Rgb(0xD4, 0xC5, 0xB0),
            text_bright: Color::Rgb(0xF4, 0xED, 0xE4),
            primary: Color::Rgb(0xD9, 0x77, 0x06),
            muted: Color::Rgb(0xA1, 0x8F, 0x7A),
            dim: Color::Rgb(0x6B, 0x62, 0x5A),
            border: Color::Rgb(0x3D, 0x38, 0x32),
            selection_bg: Color::Rgb(0x2D, 0x27, 0x22),
            accent: Color::Rgb(0xCC, 0x9B, 0x6D),
            red: Color::Rgb(0xE0, 0x52, 0x52),
            green: Color::Rgb(0x7F, 0xB0, 0x69),
        }
    }
}

/// Parse a hex color string like "#FF4444" into an RGB Color
fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

impl Theme {
    /// Create a theme from project UI config, falling back to defaults
    pub fn from_config(ui: &UiConfig) -> Self {
        let mut theme = Theme::default();

        for (key, value) in &ui.colors {
            let Some(color) = parse_hex_color(value) else {
                tracing::warn!(key = %key, value = %value, "ignoring invalid color");
                continue;
            };
            match key.as_str() {
                "background" => theme.background = color,
                "text" => theme.text = color,
                "text_bright" => theme.text_bright = color,
                "primary" => theme.primary = color,
                "muted" => theme.muted = color,
                "dim" => theme.dim = color,
                "border" => theme.border = color,
                "selection_bg" => theme.selection_bg = color,
                "accent" => theme.accent = color,
                "red" => theme.red = color,
                "green" => theme.green = color,
                _ => {}
            }
        }

        theme
    }

    pub fn issue_status_color(&self, status: IssueStatus) -> Color {
        match status {
            IssueStatus::Open => self.text,
            IssueStatus::Closed => self.dim,
        }
    }

    pub fn agent_status_color(&self, status: AgentTaskStatus) -> Color {
        match status {
            AgentTaskStatus::Draft => self.muted,
            AgentTaskStatus::InProgress => self.primary,
            AgentTaskStatus::Completed => self.green,
            AgentTaskStatus::Failed => self.red,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(
            parse_hex_color("#D97706"),
            Some(Color::Rgb(0xD9, 0x77, 0x06))
        );
        assert_eq!(parse_hex_color("#1a1816"), Some(Color::Rgb(0x1A, 0x18, 0x16)));
        assert_eq!(parse_hex_color("D97706"), None); // missing #
        assert_eq!(parse_hex_color("#D977"), None); // too short
        assert_eq!(parse_hex_color("#ZZZZZZ"), None); // invalid hex
    }

    #[test]
    fn test_from_config_overrides() {
        let mut ui = UiConfig::default();
        ui.colors.insert("background".into(), "#000000".into());
        ui.colors.insert("primary".into(), "not-a-color".into());

        let theme = Theme::from_config(&ui);
        assert_eq!(theme.background, Color::Rgb(0, 0, 0));
        // Invalid and unchanged entries keep their defaults
        assert_eq!(theme.primary, Color::Rgb(0xD9, 0x77, 0x06));
        assert_eq!(theme.text, Color::Rgb(0xD4, 0xC5, 0xB0));
    }

    #[test]
    fn test_status_colors() {
        let theme = Theme::default();
        assert_eq!(theme.issue_status_color(IssueStatus::Closed), theme.dim);
        assert_eq!(
            theme.agent_status_color(AgentTaskStatus::Failed),
            theme.red
        );
        assert_eq!(
            theme.agent_status_color(AgentTaskStatus::InProgress),
            theme.primary
        );
    }
}

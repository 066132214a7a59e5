//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::{EntityStatus, GroupStatus, UptimeStat};

/// Uptime at or above this percentage is shown as degraded rather than failing.
const DEGRADED_UPTIME: u8 = 50;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for partially healthy groups and degraded uptime.
    pub warning: Color,
    /// Color for offline entities.
    pub critical: Color,
    /// Color for online entities.
    pub healthy: Color,
    /// Color for entities that have not been checked yet.
    pub unknown: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            unknown: Color::Gray,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            unknown: Color::DarkGray,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        // Use terminal-light crate to detect background luminance
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Get style for a single entity's status
    pub fn status_style(&self, status: EntityStatus) -> Style {
        match status {
            EntityStatus::Up => Style::default().fg(self.healthy),
            EntityStatus::Down => Style::default().fg(self.critical).add_modifier(Modifier::BOLD),
            EntityStatus::Unknown => Style::default().fg(self.unknown),
        }
    }

    /// Get style for a group of entities
    pub fn group_style(&self, status: GroupStatus) -> Style {
        match status {
            GroupStatus::AllUp => Style::default().fg(self.healthy),
            GroupStatus::Partial => Style::default().fg(self.warning),
            GroupStatus::AllDown => {
                Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
            }
            GroupStatus::Checking => Style::default().fg(self.unknown),
        }
    }

    /// Get style for an uptime percentage
    pub fn uptime_style(&self, stat: &UptimeStat) -> Style {
        if stat.total == 0 {
            Style::default().fg(self.unknown)
        } else if stat.uptime_percent == 100 {
            Style::default().fg(self.healthy)
        } else if stat.uptime_percent >= DEGRADED_UPTIME {
            Style::default().fg(self.warning)
        } else {
            Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
        }
    }
}

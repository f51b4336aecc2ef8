//! TUI color theme
//!
//! HUD-inspired base palette plus per-protocol and per-direction accents

use ratatui::style::Color;

use crate::domain::{Direction, Protocol};

// HUD color scheme
pub const HUD_GREEN: Color = Color::Rgb(0, 255, 0);
pub const CRITICAL_RED: Color = Color::Rgb(255, 0, 0);
pub const CAUTION_AMBER: Color = Color::Rgb(255, 191, 0);
pub const INFO_DIM: Color = Color::Rgb(0, 180, 0);
pub const SEPARATOR: Color = Color::Rgb(90, 86, 224);
pub const INTERFACE: Color = Color::Rgb(255, 0, 255);

const TCP: Color = Color::Rgb(255, 107, 107);
const UDP: Color = Color::Rgb(78, 205, 196);
const ICMP: Color = Color::Rgb(255, 190, 11);
const OTHER: Color = Color::Rgb(173, 181, 189);

#[must_use]
pub fn protocol_color(protocol: Protocol) -> Color {
    match protocol {
        Protocol::TCP => TCP,
        Protocol::UDP => UDP,
        Protocol::ICMPV4 | Protocol::ICMPV6 => ICMP,
        _ => OTHER,
    }
}

/// Ingress green, egress red
#[must_use]
pub fn direction_color(direction: Direction) -> Color {
    match direction {
        Direction::Ingress => HUD_GREEN,
        Direction::Egress => CRITICAL_RED,
    }
}

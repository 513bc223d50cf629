//! Style roles for terminal output
//!
//! Each logical role (header, producer line, conservation result, ...) maps to
//! an optional `colored::Color`. Colouring only happens when the caller passes
//! `enabled = true`, so there is no global colour state to manage.
//!
//! ```
//! use prodcons::core::styles::StyleRole;
//! assert_eq!(StyleRole::Producer.paint("Producer-1", false), "Producer-1");
//! assert!(StyleRole::Producer.paint("Producer-1", true).starts_with("\x1b["));
//! ```

use clap::builder::styling::AnsiColor;
use colored::Color;

macro_rules! style {
    ( $( $variant:ident => $color:expr ),+ $(,)? ) => {
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        pub enum StyleRole { $( $variant ),+ }

        impl StyleRole {
            pub fn color(self) -> Option<Color> {
                match self { $( StyleRole::$variant => $color ),+ }
            }
        }
    }
}

style! {
    Header   => Some(Color::Yellow),
    Producer => Some(Color::Cyan),
    Consumer => Some(Color::Magenta),
    Queue    => Some(Color::Blue),
    Good     => Some(Color::Green),
    Bad      => Some(Color::BrightRed),
    Warning  => Some(Color::BrightYellow),
    Value    => None,
    Dim      => Some(Color::BrightBlack),
}

impl StyleRole {
    /// Wrap `text` in the role's foreground colour when `enabled`
    pub fn paint(self, text: &str, enabled: bool) -> String {
        match self.color() {
            Some(color) if enabled => format!("\x1b[{}m{}\x1b[0m", color.to_fg_str(), text),
            _ => text.to_string(),
        }
    }

    /// prettytable `style_spec` for the role's foreground colour
    pub fn to_prettytable_spec(self) -> Option<&'static str> {
        Some(match self.color()? {
            Color::Yellow => "Fy",
            Color::Cyan => "Fc",
            Color::Magenta => "Fm",
            Color::Blue => "Fb",
            Color::Green => "Fg",
            Color::BrightRed => "FR",
            Color::BrightYellow => "FY",
            Color::BrightBlack => "FK",
            _ => return None,
        })
    }
}

fn color_to_ansi(c: Color) -> Option<AnsiColor> {
    Some(match c {
        Color::Yellow => AnsiColor::Yellow,
        Color::Cyan => AnsiColor::Cyan,
        Color::Magenta => AnsiColor::Magenta,
        Color::Blue => AnsiColor::Blue,
        Color::Green => AnsiColor::Green,
        Color::BrightRed => AnsiColor::BrightRed,
        Color::BrightYellow => AnsiColor::BrightYellow,
        Color::BrightBlack => AnsiColor::BrightBlack,
        _ => return None,
    })
}

/// clap help styles built from the same roles
pub fn palette_to_clap(enabled: bool) -> clap::builder::Styles {
    use clap::builder::styling::{Color as ClapColor, Style};
    if !enabled {
        return clap::builder::Styles::plain();
    }

    let style = |role: StyleRole, bold: bool| {
        let mut s = Style::new();
        if let Some(col) = role.color().and_then(color_to_ansi) {
            s = s.fg_color(Some(ClapColor::Ansi(col)));
        }
        if bold {
            s = s.bold();
        }
        s
    };

    clap::builder::Styles::styled()
        .header(style(StyleRole::Header, true))
        .usage(style(StyleRole::Header, true))
        .literal(style(StyleRole::Producer, false))
        .placeholder(style(StyleRole::Good, false))
        .valid(style(StyleRole::Good, false))
        .invalid(style(StyleRole::Bad, false))
        .error(style(StyleRole::Bad, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paint_enabled_disabled() {
        let colored = StyleRole::Header.paint("Summary", true);
        assert_eq!(colored, "\x1b[33mSummary\x1b[0m");
        assert_eq!(StyleRole::Header.paint("Summary", false), "Summary");
    }

    #[test]
    fn uncoloured_role_is_plain() {
        assert_eq!(StyleRole::Value.paint("42", true), "42");
        assert!(StyleRole::Value.to_prettytable_spec().is_none());
    }

    #[test]
    fn prettytable_specs() {
        assert_eq!(StyleRole::Good.to_prettytable_spec(), Some("Fg"));
        assert_eq!(StyleRole::Bad.to_prettytable_spec(), Some("FR"));
        assert_eq!(StyleRole::Dim.to_prettytable_spec(), Some("FK"));
    }

    #[test]
    fn palette_to_clap_differs_when_enabled() {
        let plain_dbg = format!("{:?}", palette_to_clap(false));
        let styled_dbg = format!("{:?}", palette_to_clap(true));
        assert_ne!(plain_dbg, styled_dbg);
    }
}

use anstyle::{AnsiColor, Color, Style};

fn bold(color: AnsiColor) -> Style {
    Style::new()
        .bold()
        .fg_color(Some(Color::Ansi(color)))
}

pub fn styles() -> clap::builder::Styles {
    clap::builder::Styles::styled()
        .usage(bold(AnsiColor::Green))
        .header(bold(AnsiColor::Green))
        .literal(bold(AnsiColor::Cyan))
        .invalid(bold(AnsiColor::Red))
        .error(bold(AnsiColor::Red))
        .valid(bold(AnsiColor::Green))
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
}

/// Prefix style for console reports
pub fn label(color: AnsiColor) -> Style {
    bold(color)
}

/// Right-aligned green label followed by the message, cargo style
#[macro_export]
macro_rules! success_ok {
    ($label:expr, $message:expr) => {
        println!(
            "{}{:>12}{} {}",
            $crate::style::label($crate::anstyle::AnsiColor::Green),
            $label,
            $crate::anstyle::Reset.render(),
            $message
        )
    };
    ($label:expr, $message:expr, $($arg:tt)*) => {
        $crate::success_ok!($label, format!($message, $($arg)*))
    };
}

#[macro_export]
macro_rules! success_err {
    ($message:expr) => {
        eprintln!(
            "{}error:{} {}",
            $crate::style::label($crate::anstyle::AnsiColor::Red),
            $crate::anstyle::Reset.render(),
            $message
        )
    };
    ($message:expr, $($arg:tt)*) => {
        $crate::success_err!(format!($message, $($arg)*))
    };
}

#[macro_export]
macro_rules! success_warn {
    ($message:expr) => {
        eprintln!(
            "{}warning:{} {}",
            $crate::style::label($crate::anstyle::AnsiColor::Yellow),
            $crate::anstyle::Reset.render(),
            $message
        )
    };
    ($message:expr, $($arg:tt)*) => {
        $crate::success_warn!(format!($message, $($arg)*))
    };
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_bold_and_colored() {
        let style = label(AnsiColor::Green);
        assert!(style.get_effects().contains(anstyle::Effects::BOLD));
        assert_eq!(style.get_fg_color(), Some(Color::Ansi(AnsiColor::Green)));
    }

    #[test]
    fn macros_expand_through_crate_reexport() {
        crate::success_ok!("Allocated", "tun0");
        crate::success_ok!("Allocated", "{} on fd {}", "tun0", 3);
        crate::success_err!("no such device");
        crate::success_err!("failed: {}", "busy");
        crate::success_warn!("ignoring {}", "vpn0");
    }
}

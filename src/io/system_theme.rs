use crate::model::config::AppConfig;
use crate::ops::theme::ThemeMode;

/// What "follow system" currently resolves to.
///
/// An explicit `[ui] system_theme` in config.toml wins; otherwise the
/// terminal's `COLORFGBG` background decides; otherwise dark.
pub fn detect(config: &AppConfig) -> ThemeMode {
    detect_with(config, std::env::var("COLORFGBG").ok().as_deref())
}

pub fn detect_with(config: &AppConfig, colorfgbg: Option<&str>) -> ThemeMode {
    config
        .ui
        .system_theme
        .or_else(|| colorfgbg.and_then(mode_from_colorfgbg))
        .unwrap_or(ThemeMode::Dark)
}

/// `COLORFGBG` is `fg;bg` (sometimes `fg;default;bg`). ANSI backgrounds 7
/// and 9-15 are light.
fn mode_from_colorfgbg(value: &str) -> Option<ThemeMode> {
    let bg: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    Some(match bg {
        7 | 9..=15 => ThemeMode::Light,
        _ => ThemeMode::Dark,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_overrides_terminal() {
        let mut config = AppConfig::default();
        config.ui.system_theme = Some(ThemeMode::Light);
        assert_eq!(detect_with(&config, Some("15;0")), ThemeMode::Light);
    }

    #[test]
    fn colorfgbg_background() {
        let config = AppConfig::default();
        assert_eq!(detect_with(&config, Some("0;15")), ThemeMode::Light);
        assert_eq!(detect_with(&config, Some("15;0")), ThemeMode::Dark);
        assert_eq!(detect_with(&config, Some("0;default;7")), ThemeMode::Light);
        assert_eq!(detect_with(&config, Some("garbage")), ThemeMode::Dark);
    }

    #[test]
    fn defaults_to_dark() {
        assert_eq!(detect_with(&AppConfig::default(), None), ThemeMode::Dark);
    }
}

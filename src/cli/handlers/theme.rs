use log::info;

use crate::cli::commands::{ThemeAction, ThemeArgs};
use crate::cli::handlers::Context;
use crate::cli::output::ThemeJson;
use crate::io::lock::FileLock;
use crate::io::store::DirStore;
use crate::io::system_theme;
use crate::ops::theme::ThemeManager;

pub fn cmd_theme(
    args: ThemeArgs,
    json: bool,
    ctx: &Context,
) -> Result<(), Box<dyn std::error::Error>> {
    let _lock = match args.action {
        ThemeAction::Toggle => Some(FileLock::acquire_default(&ctx.data_dir)?),
        ThemeAction::Show => None,
    };
    let store = DirStore::open(&ctx.data_dir)?;
    let mut themes = ThemeManager::load(Box::new(store), system_theme::detect(&ctx.config));

    if args.action == ThemeAction::Toggle {
        let mode = themes.toggle();
        info!("event=cli_theme_toggle theme={}", mode);
    }

    if json {
        let out = ThemeJson {
            effective: themes.effective().to_string(),
            system: themes.system().to_string(),
            explicit: themes.explicit().map(|m| m.to_string()),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        let source = match themes.explicit() {
            Some(_) => "explicit",
            None => "following system",
        };
        println!("{} ({})", themes.effective(), source);
    }
    Ok(())
}

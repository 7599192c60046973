//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

/// TOML view of the config plus the data file it resolves to.
fn format_config(cfg: &Config, global: &GlobalOpts) -> Result<String, CliError> {
    let body = toml::to_string_pretty(cfg)?;
    Ok(format!(
        "{}\n# resolved data file: {}",
        body.trim_end(),
        config::data_file(global, cfg).display()
    ))
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            let text = format_config(&cfg, global)?;
            let out = output::render_single(&global.output_format(), &cfg, |_| text.clone(), |_| {
                "config".into()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            let path = config::config_path(global);
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let path = config::config_path(global);
            let mut cfg = config::load_file_config(&path)?;
            config::set_value(&mut cfg, &key, &value)?;
            config::save_config_to(&cfg, &path)?;

            let color = output::should_color(&global.color_mode());
            output::status(
                &format!("Set {key} in {}", path.display()),
                global.quiet,
                color,
            );
            Ok(())
        }
    }
}

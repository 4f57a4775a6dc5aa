//! Config subcommand handlers.

use std::io::BufRead;

use secrecy::SecretString;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

fn redacted(mut cfg: Config) -> Config {
    if cfg.controller.community.is_some() {
        cfg.controller.community = Some(REDACTED.into());
    }
    cfg
}

fn render_toml(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("# failed to render config: {e}"))
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = redacted(config::load(global)?);
            let rendered = match global.output {
                OutputFormat::Table => render_toml(&cfg),
                format => output::render_single(format, &cfg, render_toml)?,
            };
            output::print_output(rendered.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(
                &config::active_config_path(global).display().to_string(),
                global.quiet,
            );
            Ok(())
        }

        ConfigCommand::Init { force } => {
            let path = config::active_config_path(global);
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }

            let mut cfg = Config::default();
            config::apply_overrides(&mut cfg, global)?;
            cfg.controller.community.clone_from(&global.community);
            cfg.validate()?;
            config::save_config_to(&path, &cfg)?;

            if !global.quiet {
                eprintln!("Wrote {}", path.display());
            }
            Ok(())
        }

        ConfigCommand::SetCommunity => {
            let cfg = config::load(global)?;

            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            let community = line.trim_end_matches(['\r', '\n']);
            if community.is_empty() {
                return Err(CliError::Validation {
                    field: "community".into(),
                    reason: "no community read from stdin".into(),
                });
            }

            config::store_community(
                &cfg.controller.host,
                &SecretString::from(community.to_owned()),
            )?;
            if !global.quiet {
                eprintln!("Community stored in keyring for {}", cfg.controller.host);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_never_prints_the_community() {
        let mut cfg = Config::default();
        cfg.controller.community = Some("s3cret".into());
        let text = render_toml(&redacted(cfg));
        assert!(!text.contains("s3cret"));
        assert!(text.contains(REDACTED));
    }

    #[test]
    fn absent_community_stays_absent() {
        let cfg = redacted(Config::default());
        assert_eq!(cfg.controller.community, None);
    }
}

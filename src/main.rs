use anyhow::{bail, Context};
use metaads_theme::config::{AppConfig, ConfigDirs};
use metaads_theme::{open_store, ManualColorScheme, Preference, ThemeController};

const USAGE: &str = "usage: metaads-theme [--json] [--prefers-dark | --prefers-light] [get | set <light|dark|system> | toggle]";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Help,
    Get,
    Set(Preference),
    Toggle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliArgs {
    command: Command,
    prefers_dark: Option<bool>,
    json: bool,
}

impl CliArgs {
    fn parse<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<Self> {
        let mut prefers_dark = None;
        let mut json = false;
        let mut help = false;
        let mut positional = Vec::new();
        for arg in args {
            match arg.as_str() {
                "--prefers-dark" => prefers_dark = Some(true),
                "--prefers-light" => prefers_dark = Some(false),
                "--json" => json = true,
                "-h" | "--help" => help = true,
                flag if flag.starts_with("--") => bail!("unknown flag {flag}\n{USAGE}"),
                _ => positional.push(arg),
            }
        }

        let command = match positional.as_slice() {
            _ if help => Command::Help,
            [] => Command::Get,
            [cmd] if cmd == "get" => Command::Get,
            [cmd] if cmd == "toggle" => Command::Toggle,
            [cmd, value] if cmd == "set" => Command::Set(
                value
                    .parse::<Preference>()
                    .with_context(|| format!("cannot set theme to {value:?}"))?,
            ),
            _ => bail!("unrecognized arguments {positional:?}\n{USAGE}"),
        };

        Ok(Self {
            command,
            prefers_dark,
            json,
        })
    }
}

fn main() -> anyhow::Result<()> {
    let dirs = ConfigDirs::from_env();
    let config = AppConfig::load_from(&dirs);
    metaads_theme::logging::init(config.log_filter.as_deref());

    let args = CliArgs::parse(std::env::args().skip(1))?;
    if args.command == Command::Help {
        println!("{USAGE}");
        return Ok(());
    }

    let store = open_store(&config, &dirs).context("failed to open preference store")?;
    let source = match args.prefers_dark {
        Some(prefers_dark) => ManualColorScheme::new(prefers_dark),
        None => ManualColorScheme::detect(),
    };

    let controller = ThemeController::new(store, &source);
    match args.command {
        Command::Help | Command::Get => {}
        Command::Set(preference) => controller.set_preference(preference),
        Command::Toggle => {
            controller.toggle();
        }
    }

    let snapshot = controller.snapshot();
    if args.json {
        println!(
            "{}",
            serde_json::to_string(&snapshot).context("failed to encode theme state")?
        );
    } else {
        println!("{snapshot}");
    }
    controller.teardown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<CliArgs> {
        CliArgs::parse(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn no_arguments_defaults_to_get() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.command, Command::Get);
        assert_eq!(args.prefers_dark, None);
    }

    #[test]
    fn set_parses_preference_tag() {
        let args = parse(&["--prefers-dark", "set", "system"]).unwrap();
        assert_eq!(args.command, Command::Set(Preference::System));
        assert_eq!(args.prefers_dark, Some(true));
    }

    #[test]
    fn set_rejects_invalid_tag() {
        let err = parse(&["set", "blue"]).unwrap_err();
        assert!(err.to_string().contains("blue"));
    }

    #[test]
    fn unknown_command_is_usage_error() {
        assert!(parse(&["flip"]).is_err());
        assert!(parse(&["--verbose"]).is_err());
    }

    #[test]
    fn help_flag_is_not_an_error() {
        let args = parse(&["set", "dark", "--help"]).unwrap();
        assert_eq!(args.command, Command::Help);
    }

    #[test]
    fn json_flag_is_recorded() {
        let args = parse(&["--json", "get"]).unwrap();
        assert_eq!(args.command, Command::Get);
        assert!(args.json);
    }

    #[test]
    fn toggle_accepts_light_override() {
        let args = parse(&["toggle", "--prefers-light"]).unwrap();
        assert_eq!(args.command, Command::Toggle);
        assert_eq!(args.prefers_dark, Some(false));
    }
}

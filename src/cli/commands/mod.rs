use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ArgAction, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("pasejo")
        .about("Edge gatekeeper: authentication gates, trusted hosts and channel authorization")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("PASEJO_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("app-url")
                .short('u')
                .long("app-url")
                .help("Application base URL, used for redirects and host trust")
                .default_value("http://localhost:8080")
                .env("PASEJO_APP_URL"),
        )
        .arg(
            Arg::new("home")
                .long("home")
                .help("Path authenticated users are redirected to")
                .default_value("/dashboard")
                .env("PASEJO_HOME"),
        )
        .arg(
            Arg::new("trusted-host")
                .long("trusted-host")
                .help("Additional trusted Host pattern, repeatable (e.g. *.example.com)")
                .env("PASEJO_TRUSTED_HOST")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("rate-limit")
                .long("rate-limit")
                .help("Requests per minute allowed by the api rate-limit policy")
                .default_value("60")
                .env("PASEJO_RATE_LIMIT")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("PASEJO_LOG_LEVEL")
                .global(true)
                .action(ArgAction::Count)
                .value_parser(validator_log_level()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "pasejo");
        assert_eq!(
            command.get_version().unwrap().to_string(),
            env!("CARGO_PKG_VERSION")
        );
    }

    #[test]
    fn test_defaults() {
        temp_env::with_vars(
            [
                ("PASEJO_PORT", None::<String>),
                ("PASEJO_APP_URL", None),
                ("PASEJO_HOME", None),
                ("PASEJO_TRUSTED_HOST", None),
                ("PASEJO_RATE_LIMIT", None),
            ],
            || {
                let command = new();
                let matches = command.get_matches_from(vec!["pasejo"]);

                assert_eq!(matches.get_one::<u16>("port").copied(), Some(8080));
                assert_eq!(
                    matches.get_one::<String>("app-url").map(String::as_str),
                    Some("http://localhost:8080")
                );
                assert_eq!(
                    matches.get_one::<String>("home").map(String::as_str),
                    Some("/dashboard")
                );
                assert_eq!(matches.get_one::<u32>("rate-limit").copied(), Some(60));
                assert_eq!(
                    matches
                        .get_many::<String>("trusted-host")
                        .map(|hosts| hosts.count()),
                    None
                );
            },
        );
    }

    #[test]
    fn test_check_flags() {
        let command = new();
        let matches = command.get_matches_from(vec![
            "pasejo",
            "--port",
            "8443",
            "--app-url",
            "https://pasejo.dev",
            "--home",
            "/home",
            "--trusted-host",
            "localhost",
            "--trusted-host",
            "*.pasejo.test",
            "--rate-limit",
            "10",
        ]);

        assert_eq!(matches.get_one::<u16>("port").copied(), Some(8443));
        assert_eq!(
            matches.get_one::<String>("app-url").map(String::as_str),
            Some("https://pasejo.dev")
        );
        assert_eq!(
            matches.get_one::<String>("home").map(String::as_str),
            Some("/home")
        );
        assert_eq!(matches.get_one::<u32>("rate-limit").copied(), Some(10));

        let hosts: Vec<_> = matches
            .get_many::<String>("trusted-host")
            .unwrap()
            .map(String::as_str)
            .collect();
        assert_eq!(hosts, ["localhost", "*.pasejo.test"]);
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("PASEJO_PORT", Some("443")),
                ("PASEJO_APP_URL", Some("https://pasejo.dev")),
                ("PASEJO_HOME", Some("/panel")),
                ("PASEJO_TRUSTED_HOST", Some("*.pasejo.dev")),
                ("PASEJO_LOG_LEVEL", Some("info")),
            ],
            || {
                let command = new();
                let matches = command.get_matches_from(vec!["pasejo"]);
                assert_eq!(matches.get_one::<u16>("port").copied(), Some(443));
                assert_eq!(
                    matches.get_one::<String>("app-url").map(String::as_str),
                    Some("https://pasejo.dev")
                );
                assert_eq!(
                    matches.get_one::<String>("home").map(String::as_str),
                    Some("/panel")
                );
                assert_eq!(matches.get_one::<u8>("verbosity").copied(), Some(2));
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("PASEJO_LOG_LEVEL", Some(level))], || {
                let command = new();
                let matches = command.get_matches_from(vec!["pasejo"]);
                assert_eq!(
                    matches.get_one::<u8>("verbosity").copied(),
                    Some(index as u8)
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        // loop cover all possible value_parse
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, _) in levels.iter().enumerate() {
            temp_env::with_vars([("PASEJO_LOG_LEVEL", None::<String>)], || {
                let mut args = vec!["pasejo".to_string()];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    let v = format!("-{}", "v".repeat(index));
                    args.push(v);
                }

                let command = new();

                let matches = command.get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>("verbosity").copied(),
                    Some(index as u8)
                );
            });
        }
    }
}

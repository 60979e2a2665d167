use crate::cli::actions::Action;
use anyhow::Result;

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    Ok(Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        app_url: matches
            .get_one("app-url")
            .map(|s: &String| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --app-url"))?,
        home: matches
            .get_one("home")
            .map(|s: &String| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --home"))?,
        trusted_hosts: matches
            .get_many::<String>("trusted-host")
            .map(|hosts| hosts.cloned().collect())
            .unwrap_or_default(),
        rate_limit: matches.get_one::<u32>("rate-limit").copied().unwrap_or(60),
    })
}

use crate::api;
use crate::cli::actions::Action;
use crate::config::AppConfig;
use anyhow::Result;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            app_url,
            home,
            trusted_hosts,
            rate_limit,
        } => {
            let config = AppConfig::new(&app_url)?
                .with_home_path(home)
                .with_trusted_hosts(trusted_hosts)
                .with_api_rate_limit_per_minute(rate_limit);

            api::new(port, config).await?;
        }
    }

    Ok(())
}

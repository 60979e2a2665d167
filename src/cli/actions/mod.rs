pub mod server;

#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        app_url: String,
        home: String,
        trusted_hosts: Vec<String>,
        rate_limit: u32,
    },
}

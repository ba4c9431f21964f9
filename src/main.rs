mod concurrency;
mod config;
mod http;
mod users;

use config::ServerConfig;
use http::server::Server;
use std::process::ExitCode;
use std::sync::Arc;
use users::store::UserStore;

fn run() -> anyhow::Result<()> {
    let store = Arc::new(UserStore::seeded());
    log::info!("seeded store with {} users", store.len());

    let mut server = Server::from_config(ServerConfig::default())?;
    users::register_routes(&mut server, store)?;

    server.run()
}

fn main() -> ExitCode {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("server stopped: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

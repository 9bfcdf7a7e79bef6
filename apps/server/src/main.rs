#![warn(clippy::all, clippy::pedantic)]

use std::net::SocketAddr;

use actix_web::{App, HttpServer, web};
use checker::{CheckHandler, CheckerConfig};
use clap::Parser;
use tracing::{debug, info};

mod cli;
mod error;
mod routes;
mod state;

use cli::Args;
use error::AppError;
use logger::init_tracing;
use state::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    let mut config = CheckerConfig::from_config(args.config.as_ref())?;
    args.apply(&mut config);
    debug!("{config}");

    let handler = CheckHandler::from_config(&config)?;
    let state = AppState::new(handler, config.secret.clone());

    let addr = bind_address(&config)?;
    info!(%addr, region = %config.region.name, forwarding = config.forwarding_enabled(), "starting checker server");
    run_server(addr, state).await?;

    Ok(())
}

fn bind_address(config: &CheckerConfig) -> Result<SocketAddr, AppError> {
    Ok(format!("{}:{}", config.server.bind, config.server.port).parse()?)
}

async fn run_server(addr: SocketAddr, state: AppState) -> Result<(), AppError> {
    let state = web::Data::new(state);

    HttpServer::new(move || App::new().app_data(state.clone()).configure(routes::routes))
        .bind(addr)?
        .run()
        .await?;

    Ok(())
}

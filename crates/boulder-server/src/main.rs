// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Boulder identity-provisioning server binary.

use std::sync::Arc;
use std::time::Duration;

use boulder_common_http::RetryConfig;
use boulder_provisioning_core::{Reconciler, ResourceProvider};
use boulder_server::{create_router, AppState};
use boulder_server_db::UserRepository;
use boulder_server_platform::{
	cloud_controller_providers, CloudControllerConfig, UaaConfig, UaaIdentityClient,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod version;

/// Boulder server - user provisioning over UAA and the cloud controller.
#[derive(Parser, Debug)]
#[command(name = "boulder-server", about = "Boulder identity-provisioning server", version)]
struct Args {
	/// Path to a TOML config file (defaults to /etc/boulder/server.toml)
	#[arg(long)]
	config: Option<std::path::PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version information
	Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	// Load .env file if present
	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => boulder_server_config::load_config_with_file(path)?,
		None => boulder_server_config::load_config()?,
	};

	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.with(tracing_subscriber::fmt::layer())
		.init();

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		"starting boulder-server"
	);

	let pool = boulder_server_db::create_pool(&config.database.url).await?;
	boulder_server_db::run_migrations(&pool).await?;
	let store = Arc::new(UserRepository::new(pool.clone()));

	let platform = config.platform.clone().ok_or(
		"platform endpoints are not configured; set BOULDER_SERVER_PLATFORM_UAA_URL and BOULDER_SERVER_PLATFORM_CAPI_URL",
	)?;
	let request_timeout = Duration::from_secs(platform.request_timeout_secs);

	let identity = Arc::new(UaaIdentityClient::new(UaaConfig {
		base_url: platform.uaa_url.clone(),
		client_id: platform.uaa_client_id,
		client_secret: platform.uaa_client_secret,
		request_timeout,
	}));
	let (orgs, spaces) = cloud_controller_providers(CloudControllerConfig {
		base_url: platform.capi_url,
		uaa_url: platform.uaa_url,
		username: platform.capi_username,
		password: platform.capi_password,
		request_timeout,
	});

	let reconciler = Arc::new(Reconciler::new(
		Arc::clone(&store),
		identity as Arc<dyn ResourceProvider>,
		Arc::new(orgs) as Arc<dyn ResourceProvider>,
		Arc::new(spaces) as Arc<dyn ResourceProvider>,
	));

	let state = AppState {
		pool,
		store,
		reconciler,
		default_password: config.provisioning.default_password.clone(),
		default_keep_alive: config.provisioning.keep_alive.clone(),
		retry: RetryConfig {
			max_attempts: config.provisioning.retry_attempts,
			..RetryConfig::default()
		},
	};

	if config.provisioning.sweep_enabled {
		let interval = Duration::from_secs(config.provisioning.sweep_interval_secs);
		boulder_server::sweep::spawn_sweep(state.clone(), interval);
		tracing::info!(interval_secs = config.provisioning.sweep_interval_secs, "reconciliation sweep scheduled");
	}

	let app = create_router(state);
	let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
	tracing::info!(addr = %listener.local_addr()?, "listening");
	axum::serve(listener, app).await?;

	Ok(())
}

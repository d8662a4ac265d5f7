use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use client_core::{
    AppController, ControllerOptions, ControllerSnapshot, HttpBackend, UserNotice,
};
use shared::domain::{Cuisine, RestaurantDraft, RestaurantRecord};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, ClientSettings};

#[derive(Parser, Debug)]
#[command(name = "owner_console", about = "Manage your restaurants from the terminal")]
struct Args {
    /// Path to a TOML settings file (defaults to ./client.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    backend_url: Option<String>,
    /// Print restaurants as JSON instead of a table.
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(ClapArgs, Debug)]
struct Credentials {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Probe the backend and report the resolved screen.
    Status,
    /// Sign in and list your restaurants.
    List {
        #[command(flatten)]
        credentials: Credentials,
    },
    /// Sign in and add a restaurant.
    Create {
        #[command(flatten)]
        credentials: Credentials,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value_t = Cuisine::Italian)]
        cuisine: Cuisine,
    },
    /// Sign in with the demo account and list its restaurants.
    Demo,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(url) = args.backend_url.clone() {
        settings.backend_url = url;
    }
    info!(
        app_id = %settings.app_id,
        backend_url = %settings.backend_url,
        "owner_console: starting"
    );

    let backend = HttpBackend::new(
        &settings.backend_url,
        &settings.app_id,
        settings.request_timeout(),
    )?;
    let controller = AppController::with_options(
        Arc::new(backend),
        ControllerOptions {
            probe_timeout: settings.probe_timeout(),
            page_size: settings.page_size,
        },
    );

    controller.start().await;
    print_header(&controller.snapshot().await, &settings);

    let result = run_command(&controller, args.command, args.json).await;
    if controller.identity().is_some() {
        controller.logout().await;
    }
    result
}

async fn run_command(controller: &AppController, command: Command, json: bool) -> Result<()> {
    match command {
        Command::Status => Ok(()),
        Command::List { credentials } => {
            sign_in(controller, &credentials.email, &credentials.password).await?;
            load_and_print(controller, json).await
        }
        Command::Create {
            credentials,
            name,
            description,
            cuisine,
        } => {
            sign_in(controller, &credentials.email, &credentials.password).await?;
            load_and_print(controller, json).await?;
            let draft = RestaurantDraft::new(name)
                .with_description(description)
                .with_cuisine(cuisine);
            let created = controller
                .create_restaurant(&draft)
                .await
                .map_err(|err| anyhow!("{} ({err})", UserNotice::create_failed(&err).message))?;
            println!("Created restaurant #{} '{}'", created.id, created.name);
            print_restaurants(&controller.restaurants().await, json)
        }
        Command::Demo => {
            let identity = controller
                .demo_login()
                .await
                .map_err(|err| anyhow!("{} ({err})", UserNotice::login_failed(&err).message))?;
            println!("Welcome, {}!", identity.name);
            load_and_print(controller, json).await
        }
    }
}

async fn sign_in(controller: &AppController, email: &str, password: &str) -> Result<()> {
    if controller.identity().is_some() {
        return Ok(());
    }
    let identity = controller
        .login(email, password)
        .await
        .map_err(|err| anyhow!("{} ({err})", UserNotice::login_failed(&err).message))?;
    println!("Welcome, {}!", identity.name);
    Ok(())
}

async fn load_and_print(controller: &AppController, json: bool) -> Result<()> {
    let records = controller
        .load_restaurants()
        .await
        .map_err(|err| anyhow!("{} ({err})", UserNotice::load_failed(&err).message))?;
    print_restaurants(&records, json)
}

fn print_header(snapshot: &ControllerSnapshot, settings: &ClientSettings) {
    let indicator = snapshot
        .connectivity
        .as_ref()
        .map(|status| status.indicator_label())
        .unwrap_or("API Unknown");
    println!("[{indicator}] screen={}", snapshot.screen.name());
    if let Some(cause) = snapshot
        .connectivity
        .as_ref()
        .and_then(|status| status.cause.as_ref())
    {
        println!("  cause: {cause}");
    }
    if let Some(identity) = &snapshot.identity {
        println!("  signed in as {} (id {})", identity.name, identity.id);
    }
    if let Ok(admin) = settings.admin_panel_url() {
        println!("  admin panel: {admin}");
    }
}

fn print_restaurants(records: &[RestaurantRecord], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }
    if records.is_empty() {
        println!("No restaurants found. Get started by adding a new restaurant.");
        return Ok(());
    }
    for record in records {
        println!(
            "#{:<5} {:<30} {:<9} {}",
            record.id,
            record.name,
            record.cuisine,
            record.created_at.format("%Y-%m-%d %H:%M")
        );
        if let Some(description) = &record.description {
            println!("       {description}");
        }
        if let Some(thumbnail) = record.photo.as_ref().and_then(|photo| photo.thumbnail_url()) {
            println!("       photo: {thumbnail}");
        }
    }
    Ok(())
}

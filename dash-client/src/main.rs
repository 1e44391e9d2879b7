use anyhow::{Context, Result};
use clap::Parser;
use k8s_openapi::serde_json;
use kube::{config::KubeConfigOptions, Client, Config};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use dash_client::config::DashConfig;
use dash_client::{
    setup_logger, shutdown_logger, DescribeContext, DescribeError, KubeStore,
    PortForwardRegistry,
};

mod cli;

use cli::CliArgs;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    let mut config =
        DashConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    args.apply(&mut config);

    setup_logger(
        &config.log_dir,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    )
    .map_err(|e| anyhow::anyhow!("failed to initialise logging: {e}"))?;
    info!(source = ?config.source, overview = ?config.overview, "configuration loaded");

    let result = run(&args, &config).await;
    if let Err(e) = &result {
        match e.downcast_ref::<DescribeError>() {
            Some(cause) => error!(status = cause.status_code(), "{e:#}"),
            None => error!("{e:#}"),
        }
    }
    shutdown_logger();
    result
}

async fn run(args: &CliArgs, config: &DashConfig) -> Result<()> {
    let registry = config
        .overview
        .build()
        .context("failed to build describer registry")?;

    if args.list {
        for describer in registry.walk() {
            println!("{}\t{}", describer.path(), describer.title());
        }
        return Ok(());
    }
    if args.navigation {
        println!("{}", serde_json::to_string_pretty(&registry.navigation())?);
        return Ok(());
    }

    let client = connect(config.context.clone()).await?;
    let store = KubeStore::new(client).with_sync_timeout(Duration::from_secs(config.sync_timeout_secs));
    let port_forwards = PortForwardRegistry::new();

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let mut ctx = DescribeContext::new(&store)
        .with_port_forwards(&port_forwards)
        .with_params(args.filter_params())
        .with_cancellation(cancel);
    if let Some(namespace) = &config.namespace {
        ctx = ctx.with_namespace(namespace.clone());
    }
    if let Some(name) = &args.name {
        ctx = ctx.with_object_name(name.clone());
    }

    let result = registry.describe(&args.path, &ctx).await;
    store.shutdown().await;

    let content = result.with_context(|| format!("failed to describe {}", args.path))?;
    println!("{}", serde_json::to_string_pretty(&content)?);
    Ok(())
}

async fn connect(context: Option<String>) -> Result<Client> {
    let options = KubeConfigOptions {
        context,
        cluster: None,
        user: None,
    };
    let config = Config::from_kubeconfig(&options)
        .await
        .context("failed to load kubeconfig")?;
    Client::try_from(config).context("failed to create kubernetes client")
}

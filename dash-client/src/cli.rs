use clap::Parser;
use std::path::PathBuf;

use dash_client::config::DashConfig;
use dash_client::processors::FilterParams;
use dash_client::Overview;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "dash",
    version,
    about = "Describe navigable views of a Kubernetes cluster."
)]
pub struct CliArgs {
    /// Path of the view to describe
    #[arg(default_value = "/")]
    pub path: String,

    /// Show a single object of the addressed resource view
    #[arg(long)]
    pub name: Option<String>,

    /// Namespace for namespaced views
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// kubeconfig context to use
    #[arg(long)]
    pub context: Option<String>,

    /// View composition to serve (cluster|namespace)
    #[arg(long)]
    pub overview: Option<Overview>,

    /// Comma-separated row filter, `!` negates a pattern
    #[arg(long)]
    pub filter: Option<String>,

    #[arg(long)]
    pub sort_by: Option<String>,

    /// asc or desc
    #[arg(long)]
    pub sort_order: Option<String>,

    /// Print every registered path and exit
    #[arg(long)]
    pub list: bool,

    /// Print the navigation tree as JSON and exit
    #[arg(long, conflicts_with = "list")]
    pub navigation: bool,

    /// Config file (defaults to $DASH_CONFIG, ./dash.yaml, ~/.config/dash/config.yaml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// tracing filter (for example: info,dash_client=debug)
    #[arg(long)]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Flags win over file values.
    pub fn apply(&self, config: &mut DashConfig) {
        if let Some(context) = &self.context {
            config.context = Some(context.clone());
        }
        if let Some(namespace) = &self.namespace {
            config.namespace = Some(namespace.clone());
        }
        if let Some(overview) = self.overview {
            config.overview = overview;
        }
        if let Some(log_dir) = &self.log_dir {
            config.log_dir = log_dir.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
    }

    pub fn filter_params(&self) -> FilterParams {
        FilterParams {
            sort_by: self.sort_by.clone(),
            sort_order: self.sort_order.clone(),
            filter: self.filter.clone(),
        }
    }
}

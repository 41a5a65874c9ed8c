use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::app::AppTarget;
use crate::config::ConfigOverrides;

#[derive(Parser, Debug)]
#[command(name = "service-runner", version)]
#[command(about = "Run an HTTP application object under a supervised, unprivileged process lifecycle", long_about = None)]
pub struct Cli {
    /// Application object to serve, as `<module>:<object>`.
    #[arg(value_name = "MODULE:OBJECT")]
    pub app: AppTarget,

    /// Address to listen on [default: 0.0.0.0].
    #[arg(long)]
    pub host: Option<IpAddr>,

    /// TCP port to listen on [default: 8000].
    #[arg(long)]
    pub port: Option<u16>,

    /// Non-privileged account to run as [default: appuser].
    #[arg(long)]
    pub user: Option<String>,

    /// TOML configuration file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Seconds in-flight requests get to finish after SIGTERM [default: 30].
    #[arg(long, value_name = "SECS")]
    pub grace_period: Option<u64>,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_file: self.config.clone(),
            app: Some(self.app.clone()),
            bind_host: self.host,
            bind_port: self.port,
            run_user: self.user.clone(),
            grace_period_secs: self.grace_period,
        }
    }
}

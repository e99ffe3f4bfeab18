use std::time::Duration;

use clap::Parser;
use gremlin_api::parse_go_duration;
use gremlin_observe::{LogFilter, LogFormat, LoggerConfig};

#[derive(Parser, Debug, Clone)]
#[command(name = "gremlin")]
#[command(version, about = "Resource load generator and diagnostics service", long_about = None)]
pub struct AgentConfig {
    /// HTTP listen address; `:8080` binds every interface
    #[arg(long, env = "GREMLIN_ADDR", default_value = ":8080")]
    pub addr: String,

    /// Log filter directives, e.g. `info` or `gremlin=debug,axum=warn`
    #[arg(long, env = "GREMLIN_LOG_LEVEL", default_value = LogFilter::DEFAULT)]
    pub log_level: LogFilter,

    /// Log output: text, json or journald
    #[arg(long, env = "GREMLIN_LOG_FORMAT", default_value = "text")]
    pub log_format: LogFormat,

    /// Session setup bound for /postgresql/connect
    #[arg(long, env = "GREMLIN_PG_CONNECT_TIMEOUT", default_value = "10s", value_parser = parse_go_duration)]
    pub pg_connect_timeout: Duration,

    /// Session setup bound before /postgresql/query runs the statement
    #[arg(long, env = "GREMLIN_PG_PING_TIMEOUT", default_value = "5s", value_parser = parse_go_duration)]
    pub pg_ping_timeout: Duration,
}

impl AgentConfig {
    /// Socket address to bind. A bare `:port` means all interfaces.
    pub fn listen_addr(&self) -> String {
        if self.addr.starts_with(':') {
            format!("0.0.0.0{}", self.addr)
        } else {
            self.addr.clone()
        }
    }

    pub fn logger(&self) -> LoggerConfig {
        LoggerConfig::new(self.log_format, self.log_level.clone())
    }
}

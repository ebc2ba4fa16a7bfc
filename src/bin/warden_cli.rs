use std::path::PathBuf;
use std::sync::Arc;
use structopt::StructOpt;

use warden::config::Config;
use warden::models::RequestContext;
use warden::persistence::SqliteStore;
use warden::{AnomalyDetector, AnomalyLogger, ReauthEnforcer, StatisticsReporter};

/// Session-integrity engine command line interface
#[derive(StructOpt, Debug)]
#[structopt(name = "warden", about = "Session anomaly detection CLI")]
pub enum Cli {
    /// Generate a default configuration file
    Config {
        /// Output path for the configuration file
        #[structopt(short, long, default_value = "config.toml")]
        output: PathBuf,
    },
    /// Evaluate one request against a session
    Check {
        /// Path to the session database
        #[structopt(short, long)]
        db: PathBuf,
        /// Session id to evaluate
        #[structopt(short, long)]
        session: String,
        /// Source address of the request
        #[structopt(long)]
        ip: String,
        /// Client signature (user agent) of the request
        #[structopt(long)]
        user_agent: String,
        /// Path to configuration file (defaults used when absent)
        #[structopt(short, long)]
        config: Option<PathBuf>,
    },
    /// Revoke a session and force re-authentication
    Revoke {
        /// Path to the session database
        #[structopt(short, long)]
        db: PathBuf,
        /// Session id to revoke
        #[structopt(short, long)]
        session: String,
        /// Reason recorded in the audit trail
        #[structopt(short, long, default_value = "manual revocation")]
        reason: String,
    },
    /// Summarize a user's anomaly history
    Stats {
        /// Path to the session database
        #[structopt(short, long)]
        db: PathBuf,
        /// User id to summarize
        #[structopt(short, long)]
        user: String,
        /// Trailing window in days
        #[structopt(long, default_value = "30")]
        days: i64,
    },
}

fn open_store(path: &PathBuf) -> Result<Arc<SqliteStore>, Box<dyn std::error::Error>> {
    Ok(Arc::new(SqliteStore::new(path)?))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();

    let cli = Cli::from_args();

    match cli {
        Cli::Config { output } => {
            let config = Config::default();
            config.to_file(&output)?;
            println!("Default configuration written to: {:?}", output);
        }
        Cli::Check {
            db,
            session,
            ip,
            user_agent,
            config,
        } => {
            let config = match config {
                Some(path) => Config::from_file(&path)?,
                None => Config::default(),
            };

            let store = open_store(&db)?;
            let logger = AnomalyLogger::new(
                store.clone(),
                store.clone(),
                store.clone(),
                config.detection.risk_thresholds,
            );
            let detector = AnomalyDetector::new(config.detection, store, logger);

            let ctx = RequestContext::new(ip, user_agent);
            let assessment = detector.check_session_anomaly(&session, &ctx);
            println!("{}", serde_json::to_string_pretty(&assessment)?);
        }
        Cli::Revoke {
            db,
            session,
            reason,
        } => {
            let store = open_store(&db)?;
            let enforcer = ReauthEnforcer::new(store.clone(), store.clone(), store);

            if enforcer.force_reauthentication(&session, &reason)? {
                println!("Session {} revoked", session);
            } else {
                eprintln!("Session not found: {}", session);
                std::process::exit(1);
            }
        }
        Cli::Stats { db, user, days } => {
            let store = open_store(&db)?;
            let reporter = StatisticsReporter::new(store);

            let stats = reporter.get_anomaly_statistics(&user, days);
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }

    Ok(())
}

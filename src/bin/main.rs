//! toydns binary entry point.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

use toydns::normalize::NormalizePolicy;
use toydns::services::{
    base::Base, cidr::Cidr, coin::Coin, dice::Dice, epoch::Epoch, fx::Fx, num2words::Num2Words,
    random::Random, timezones::Timezones, units::Units, uuid::Uuid,
};
use toydns::snapshot::{self, Snapshotter};
use toydns::{geo::Geo, telemetry, Config, HelpEntry, Registry, ToyServer};

/// DNS server that overloads TXT queries as a transport for small
/// lookup services (time, currency, units, dice and friends).
#[derive(Parser, Debug)]
#[command(name = "toydns")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML).
    #[arg(short, long, default_value = "toydns.toml")]
    config: PathBuf,
}

fn build_registry(config: &Config) -> Result<(Registry, Snapshotter), Box<dyn std::error::Error>> {
    let mut registry = Registry::new(config.server.domain.clone());
    let mut snapshotter = Snapshotter::new();
    let services = &config.services;

    if services.time.enabled {
        let geo_file = services
            .time
            .geo_file
            .as_ref()
            .ok_or("time service enabled without services.time.geo_file")?;
        info!(path = %geo_file.display(), "reading geo locations");
        let geo = Arc::new(Geo::from_file(geo_file)?);
        info!(count = geo.count(), "geo location names loaded");

        registry.register("time", Arc::new(Timezones::new(geo)), NormalizePolicy::narrow());
        registry.add_help(HelpEntry::new("get time for a city", "dig mumbai.time @{domain}"))?;
    }

    if services.fx.enabled {
        let fx = Fx::new();

        if let Some(path) = &services.fx.snapshot_file {
            match snapshot::load_file(path) {
                Ok(Some(bytes)) => {
                    if let Err(e) = fx.load(&bytes) {
                        warn!(path = %path.display(), error = %e, "error reading fx snapshot");
                    }
                }
                Ok(None) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "error reading fx snapshot"),
            }
            snapshotter.add("fx", path.clone(), fx.clone());
        }

        fx.start_refresh(Duration::from_secs(services.fx.refresh_interval_secs));

        registry.register("fx", fx, NormalizePolicy::broad());
        registry.add_help(HelpEntry::new("convert currency rates", "dig 99USD-INR.fx @{domain}"))?;
    }

    if services.ip.enabled {
        registry.enable_echo_ip();
        registry.add_help(HelpEntry::new("get your host's requesting IP.", "dig ip @{domain}"))?;
    }

    if services.unit.enabled {
        registry.register("unit", Arc::new(Units::new()), NormalizePolicy::broad());
        registry.add_help(HelpEntry::new("convert between units.", "dig 42km-cm.unit @{domain}"))?;
    }

    if services.words.enabled {
        registry.register("words", Arc::new(Num2Words::new()), NormalizePolicy::broad());
        registry.add_help(HelpEntry::new("convert numbers to words.", "dig 123456.words @{domain}"))?;
    }

    if services.cidr.enabled {
        registry.register("cidr", Arc::new(Cidr::new()), NormalizePolicy::broad());
        registry.add_help(HelpEntry::new(
            "convert cidr to ip range.",
            "dig 10.100.0.0/24.cidr @{domain}",
        ))?;
    }

    if services.pi.enabled {
        registry.enable_pi();
        registry.add_help(HelpEntry::new(
            "return digits of Pi as TXT or A or AAAA record.",
            "dig pi @{domain}",
        ))?;
    }

    if services.base.enabled {
        registry.register("base", Arc::new(Base::new()), NormalizePolicy::broad());
        registry.add_help(HelpEntry::new(
            "convert numbers from one base to another",
            "dig 100dec-hex.base @{domain}",
        ))?;
    }

    if services.dice.enabled {
        registry.register("dice", Arc::new(Dice::new()), NormalizePolicy::broad());
        registry.add_help(HelpEntry::new("roll dice", "dig 1d6.dice @{domain}"))?;
    }

    if services.rand.enabled {
        registry.register("rand", Arc::new(Random::new()), NormalizePolicy::broad());
        registry.add_help(HelpEntry::new("generate random numbers", "dig 1-100.rand @{domain}"))?;
    }

    if services.coin.enabled {
        registry.register("coin", Arc::new(Coin::new()), NormalizePolicy::broad());
        registry.add_help(HelpEntry::new("toss coin", "dig 2.coin @{domain}"))?;
    }

    if services.epoch.enabled {
        registry.register(
            "epoch",
            Arc::new(Epoch::new(services.epoch.send_local_time)),
            NormalizePolicy::broad(),
        );
        registry.add_help(HelpEntry::new(
            "convert epoch / UNIX time to human readable time.",
            "dig 784783800.epoch @{domain}",
        ))?;
    }

    if services.uuid.enabled {
        registry.register(
            "uuid",
            Arc::new(Uuid::new(services.uuid.max_results)),
            NormalizePolicy::broad(),
        );
        registry.add_help(HelpEntry::new("generate random uuids", "dig 5.uuid @{domain}"))?;
    }

    Ok((registry, snapshotter))
}

/// Flip the shutdown flag on SIGINT or SIGTERM; flush snapshots in
/// place on SIGHUP.
async fn signal_loop(tx: watch::Sender<bool>, snapshotter: Arc<Snapshotter>) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to install SIGTERM handler");
            return;
        }
    };
    let mut hup = match signal(SignalKind::hangup()) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to install SIGHUP handler");
            return;
        }
    };

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("received SIGINT");
                let _ = tx.send(true);
                return;
            }
            _ = term.recv() => {
                info!("received SIGTERM");
                let _ = tx.send(true);
                return;
            }
            _ = hup.recv() => {
                info!("received SIGHUP, flushing snapshots");
                snapshotter.save_all();
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration
    let config: Config = config::Config::builder()
        .add_source(config::File::from(args.config.clone()))
        .add_source(
            config::Environment::with_prefix("TOYDNS")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    // Initialize telemetry
    telemetry::init(&config.telemetry).map_err(|e| e as Box<dyn std::error::Error>)?;

    info!(
        config_file = %args.config.display(),
        listen_addr = %config.server.listen_addr,
        domain = %config.server.domain,
        "starting toydns"
    );

    let (registry, snapshotter) = build_registry(&config)?;
    let registry = Arc::new(registry);
    let snapshotter = Arc::new(snapshotter);

    // Setup graceful shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(signal_loop(shutdown_tx, Arc::clone(&snapshotter)));

    let server = ToyServer::new(config.server, registry, snapshotter);
    if let Err(e) = server.run(shutdown_rx).await {
        error!(error = %e, "DNS server error");
        return Err(e.into());
    }

    info!("toydns shutdown complete");
    Ok(())
}

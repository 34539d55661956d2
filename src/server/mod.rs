use std::io::IsTerminal;

use anyhow::{anyhow, Context};
use log::{info, warn};
use tokio::{
    select,
    signal::{unix, unix::SignalKind},
};

use crate::{
    interface::OBJECT_PATH,
    opts::{BusOpts, ServerOpts},
    Result,
};

pub mod bus;
pub mod dispatch;
pub mod host;
pub mod registration;

use bus::Bus;
use host::OutputHost;
use registration::Service;

async fn connect(opts: &BusOpts) -> Result<zbus::Connection> {
    let builder = if opts.system {
        zbus::connection::Builder::system()
    } else {
        zbus::connection::Builder::session()
    }
    .context("Error creating D-Bus connection builder")?;

    builder
        .name(opts.name.as_str())
        .with_context(|| format!("Invalid bus name {:?}", opts.name))?
        .build()
        .await
        .context("Error connecting to D-Bus")
}

pub async fn run(bus: BusOpts, opts: ServerOpts) -> Result {
    let ServerOpts {
        output,
        zero,
        unfocused,
    } = opts;

    let host = match output {
        Some(path) => OutputHost::append_to(&path, zero, !unfocused)?,
        None => OutputHost::stdout(zero, !unfocused),
    };

    let conn = connect(&bus).await?;
    let (bus, router) = Bus::new(conn);
    let mut router = tokio::spawn(router);

    let mut service =
        Service::activate(Some(bus.clone()), host).context("Error starting commit service")?;

    info!(
        "Serving {OBJECT_PATH} as {}",
        bus.connection()
            .unique_name()
            .map_or_else(|| "<unknown>".into(), ToString::to_string)
    );

    let mut hup = unix::signal(SignalKind::hangup()).context("Error hooking SIGHUP")?;
    let mut int = unix::signal(SignalKind::interrupt()).context("Error hooking SIGINT")?;
    let mut quit = unix::signal(SignalKind::quit()).context("Error hooking SIGQUIT")?;
    let mut term = unix::signal(SignalKind::terminate()).context("Error hooking SIGTERM")?;

    let res = select!(
        Some(()) = hup.recv() => Ok(()),
        Some(()) = int.recv() => {
            if std::io::stdin().is_terminal() && std::io::stderr().is_terminal() {
                eprintln!();
            }

            Ok(())
        },
        Some(()) = quit.recv() => Ok(()),
        Some(()) = term.recv() => Ok(()),
        res = &mut router => match res {
            Ok(()) => Err(anyhow!("Lost D-Bus connection")),
            Err(e) => Err(anyhow!("Message router panicked: {e:?}")),
        },
    );

    info!("Shutting down...");

    service.deactivate();
    router.abort();

    if let Err(e) = bus.connection().clone().close().await {
        warn!("Error closing D-Bus connection: {e}");
    }

    res
}

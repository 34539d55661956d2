use std::{future::Future, time::Duration};

use anyhow::Context;
use log::{info, warn};
use zbus::{connection, fdo::IntrospectableProxy};

use self::proxy::CommitStringProxy;
use crate::{
    interface::OBJECT_PATH,
    opts::{BusOpts, ClientCommand},
    timeout::Timeout,
    Result,
};

mod proxy;

fn limit(secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).with_context(|| format!("Invalid timeout {secs:?}"))
}

async fn connect(opts: &BusOpts) -> Result<zbus::Connection> {
    let builder = if opts.system {
        connection::Builder::system()
    } else {
        connection::Builder::session()
    }
    .context("Error creating D-Bus connection builder")?;

    builder.build().await.context("Error connecting to D-Bus")
}

pub async fn run(bus: BusOpts, cmd: ClientCommand) -> Result {
    let conn = connect(&bus).await?;

    match cmd {
        ClientCommand::Commit { text, timeout } => {
            let proxy = Timeout::new(
                CommitStringProxy::builder(&conn)
                    .destination(bus.name.as_str())
                    .context("Error setting commit proxy destination")?
                    .build()
                    .await
                    .context("Error building commit proxy")?,
                limit(timeout)?,
            );

            // Not retried, a timed-out commit may still have been applied
            try_send(&proxy, 0, |p| p.commit_string(&text)).await?;
        },
        ClientCommand::Introspect { timeout } => {
            let proxy = Timeout::new(
                IntrospectableProxy::builder(&conn)
                    .destination(bus.name.as_str())
                    .context("Error setting introspection proxy destination")?
                    .path(OBJECT_PATH)
                    .context("Error setting introspection proxy path")?
                    .build()
                    .await
                    .context("Error building introspection proxy")?,
                limit(timeout)?,
            );

            let xml = try_send(&proxy, 5, IntrospectableProxy::introspect).await?;
            println!("{xml}");
        },
    }

    Ok(())
}

async fn try_send<
    'a,
    T: 'a,
    F: Fn(&'a T) -> FR,
    FR: Future<Output = zbus::fdo::Result<R>> + 'a,
    R,
>(
    with: &'a Timeout<T>,
    retries: usize,
    call: F,
) -> Result<R> {
    let mut i = 0;

    loop {
        match with.try_run(&call).await {
            Err(e) if i < retries => warn!("Request failed: {e}"),
            r => break r.context("Unable to contact commit server"),
        }

        i += 1;
        info!("Retry attempt {i}");

        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

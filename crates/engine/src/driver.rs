// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Async driver interface.
//!
//! A [`DriverHandle`] sends events over a bounded channel to the
//! [`EventLoop`], which applies them to the registry in arrival order and
//! replies with the outcome. Handles are cheap to clone; many async tasks
//! can drive jobs concurrently while the registry still sees one writer.

use std::sync::Arc;

use scribe_core::{Clock, Event};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{EngineError, Registry};

struct Command {
    event: Event,
    reply: oneshot::Sender<Result<u64, EngineError>>,
}

#[derive(Clone)]
pub struct DriverHandle {
    tx: mpsc::Sender<Command>,
}

impl DriverHandle {
    /// Apply `event` and wait for the outcome. Returns the event's WAL seq.
    pub async fn send(&self, event: Event) -> Result<u64, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(Command { event, reply }).await.map_err(|_| EngineError::DriverClosed)?;
        rx.await.map_err(|_| EngineError::DriverClosed)?
    }
}

pub struct EventLoop<C: Clock> {
    registry: Arc<Registry<C>>,
    rx: mpsc::Receiver<Command>,
    shutdown: CancellationToken,
}

impl<C: Clock> EventLoop<C> {
    /// Create a loop over `registry` and a handle feeding it. `capacity`
    /// bounds queued events before senders wait.
    pub fn new(
        registry: Arc<Registry<C>>,
        capacity: usize,
        shutdown: CancellationToken,
    ) -> (Self, DriverHandle) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { registry, rx, shutdown }, DriverHandle { tx })
    }

    /// Apply events until the token is cancelled or every handle is
    /// dropped, then snapshot the registry.
    pub async fn run(mut self) -> Result<(), EngineError> {
        info!("driver loop started");
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    debug!("driver loop cancelled");
                    break;
                }
                command = self.rx.recv() => {
                    let Some(Command { event, reply }) = command else {
                        debug!("all driver handles dropped");
                        break;
                    };
                    let result = self.registry.apply(event);
                    if reply.send(result).is_err() {
                        warn!("driver dropped before reply");
                    }
                }
            }
        }
        // Commands still queued are answered with DriverClosed when dropped.
        self.rx.close();
        self.registry.shutdown()
    }
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;

//! Terminal event pump for the dashboard.
//!
//! A blocking thread polls crossterm and forwards key presses over a tokio
//! channel; poll timeouts become ticks that pace snapshot refresh and redraw.
//! Resize needs no dedicated event since every tick redraws the full frame.

use std::time::Duration;

use crossterm::event::{self, KeyEvent, KeyEventKind};
use eyre::Result;
use tokio::sync::mpsc;

/// Dashboard events
#[derive(Debug)]
pub enum Event {
    /// Key press (release and repeat events are filtered at the pump)
    Key(KeyEvent),
    /// Periodic refresh
    Tick,
}

/// Event pump for the dashboard
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Spawn the polling thread with the given tick rate
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        std::thread::spawn(move || {
            loop {
                let event = if event::poll(tick_rate).unwrap_or(false) {
                    match event::read() {
                        Ok(event::Event::Key(key)) if key.kind == KeyEventKind::Press => Event::Key(key),
                        Ok(_) => continue,
                        Err(_) => break,
                    }
                } else {
                    Event::Tick
                };

                if tx.send(event).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }

    /// Get the next event (async)
    pub async fn next(&mut self) -> Result<Event> {
        self.rx.recv().await.ok_or_else(|| eyre::eyre!("Event channel closed"))
    }
}

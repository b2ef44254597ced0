//! TUI runner - main loop that owns the terminal and polls the controller.
//!
//! Every tick it copies a fresh snapshot out of the controller and redraws;
//! key presses either quit or turn into arrival events on the inbox.

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use eyre::Result;
use tracing::{debug, warn};

use crate::controller::ControllerHandle;
use crate::domain::{LaneId, VehicleClass};
use crate::inbox::{ArrivalEvent, InboxError, InboxSender};

use super::Tui;
use super::events::{Event, EventHandler};
use super::views;

/// Refresh cadence for snapshot polling and redraw.
const TICK_RATE: Duration = Duration::from_millis(100);

/// TUI runner that manages the terminal and event loop.
pub struct TuiRunner {
    terminal: Tui,
    handle: ControllerHandle,
    sender: InboxSender,
    event_handler: EventHandler,
    /// Interactive arrivals count from 1, independent of the generator.
    next_user_id: u32,
    should_quit: bool,
}

impl TuiRunner {
    pub fn new(terminal: Tui, handle: ControllerHandle, sender: InboxSender) -> Self {
        Self {
            terminal,
            handle,
            sender,
            event_handler: EventHandler::new(TICK_RATE),
            next_user_id: 1,
            should_quit: false,
        }
    }

    /// Run the TUI main loop until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        let mut snapshot = self.handle.snapshot().await;

        loop {
            self.terminal.draw(|frame| views::render(&snapshot, frame))?;

            match self.event_handler.next().await? {
                Event::Tick => {
                    snapshot = self.handle.snapshot().await;
                }
                Event::Key(key_event) => {
                    self.handle_key(key_event);
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Handle a key press: quit keys, arrival keys, everything else ignored.
    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char(c @ '1'..='4') => {
                let lane = LaneId::ALL[(c as u8 - b'1') as usize];
                self.submit_arrival(lane, VehicleClass::Regular);
            }
            KeyCode::Char(c @ 'a'..='d') => {
                let lane = LaneId::ALL[(c as u8 - b'a') as usize];
                self.submit_arrival(lane, VehicleClass::Ambulance);
            }
            _ => {}
        }
    }

    fn submit_arrival(&mut self, lane: LaneId, class: VehicleClass) {
        let event = ArrivalEvent::new(self.next_user_id, lane, class);
        self.next_user_id += 1;

        match self.sender.enqueue(event) {
            Ok(()) => debug!(%lane, ?class, "interactive arrival submitted"),
            Err(InboxError::Full(id)) => warn!(id, "inbox full, interactive arrival dropped"),
            Err(InboxError::Closed) => self.should_quit = true,
        }
    }
}

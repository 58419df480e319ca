use std::thread;
use std::time::Duration;

use rusty_sudt_chain_core::WaitPort;

/// Wall-clock wait for the confirmation poller.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemWait;

impl WaitPort for SystemWait {
    fn wait(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::packet::MAX_FRAME;

// implementors own exactly one physical or simulated transceiver; an
// endpoint holds two (one per engine) so send and receive run concurrently
// without contending on one handle
pub trait RadioSocket: Send {
    // blocking transmit of a frame no larger than MAX_FRAME bytes
    fn send(&mut self, frame: &[u8]) -> io::Result<()>;

    // blocks for at most the current timeout, Err(TimedOut) on expiry
    fn recv(&mut self, max_len: usize) -> io::Result<Vec<u8>>;

    fn set_timeout(&mut self, timeout: Duration);

    // non-blocking recv returns immediately, WouldBlock if nothing is ready
    fn set_blocking(&mut self, blocking: bool);

    fn hardware_eui(&self) -> [u8; 8];
}

struct Shared {
    queue: Mutex<VecDeque<Vec<u8>>>,
    ready: Condvar,
}

// one end of an in-memory duplex link between two simulated nodes, not a
// hardware driver; stands in for one in tests and examples
pub struct ChannelRadio {
    eui: [u8; 8],
    inbox: Arc<Shared>,
    outbox: Arc<Shared>,
    timeout: Duration,
    blocking: bool,
    drop_next: Arc<Mutex<usize>>,
}

impl ChannelRadio {
    // two radios wired back-to-back: what `a` sends, `b` receives, and vice versa
    pub fn channel_pair(eui_a: [u8; 8], eui_b: [u8; 8]) -> (ChannelRadio, ChannelRadio) {
        let a_to_b = Arc::new(Shared {
            queue: Mutex::new(VecDeque::new()),
            ready: Condvar::new(),
        });
        let b_to_a = Arc::new(Shared {
            queue: Mutex::new(VecDeque::new()),
            ready: Condvar::new(),
        });

        let a = ChannelRadio {
            eui: eui_a,
            inbox: b_to_a.clone(),
            outbox: a_to_b.clone(),
            timeout: Duration::from_secs(5),
            blocking: true,
            drop_next: Arc::new(Mutex::new(0)),
        };
        let b = ChannelRadio {
            eui: eui_b,
            inbox: a_to_b,
            outbox: b_to_a,
            timeout: Duration::from_secs(5),
            blocking: true,
            drop_next: Arc::new(Mutex::new(0)),
        };
        (a, b)
    }

    // silently drop the next `n` frames this end would otherwise send,
    // simulating a lossy link for retry/timeout tests
    pub fn drop_next_sends(&self, n: usize) {
        *self.drop_next.lock().expect("drop_next mutex poisoned") = n;
    }
}

impl RadioSocket for ChannelRadio {
    fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        {
            let mut remaining = self.drop_next.lock().expect("drop_next mutex poisoned");
            if *remaining > 0 {
                *remaining -= 1;
                return Ok(());
            }
        }
        let mut queue = self.outbox.queue.lock().expect("queue mutex poisoned");
        queue.push_back(frame.to_vec());
        self.outbox.ready.notify_all();
        Ok(())
    }

    fn recv(&mut self, max_len: usize) -> io::Result<Vec<u8>> {
        let mut queue = self.inbox.queue.lock().expect("queue mutex poisoned");
        if queue.is_empty() {
            if !self.blocking {
                return Err(io::Error::new(io::ErrorKind::WouldBlock, "no frame ready"));
            }
            let deadline = Instant::now() + self.timeout;
            loop {
                let now = Instant::now();
                if now >= deadline {
                    return Err(io::Error::new(io::ErrorKind::TimedOut, "recv timed out"));
                }
                let (guard, result) = self
                    .inbox
                    .ready
                    .wait_timeout(queue, deadline - now)
                    .expect("condvar wait poisoned");
                queue = guard;
                if !queue.is_empty() {
                    break;
                }
                if result.timed_out() {
                    return Err(io::Error::new(io::ErrorKind::TimedOut, "recv timed out"));
                }
            }
        }
        let mut frame = queue.pop_front().expect("checked non-empty above");
        frame.truncate(max_len);
        Ok(frame)
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    fn set_blocking(&mut self, blocking: bool) {
        self.blocking = blocking;
    }

    fn hardware_eui(&self) -> [u8; 8] {
        self.eui
    }
}

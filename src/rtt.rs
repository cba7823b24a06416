use std::time::Duration;

const ALPHA: f64 = 0.875;
const BETA: f64 = 0.75;
const DEV_MULTIPLIER: f64 = 4.0;

// local to a single send_payload call. no sample yet, dev_rtt = 1.0; the
// 5.0s socket-level timeout for the first fragment is a separate baseline
// set by the sender engine, not by this estimator.
#[derive(Debug, Clone, Copy)]
pub struct RttEstimator {
    estimated_rtt: Option<f64>,
    dev_rtt: f64,
}

impl Default for RttEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl RttEstimator {
    pub fn new() -> Self {
        RttEstimator {
            estimated_rtt: None,
            dev_rtt: 1.0,
        }
    }

    pub fn sample(&mut self, sample_rtt: Duration) {
        let sample = sample_rtt.as_secs_f64();
        let estimated = match self.estimated_rtt {
            None => sample,
            Some(prev) => ALPHA * prev + (1.0 - ALPHA) * sample,
        };
        self.dev_rtt = BETA * self.dev_rtt + (1.0 - BETA) * (sample - estimated).abs();
        self.estimated_rtt = Some(estimated);
    }

    pub fn estimated_rtt(&self) -> Option<f64> {
        self.estimated_rtt
    }

    pub fn dev_rtt(&self) -> f64 {
        self.dev_rtt
    }

    // timeout for the next fragment's ACK wait, once a sample has been taken
    pub fn timeout(&self) -> Duration {
        let estimated = self.estimated_rtt.unwrap_or(1.0);
        Duration::from_secs_f64(estimated + DEV_MULTIPLIER * self.dev_rtt)
    }
}

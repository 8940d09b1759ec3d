use std::time::{Duration, Instant};

/// Source of simulation time, advanced one fixed tick at a time
pub trait Clock: Clone + Send {
    /// Virtual milliseconds since the run started
    fn now_ms(&self) -> u64;
    fn tick_ms(&self) -> u64;
    fn advance(&mut self);
    fn stats(&self) -> TickStats {
        TickStats::default()
    }
}

/// Wall-clock duration statistics for paced ticks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickStats {
    pub samples: usize,
    pub average_tick_ns: f64,
    pub jitter_ns: f64,
    pub min_tick_ns: f64,
    pub max_tick_ns: f64,
}

impl TickStats {
    pub fn from_durations(durations: &[Duration]) -> Self {
        if durations.is_empty() {
            return TickStats::default();
        }
        let times: Vec<f64> = durations.iter().map(|d| d.as_nanos() as f64).collect();
        let avg = times.iter().sum::<f64>() / times.len() as f64;
        let var = times.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / times.len() as f64;
        let min = times.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = times.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        TickStats {
            samples: times.len(),
            average_tick_ns: avg,
            jitter_ns: var.sqrt(),
            min_tick_ns: min,
            max_tick_ns: max,
        }
    }
}

/// Instant virtual time: `advance` adds one tick and returns immediately.
#[derive(Debug, Clone)]
pub struct VirtualClock {
    now_ms: u64,
    tick_ms: u64,
}

impl VirtualClock {
    pub fn new(tick_ms: u64) -> Self {
        Self { now_ms: 0, tick_ms }
    }
}

impl Clock for VirtualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }
    fn tick_ms(&self) -> u64 {
        self.tick_ms
    }
    fn advance(&mut self) {
        self.now_ms += self.tick_ms;
    }
}

/// Virtual time that also keeps pace with the wall clock, the way the
/// firmware tasks were delayed between iterations.
#[derive(Debug, Clone)]
pub struct PacedClock {
    inner: VirtualClock,
    start: Instant,
    last_tick: Instant,
    tick_times: Vec<Duration>,
    max_samples: usize,
}

impl PacedClock {
    pub fn new(tick_ms: u64) -> Self {
        let now = Instant::now();
        Self {
            inner: VirtualClock::new(tick_ms),
            start: now,
            last_tick: now,
            tick_times: Vec::with_capacity(1000),
            max_samples: 1000,
        }
    }

    fn record_tick(&mut self, d: Duration) {
        if self.tick_times.len() >= self.max_samples {
            self.tick_times.remove(0);
        }
        self.tick_times.push(d);
    }

    pub fn high_precision_sleep(&self, duration: Duration) {
        #[cfg(target_os = "linux")]
        self.linux_sleep(duration);
        #[cfg(not(target_os = "linux"))]
        std::thread::sleep(duration);
    }

    #[cfg(target_os = "linux")]
    fn linux_sleep(&self, duration: Duration) {
        use libc::{clock_gettime, clock_nanosleep, timespec, CLOCK_MONOTONIC, EINTR, TIMER_ABSTIME};

        let mut now = timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        if unsafe { clock_gettime(CLOCK_MONOTONIC, &mut now) } != 0 {
            std::thread::sleep(duration);
            return;
        }
        let wake = Duration::new(now.tv_sec as u64, now.tv_nsec as u32) + duration;
        let deadline = timespec {
            tv_sec: wake.as_secs() as libc::time_t,
            tv_nsec: wake.subsec_nanos() as libc::c_long,
        };

        // Absolute deadline, so a signal-interrupted sleep resumes towards
        // the same instant instead of ending the tick early
        loop {
            let rc = unsafe {
                clock_nanosleep(CLOCK_MONOTONIC, TIMER_ABSTIME, &deadline, std::ptr::null_mut())
            };
            if rc != EINTR {
                break;
            }
        }
    }
}

impl Clock for PacedClock {
    fn now_ms(&self) -> u64 {
        self.inner.now_ms()
    }
    fn tick_ms(&self) -> u64 {
        self.inner.tick_ms()
    }
    fn advance(&mut self) {
        self.inner.advance();
        // Sleep towards an absolute deadline so overruns do not accumulate
        let deadline = self.start + Duration::from_millis(self.inner.now_ms());
        let now = Instant::now();
        if deadline > now {
            self.high_precision_sleep(deadline - now);
        }
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_tick);
        self.last_tick = now;
        self.record_tick(elapsed);
    }
    fn stats(&self) -> TickStats {
        TickStats::from_durations(&self.tick_times)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_clock_advances_by_whole_ticks() {
        let mut clock = VirtualClock::new(10);
        assert_eq!(clock.now_ms(), 0);
        clock.advance();
        clock.advance();
        assert_eq!(clock.now_ms(), 20);
        assert_eq!(clock.tick_ms(), 10);
        assert_eq!(clock.stats(), TickStats::default());
    }

    #[test]
    fn paced_clock_waits_for_wall_time() {
        let mut clock = PacedClock::new(2);
        let start = Instant::now();
        for _ in 0..3 {
            clock.advance();
        }
        assert_eq!(clock.now_ms(), 6);
        assert!(start.elapsed() >= Duration::from_millis(6));
        assert_eq!(clock.stats().samples, 3);
    }

    #[test]
    fn high_precision_sleep_lasts_the_full_duration() {
        let clock = PacedClock::new(1);
        for ms in [0, 1, 3] {
            let start = Instant::now();
            clock.high_precision_sleep(Duration::from_millis(ms));
            assert!(start.elapsed() >= Duration::from_millis(ms));
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn interrupted_sleep_still_reaches_the_deadline() {
        extern "C" fn ignore(_: libc::c_int) {}
        unsafe {
            let mut action: libc::sigaction = std::mem::zeroed();
            action.sa_sigaction = ignore as libc::sighandler_t;
            libc::sigemptyset(&mut action.sa_mask);
            libc::sigaction(libc::SIGUSR1, &action, std::ptr::null_mut());
        }

        let clock = PacedClock::new(1);
        let (tx, rx) = std::sync::mpsc::channel();
        let sleeper = std::thread::spawn(move || {
            tx.send(unsafe { libc::pthread_self() }).unwrap();
            let start = Instant::now();
            clock.high_precision_sleep(Duration::from_millis(50));
            start.elapsed()
        });

        let thread = rx.recv().unwrap();
        std::thread::sleep(Duration::from_millis(10));
        unsafe {
            libc::pthread_kill(thread, libc::SIGUSR1);
        }
        assert!(sleeper.join().unwrap() >= Duration::from_millis(50));
    }

    #[test]
    fn stats_summarise_durations() {
        let stats = TickStats::from_durations(&[
            Duration::from_nanos(100),
            Duration::from_nanos(300),
        ]);
        assert_eq!(stats.samples, 2);
        assert_eq!(stats.average_tick_ns, 200.0);
        assert_eq!(stats.jitter_ns, 100.0);
        assert_eq!(stats.min_tick_ns, 100.0);
        assert_eq!(stats.max_tick_ns, 300.0);
    }
}

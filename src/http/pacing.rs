use std::time::Duration;

/// Sequential cadence: pause for `pause` after every request whose index is a
/// multiple of `every`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaceSchedule {
    every: usize,
    pause: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub index: usize,
    pub pause_after: Option<Duration>,
}

impl PaceSchedule {
    pub fn new(every: usize, pause: Duration) -> Self {
        Self {
            every: every.max(1),
            pause,
        }
    }

    /// Pause after every request.
    pub fn fixed(pause: Duration) -> Self {
        Self::new(1, pause)
    }

    pub fn ticks(&self) -> Ticks {
        Ticks {
            schedule: *self,
            index: 0,
        }
    }
}

/// Unbounded iterator over the schedule; zip it with the requests.
pub struct Ticks {
    schedule: PaceSchedule,
    index: usize,
}

impl Iterator for Ticks {
    type Item = Tick;

    fn next(&mut self) -> Option<Tick> {
        let index = self.index;
        self.index += 1;
        let pause_after = (index % self.schedule.every == 0 && !self.schedule.pause.is_zero())
            .then_some(self.schedule.pause);
        Some(Tick { index, pause_after })
    }
}

/// How `dispatch_batch` schedules its probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMode {
    /// One at a time, in order.
    Sequential,
    /// All at once through the dispatcher's bounded in-flight window.
    Concurrent,
    /// One at a time, pausing per the schedule.
    Paced(PaceSchedule),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_tenth_request_pauses() {
        let schedule = PaceSchedule::new(10, Duration::from_millis(10));
        let pauses: Vec<usize> = schedule
            .ticks()
            .take(25)
            .filter(|t| t.pause_after.is_some())
            .map(|t| t.index)
            .collect();
        assert_eq!(pauses, vec![0, 10, 20]);
    }

    #[test]
    fn test_fixed_schedule_pauses_every_time() {
        let schedule = PaceSchedule::fixed(Duration::from_millis(100));
        assert!(schedule.ticks().take(5).all(|t| t.pause_after == Some(Duration::from_millis(100))));
    }

    #[test]
    fn test_zero_pause_never_pauses() {
        let schedule = PaceSchedule::new(1, Duration::ZERO);
        assert!(schedule.ticks().take(5).all(|t| t.pause_after.is_none()));
    }
}

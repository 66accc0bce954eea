use bevy_ecs::prelude::Resource;

use crate::ecs::Tick;

/// Discrete simulation clock. `now` is 0 before the first tick; ticks are
/// numbered from 1 and the clock never goes backwards.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Resource)]
pub struct TickClock {
    now: Tick,
}

impl TickClock {
    pub fn now(&self) -> Tick {
        self.now
    }

    /// Number of ticks completed so far.
    pub fn elapsed(&self) -> Tick {
        self.now
    }

    /// Move to the next tick and return it.
    pub fn advance(&mut self) -> Tick {
        self.now = self.now.saturating_add(1);
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_start_at_one() {
        let mut clock = TickClock::default();
        assert_eq!(clock.now(), 0);
        assert_eq!(clock.advance(), 1);
        assert_eq!(clock.advance(), 2);
        assert_eq!(clock.elapsed(), 2);
    }
}

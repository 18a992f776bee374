//! Builds the primary/secondary/tertiary calendar backend trio from config.

use meetingctl_calendar::{CalendarBackend, EventKitBackend, ICalBuddyBackend, JxaBackend};

use crate::config::Config;

pub struct Backends {
    pub eventkit: EventKitBackend,
    pub jxa: JxaBackend,
    pub icalbuddy: ICalBuddyBackend,
}

impl Backends {
    pub fn new(config: &Config) -> Self {
        Self {
            eventkit: EventKitBackend::new(config.eventkit_helper.clone()),
            jxa: JxaBackend::new(config.jxa_script.clone()),
            icalbuddy: ICalBuddyBackend::new(config.icalbuddy_bin.clone()),
        }
    }

    pub fn as_slice(&self) -> [&dyn CalendarBackend; 3] {
        [&self.eventkit, &self.jxa, &self.icalbuddy]
    }
}

//! At-most-once cue guards.

use barbell_core::Cue;

/// Which cues already fired in the current clock cycle.
///
/// Reset whenever a fresh clock is granted to an athlete; a clock restarted
/// after a stop keeps its flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CueFlags {
    initial_warning: bool,
    final_warning: bool,
    time_over: bool,
    down: bool,
}

impl CueFlags {
    fn flag(&mut self, cue: Cue) -> &mut bool {
        match cue {
            Cue::InitialWarning => &mut self.initial_warning,
            Cue::FinalWarning => &mut self.final_warning,
            Cue::TimeOver => &mut self.time_over,
            Cue::Down => &mut self.down,
        }
    }

    /// Mark `cue` as fired; returns `true` only the first time in a cycle.
    pub fn fire(&mut self, cue: Cue) -> bool {
        let flag = self.flag(cue);
        if *flag {
            false
        } else {
            *flag = true;
            true
        }
    }

    pub fn has_fired(&self, cue: Cue) -> bool {
        match cue {
            Cue::InitialWarning => self.initial_warning,
            Cue::FinalWarning => self.final_warning,
            Cue::TimeOver => self.time_over,
            Cue::Down => self.down,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

//! Sequence state and catch-up planning.

use contracts::{seq_next, seq_position, SeqPosition};

/// Last processed transmission sequence number, if any
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceState {
    last_seq_num: Option<u32>,
}

/// How an announced number relates to the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Announcement {
    /// Nothing processed yet
    First,
    /// The last processed number again
    Duplicate,
    /// This many numbers ahead (1 = no gap)
    Ahead(u32),
    /// Behind the last processed number: the server restarted its sequence
    Rollback { from: u32 },
}

/// One iteration of a catch-up loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Sequence number to process
    pub seq_num: u32,
    /// Whether this is the announced number itself
    pub is_final: bool,
}

impl SequenceState {
    /// No sequence processed yet
    pub fn new() -> Self {
        Self::default()
    }

    /// State after processing `seq_num`
    pub fn at(seq_num: u32) -> Self {
        Self {
            last_seq_num: Some(seq_num),
        }
    }

    /// Last processed sequence number
    pub fn last_seq_num(&self) -> Option<u32> {
        self.last_seq_num
    }

    /// Classify an announced sequence number
    pub fn classify(&self, announced: u32) -> Announcement {
        match self.last_seq_num {
            None => Announcement::First,
            Some(last) => match seq_position(last, announced) {
                SeqPosition::Same => Announcement::Duplicate,
                SeqPosition::Ahead(d) => Announcement::Ahead(d),
                SeqPosition::Behind => Announcement::Rollback { from: last },
            },
        }
    }

    /// Take one step toward `target`
    ///
    /// The returned state already records the step's number.
    pub fn step_toward(self, target: u32) -> (Self, Step) {
        let seq_num = match self.last_seq_num {
            None => target,
            Some(last) => seq_next(last),
        };
        (
            Self::at(seq_num),
            Step {
                seq_num,
                is_final: seq_num == target,
            },
        )
    }

    /// Plan the iterations needed to reach `announced`
    ///
    /// A rollback resets the state first; a duplicate plans nothing.
    pub fn plan(self, announced: u32) -> CatchUpPlan {
        let announcement = self.classify(announced);
        let (state, done) = match announcement {
            Announcement::Rollback { .. } => (Self::new(), false),
            Announcement::Duplicate => (self, true),
            Announcement::First | Announcement::Ahead(_) => (self, false),
        };
        CatchUpPlan {
            announcement,
            state,
            target: announced,
            done,
        }
    }
}

/// Iterator over the steps that bring the state up to an announced number
///
/// [`CatchUpPlan::state`] always reflects the steps handed out so far.
#[derive(Debug, Clone)]
pub struct CatchUpPlan {
    announcement: Announcement,
    state: SequenceState,
    target: u32,
    done: bool,
}

impl CatchUpPlan {
    /// Classification of the announced number
    pub fn announcement(&self) -> Announcement {
        self.announcement
    }

    /// State after the steps taken so far
    pub fn state(&self) -> SequenceState {
        self.state
    }
}

impl Iterator for CatchUpPlan {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        if self.done {
            return None;
        }
        let (state, step) = self.state.step_toward(self.target);
        self.state = state;
        self.done = step.is_final;
        Some(step)
    }
}

/// Synchronization barrier for a paired data source (normal + recurring
/// subsets of the same record kind). Partial data is visible as soon as it
/// lands, but the "ready" transition that unblocks sorting and aggregation
/// fires only when both members of the pair have arrived, exactly once per
/// cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    WaitingForPair,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairMember {
    Normal,
    Recurrent,
}

#[derive(Debug, Clone)]
pub struct ArrivalGate {
    state: GateState,
    normal_arrived: bool,
    recurrent_arrived: bool,
}

impl ArrivalGate {
    pub fn new() -> Self {
        Self {
            state: GateState::Idle,
            normal_arrived: false,
            recurrent_arrived: false,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == GateState::Complete
    }

    /// Flags a member of the pair as arrived. Returns `true` exactly when
    /// this arrival completes the pair; the arrival flags then reset so the
    /// next cycle starts fresh (a further arrival belongs to a new pair).
    pub fn arrive(&mut self, member: PairMember) -> bool {
        match member {
            PairMember::Normal => self.normal_arrived = true,
            PairMember::Recurrent => self.recurrent_arrived = true,
        }

        if self.normal_arrived && self.recurrent_arrived {
            self.normal_arrived = false;
            self.recurrent_arrived = false;
            self.state = GateState::Complete;
            true
        } else {
            self.state = GateState::WaitingForPair;
            false
        }
    }

    /// Returns to `Idle`, discarding any partial arrival. Invoked on mode
    /// change or when a range update re-issues the fetch.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for ArrivalGate {
    fn default() -> Self {
        Self::new()
    }
}

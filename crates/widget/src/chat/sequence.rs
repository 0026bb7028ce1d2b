use std::collections::BTreeSet;
use std::fmt;

/// Identifier for one issued request.
///
/// Increases monotonically per tracker so late responses can be ordered against
/// the ones already applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestSeq(pub u64);

impl RequestSeq {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for RequestSeq {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "#{}", self.0)
    }
}

/// Conversation turn state derived from the in-flight set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnState {
    #[default]
    Idle,
    AwaitingResponse {
        /// Newest request still waiting.
        latest: RequestSeq,
        in_flight: usize,
    },
}

/// What to do with a response that just resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// Apply the response to the session.
    Apply,
    /// A newer request already settled; drop this one.
    Stale { superseded_by: RequestSeq },
}

/// Rejection reason for settling a request the tracker never issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleRejection {
    NotInFlight { seq: RequestSeq },
}

/// Issues request sequence numbers and rejects stale completions.
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    next_seq: u64,
    in_flight: BTreeSet<RequestSeq>,
    last_applied: Option<RequestSeq>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the next sequence number and marks it in flight.
    pub fn begin(&mut self) -> RequestSeq {
        self.next_seq = self.next_seq.saturating_add(1);
        let seq = RequestSeq::new(self.next_seq);
        self.in_flight.insert(seq);
        seq
    }

    /// Marks `seq` as resolved and decides whether its response may be applied.
    ///
    /// A response is stale when a request issued after it has already been applied.
    /// An applied `seq` supersedes every older request.
    pub fn settle(&mut self, seq: RequestSeq) -> Result<Settlement, SettleRejection> {
        let settlement = self.finish(seq)?;
        if settlement == Settlement::Apply {
            self.mark_applied(seq);
        }
        Ok(settlement)
    }

    /// Like [`Self::settle`] but leaves `seq` unrecorded, so the caller decides with
    /// [`Self::mark_applied`] whether its outcome supersedes older requests.
    pub fn finish(&mut self, seq: RequestSeq) -> Result<Settlement, SettleRejection> {
        if !self.in_flight.remove(&seq) {
            return Err(SettleRejection::NotInFlight { seq });
        }

        match self.last_applied {
            Some(applied) if applied > seq => Ok(Settlement::Stale {
                superseded_by: applied,
            }),
            _ => Ok(Settlement::Apply),
        }
    }

    pub fn mark_applied(&mut self, seq: RequestSeq) {
        self.last_applied = self.last_applied.max(Some(seq));
    }

    pub fn state(&self) -> TurnState {
        match self.in_flight.last() {
            Some(latest) => TurnState::AwaitingResponse {
                latest: *latest,
                in_flight: self.in_flight.len(),
            },
            None => TurnState::Idle,
        }
    }
}

//! Stateful adapter between the subscription loop and the engine.

use contracts::{ContractError, Fragmenter, Order, OrderHandler, OrderSource, OutputSink};
use tracing::error;

use crate::engine::CatchUpEngine;
use crate::state::SequenceState;

/// Catch-up engine that owns its sequence state
pub struct TrackedReceiver<O, F, S> {
    engine: CatchUpEngine<O, F, S>,
    state: SequenceState,
}

impl<O, F, S> TrackedReceiver<O, F, S>
where
    O: OrderSource,
    F: Fragmenter + Send,
    S: OutputSink,
{
    /// Start with no sequence processed
    pub fn new(engine: CatchUpEngine<O, F, S>) -> Self {
        Self {
            engine,
            state: SequenceState::new(),
        }
    }

    pub fn state(&self) -> SequenceState {
        self.state
    }

    pub fn engine(&self) -> &CatchUpEngine<O, F, S> {
        &self.engine
    }
}

impl<O, F, S> OrderHandler for TrackedReceiver<O, F, S>
where
    O: OrderSource,
    F: Fragmenter + Send,
    S: OutputSink,
{
    async fn handle(&mut self, order: Order) -> Result<(), ContractError> {
        match self.engine.process(self.state, &order).await {
            Ok(state) => {
                self.state = state;
                Ok(())
            }
            Err(err) => {
                error!(seq_num = err.seq_num, error = %err.source, "Transmission aborted");
                self.state = err.state;
                Err(err.into())
            }
        }
    }
}

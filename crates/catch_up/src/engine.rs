//! Catch-up engine: turns feed events into transmissions.

use contracts::{ContractError, Fragmenter, Order, OrderSource, OutputSink};
use dispatcher::RateLimitedDispatcher;
use observability::ReceiverStats;
use tracing::{debug, info, instrument, warn};

use crate::error::CatchUpError;
use crate::state::{Announcement, SequenceState};

/// Engine settings taken from `[transmission]`
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Order status that triggers a transmission
    pub trigger_status: String,
    /// Logical channel stamped on every packet
    pub channel: u8,
    /// Regions reported on confirmation
    pub regions: Vec<u8>,
}

impl From<&contracts::TransmissionConfig> for EngineConfig {
    fn from(config: &contracts::TransmissionConfig) -> Self {
        Self {
            trigger_status: config.trigger_status.clone(),
            channel: config.channel,
            regions: config.regions.clone(),
        }
    }
}

/// Fetches, fragments, dispatches and confirms transmissions in sequence
pub struct CatchUpEngine<O, F, S> {
    config: EngineConfig,
    source: O,
    fragmenter: F,
    dispatcher: RateLimitedDispatcher,
    targets: Vec<S>,
    stats: ReceiverStats,
}

impl<O, F, S> CatchUpEngine<O, F, S>
where
    O: OrderSource,
    F: Fragmenter + Send,
    S: OutputSink,
{
    pub fn new(
        config: EngineConfig,
        source: O,
        fragmenter: F,
        dispatcher: RateLimitedDispatcher,
        targets: Vec<S>,
    ) -> Self {
        Self {
            config,
            source,
            fragmenter,
            dispatcher,
            targets,
            stats: ReceiverStats::new(),
        }
    }

    /// Run statistics so far
    pub fn stats(&self) -> &ReceiverStats {
        &self.stats
    }

    /// Output targets
    pub fn targets(&self) -> &[S] {
        &self.targets
    }

    /// Process one feed event starting from `state`
    ///
    /// Returns the new state. Events with another status leave it unchanged.
    ///
    /// # Errors
    /// The first failing sequence number aborts the event; the error carries
    /// the state reached, including that number.
    #[instrument(
        name = "catch_up_process",
        skip(self, order),
        fields(status = %order.status, tx_seq_num = order.tx_seq_num)
    )]
    pub async fn process(
        &mut self,
        state: SequenceState,
        order: &Order,
    ) -> Result<SequenceState, CatchUpError> {
        self.stats.events += 1;
        if order.status != self.config.trigger_status {
            self.stats.ignored += 1;
            debug!(status = %order.status, "Ignoring event");
            return Ok(state);
        }

        let seq_num = contracts::seq_wrap(order.tx_seq_num);
        let mut plan = state.plan(seq_num);
        match plan.announcement() {
            Announcement::Rollback { from } => {
                warn!(
                    last_seq_num = from,
                    seq_num, "Sequence number rolled back, resetting"
                );
                self.stats.rollbacks += 1;
                observability::record_rollback();
            }
            Announcement::Duplicate => {
                debug!(seq_num, "Sequence number already processed");
                self.stats.duplicates += 1;
                return Ok(state);
            }
            Announcement::First | Announcement::Ahead(_) => {}
        }

        while let Some(step) = plan.next() {
            if !step.is_final {
                info!(seq_num = step.seq_num, "Catch up with transmission");
                self.stats.catch_up += 1;
            }
            self.transmit(step.seq_num, !step.is_final, order.message_size)
                .await
                .map_err(|source| CatchUpError {
                    seq_num: step.seq_num,
                    state: plan.state(),
                    source,
                })?;
        }
        Ok(plan.state())
    }

    async fn transmit(
        &mut self,
        seq_num: u32,
        catch_up: bool,
        announced_size: u64,
    ) -> Result<(), ContractError> {
        self.stats.sequences += 1;
        observability::record_sequence_processed(seq_num, catch_up);

        let data = match self.source.fetch_data(seq_num).await? {
            Some(data) if !data.is_empty() => data,
            _ => {
                info!(seq_num, "Empty message");
                self.stats.empty_orders += 1;
                observability::record_empty_order();
                return Ok(());
            }
        };
        if catch_up {
            info!(seq_num, size = data.len(), "Message");
        } else {
            info!(seq_num, size = data.len(), announced_size, "Message");
        }

        let packets = self
            .fragmenter
            .split(&data, seq_num, self.config.channel)?;
        debug!(
            seq_num,
            packets = packets.len(),
            expected_ms = self.dispatcher.expected_duration(data.len()).as_millis() as u64,
            "Dispatching"
        );
        let sent = self.dispatcher.dispatch(&packets, &mut self.targets).await?;
        self.stats.packets += sent.packets as u64;
        self.stats.bytes += sent.bytes as u64;

        self.source.confirm_tx(seq_num, &self.config.regions).await?;
        self.stats.transmitted += 1;
        Ok(())
    }
}

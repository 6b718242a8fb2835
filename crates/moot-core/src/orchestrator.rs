//! The exchange loop: drives agent turns until control returns to the human.
//!
//! One orchestrator serves one conversation. It owns the pass bookkeeping for
//! the current exchange, resolves the next speaker after every completed
//! message, and runs each turn through the tool-execution loop. Turns never
//! overlap; the floor strictly alternates.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::chat::Conversation;
use crate::constants::{DEFAULT_SANDBOX_TIMEOUT, MAX_TOOL_ROUNDS};
use crate::events::RoomEvent;
use crate::model::ChatTransport;
use crate::sandbox::SandboxExecutor;
use crate::scheduler::{resolve_next, SchedulerState};
use crate::turn::{self, TurnEnd, TurnLimits};

/// Shared services the exchange loop needs.
pub struct OrchestratorServices {
    pub transport: Arc<dyn ChatTransport>,
    pub sandbox: Arc<dyn SandboxExecutor>,
}

/// Tunables, threaded explicitly rather than read from process-wide state.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub max_rounds: usize,
    pub sandbox_timeout: std::time::Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_rounds: MAX_TOOL_ROUNDS,
            sandbox_timeout: DEFAULT_SANDBOX_TIMEOUT,
        }
    }
}

pub struct Orchestrator {
    services: OrchestratorServices,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(services: OrchestratorServices, config: OrchestratorConfig) -> Self {
        Self { services, config }
    }

    /// Run one human-initiated exchange to completion.
    ///
    /// Expects the human's message to already be appended to `conversation`.
    /// Emits `RoomEvent`s while running and returns once no agent wants the
    /// floor, an unknown speaker aborts the exchange, or the operator
    /// cancels.
    pub async fn run_exchange(
        &self,
        conversation: &mut Conversation,
        event_tx: &mpsc::UnboundedSender<RoomEvent>,
        cancel: &CancellationToken,
    ) {
        let limits = TurnLimits {
            max_rounds: self.config.max_rounds,
            sandbox_timeout: self.config.sandbox_timeout,
        };

        let mut passed: HashSet<String> = HashSet::new();

        loop {
            let handle = match next_state(conversation, &passed, cancel) {
                SchedulerState::AgentTurn(handle) => handle,
                SchedulerState::AwaitingHuman => break,
                // Cancelled: the floor goes straight back without the
                // exchange-complete signal.
                SchedulerState::Done => return,
            };

            let Some(agent) = conversation.roster().get(&handle).cloned() else {
                // Resolution produced a handle outside the roster; abort the
                // exchange and hand the floor back.
                let _ = event_tx.send(RoomEvent::Notice {
                    text: format!("unknown speaker {handle}, returning to the human"),
                });
                break;
            };

            let _ = event_tx.send(RoomEvent::TurnStarted {
                agent: agent.handle.clone(),
            });

            let end = turn::run_turn(
                &agent,
                conversation,
                self.services.transport.as_ref(),
                self.services.sandbox.as_ref(),
                &limits,
                event_tx,
                cancel,
            )
            .await;

            match end {
                TurnEnd::Cancelled => return,
                TurnEnd::Completed(message) => {
                    if message.is_pass() {
                        passed.insert(agent.handle.clone());
                        let _ = event_tx.send(RoomEvent::AgentPassed {
                            agent: agent.handle.clone(),
                        });
                    } else {
                        // A genuine reply resets who has had a chance to
                        // speak this exchange.
                        passed.clear();
                        conversation.push(message);
                        let _ = event_tx.send(RoomEvent::TurnComplete {
                            agent: agent.handle.clone(),
                        });
                    }
                }
            }
        }

        let _ = event_tx.send(RoomEvent::ExchangeComplete);
    }
}

fn next_state(
    conversation: &Conversation,
    passed: &HashSet<String>,
    cancel: &CancellationToken,
) -> SchedulerState {
    if cancel.is_cancelled() {
        return SchedulerState::Done;
    }
    let Some(completed) = conversation.messages().last() else {
        return SchedulerState::AwaitingHuman;
    };
    match resolve_next(completed, conversation, passed) {
        Some(handle) => SchedulerState::AgentTurn(handle),
        None => SchedulerState::AwaitingHuman,
    }
}

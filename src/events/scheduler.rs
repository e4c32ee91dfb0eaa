// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::{ScheduleConfig, ScheduleTrigger};
use crate::errors::ConfigurationError;
use crate::events::{CausalId, CausalKind, Event, EventBus};
use crate::observability::messages::events::{ScheduleTriggered, SchedulerLifecycle};
use crate::observability::messages::StructuredLog;

enum Trigger {
    Interval(Duration),
    Calendar(Box<cron::Schedule>),
}

struct Schedule {
    name: String,
    event: String,
    trigger: Trigger,
}

impl Schedule {
    fn parse(config: &ScheduleConfig) -> Result<Self, ConfigurationError> {
        let invalid = |reason: String| ConfigurationError::InvalidSchedule {
            schedule: config.name.clone(),
            reason,
        };

        let trigger = match &config.trigger {
            ScheduleTrigger::Interval { every_ms: 0 } => {
                return Err(invalid("interval must be greater than zero".into()))
            }
            ScheduleTrigger::Interval { every_ms } => Trigger::Interval(Duration::from_millis(*every_ms)),
            ScheduleTrigger::Calendar { expression } => cron::Schedule::from_str(expression)
                .map(|schedule| Trigger::Calendar(Box::new(schedule)))
                .map_err(|e| invalid(format!("'{}': {}", expression, e)))?,
        };

        Ok(Self {
            name: config.name.clone(),
            event: config.event.clone(),
            trigger,
        })
    }

    /// Publish one trigger event tagged with a fresh schedule causal id.
    fn fire(&self, bus: &EventBus) {
        let causal_id = CausalId::new(CausalKind::Schedule);
        let causal_text = causal_id.to_string();

        ScheduleTriggered {
            schedule: &self.name,
            event: &self.event,
            causal_id: &causal_text,
        }
        .log();

        let payload = json!({ "schedule": self.name, "causal_id": causal_text });
        bus.publish(&Event::new(self.event.clone(), payload).with_causal_ids(vec![causal_id]));
    }

    async fn run(self: Arc<Self>, bus: EventBus, token: CancellationToken) {
        match &self.trigger {
            Trigger::Interval(period) => {
                let mut ticker = tokio::time::interval_at(Instant::now() + *period, *period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = ticker.tick() => self.fire(&bus),
                    }
                }
            }
            Trigger::Calendar(schedule) => loop {
                let Some(next) = schedule.upcoming(chrono::Utc).next() else {
                    break;
                };
                let wait = (next - chrono::Utc::now()).to_std().unwrap_or(Duration::ZERO);
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(wait) => self.fire(&bus),
                }
            },
        }
    }
}

/// Publishes time-based events onto the bus.
///
/// Every schedule is parsed when the scheduler is built, so a bad interval
/// or calendar expression fails the boot instead of a running task. Each
/// started schedule runs as its own task until [`stop`](Self::stop).
pub struct Scheduler {
    bus: EventBus,
    schedules: Vec<Arc<Schedule>>,
    token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new(bus: EventBus, configs: &[ScheduleConfig]) -> Result<Self, ConfigurationError> {
        let schedules = configs
            .iter()
            .map(|config| Schedule::parse(config).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            bus,
            schedules,
            token: CancellationToken::new(),
            tasks: Vec::new(),
        })
    }

    pub fn schedule_count(&self) -> usize {
        self.schedules.len()
    }

    pub fn is_running(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Spawn one task per schedule. Must be called inside a tokio runtime;
    /// calling it while already running is a no-op.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        if self.token.is_cancelled() {
            self.token = CancellationToken::new();
        }

        self.tasks = self
            .schedules
            .iter()
            .map(|schedule| tokio::spawn(schedule.clone().run(self.bus.clone(), self.token.clone())))
            .collect();

        SchedulerLifecycle {
            transition: "started",
            schedule_count: self.schedules.len(),
        }
        .log();
    }

    /// Cancel every schedule task and wait for it to finish.
    pub async fn stop(&mut self) {
        self.token.cancel();
        for task in self.tasks.drain(..) {
            let _ = task.await;
        }

        SchedulerLifecycle {
            transition: "stopped",
            schedule_count: self.schedules.len(),
        }
        .log();
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

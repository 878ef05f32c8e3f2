/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

//! typed in-process events emitted on write paths. Delivery to browsers/mail is
//! the business of external subscribers - the core only publishes. Publishing
//! never blocks and never fails the emitting task; a bus without subscribers
//! drops events on the floor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use crate::StormStatus;

#[derive(Debug,Clone,Serialize,Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TcEvent {
    AdvisoryIngested { storm_code: String, advisory_id: i64 },
    ForecastUpdated { storm_code: String, issuance_time: DateTime<Utc> },
    ZonesUpdated { storm_code: String },
    StormStatusChanged { storm_code: String, from: StormStatus, to: StormStatus, reason: String },
}

#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<TcEvent>,
}

impl EventBus {
    pub fn new (capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel( capacity.max(16));
        EventBus { tx }
    }

    pub fn subscribe (&self) -> broadcast::Receiver<TcEvent> {
        self.tx.subscribe()
    }

    pub fn publish (&self, event: TcEvent) {
        // a send error just means nobody is listening
        if self.tx.send( event.clone()).is_err() {
            debug!("unobserved event {:?}", event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self { EventBus::new(256) }
}

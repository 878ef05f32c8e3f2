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
#![allow(unused)]

//! tc_job is the periodic job scheduler and worker runtime of the pipeline.
//! Jobs are values implementing [`PeriodicJob`], registered at startup and
//! driven by per-job tickers. Work fans out through typed queues to a bounded
//! worker pool. The runtime owns the cross cutting task semantics so job
//! implementations do not have to: at-most-once per `(job, target)` key,
//! dropped (not queued) ticks while a prior run is unfinished, per-storm
//! dependency edges between jobs, exponential backoff for retryable outcomes,
//! soft/hard deadlines, and cooperative cancellation with a bounded grace
//! window on shutdown.
//!
//! Basic usage:
//!```ignore
//!  let mut scheduler = JobScheduler::new( SchedulerConfig::default());
//!  scheduler.register( Arc::new( MyJob::new(...)));
//!  scheduler.start()?;
//!  ...
//!  scheduler.shutdown().await;
//!```

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kanal::{unbounded_async, AsyncReceiver, AsyncSender};
use strum::{Display, EnumIter, IntoEnumIterator};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use tc_common::datetime::{millis, minutes, secs, utc_now};

mod errors;
pub use errors::*;

/* #region task model *******************************************************************/

/// the logical queues work is routed through. Queue assignment is a routing
/// tag, not a priority - all queues are served by the same worker pool.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,Display,EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum QueueTag {
    Default,
    Ingest,
    Forecast,
    Zones,
    Alerts,
}

/// the typed result every task returns to the runtime. No panic/unwind style
/// propagation crosses the task boundary - the runtime records outcomes and
/// decides about retry and suppression.
#[derive(Debug,Clone,PartialEq)]
pub enum TaskOutcome {
    /// task ran to completion (including "nothing to do" cycles)
    Completed,
    /// transient failure (network, 5xx, timeout) - retried with backoff
    Retryable( String ),
    /// permanent failure - recorded, not retried within this period
    Permanent( String ),
    /// task observed its cancellation signal and unwound cleanly
    Cancelled,
}

impl TaskOutcome {
    pub fn is_failure (&self) -> bool {
        matches!( self, TaskOutcome::Retryable(_) | TaskOutcome::Permanent(_))
    }
}

/// execution context handed to every task run. Tasks must check the
/// cancellation token at their I/O boundaries.
#[derive(Clone)]
pub struct TaskCtx {
    /// cancellation signal for this task (child of the scheduler token)
    pub cancel: CancellationToken,

    /// per-storm target for fan-out tasks, None for the periodic driver run
    pub target: Option<String>,

    handle: SchedulerHandle,
}

impl TaskCtx {
    pub fn is_cancelled (&self) -> bool { self.cancel.is_cancelled() }

    /// submit a follow-up task, e.g. a per-storm fan-out from a driver run or a
    /// dependent stage after a successful upstream stage. Submissions for a
    /// `(job,target)` key that is already in flight are dropped.
    pub async fn submit (&self, job_name: &str, target: Option<String>) -> Result<SubmitOutcome> {
        self.handle.submit( job_name, target).await
    }
}

/// a periodic job. Implementations hold their collaborators (store, fetcher,
/// event bus) and are registered with the scheduler at startup.
#[async_trait]
pub trait PeriodicJob: Send + Sync {
    fn name (&self) -> &'static str;

    fn queue (&self) -> QueueTag { QueueTag::Default }

    fn period (&self) -> Duration;

    /// names of jobs that must not be in flight for the same target when this
    /// job starts (per-storm dependency edge). Checked only for targeted runs.
    fn conflicts_with (&self) -> &'static [&'static str] { &[] }

    async fn run (&self, ctx: TaskCtx) -> TaskOutcome;
}

/* #endregion task model */

/* #region config & status **************************************************************/

#[derive(Debug,Clone)]
pub struct RetryPolicy {
    pub base: Duration,
    pub factor: f64,
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy { base: secs(1), factor: 2.0, max_retries: 3 }
    }
}

impl RetryPolicy {
    pub fn backoff (&self, attempt: u32) -> Duration {
        let millis = self.base.as_millis() as f64 * self.factor.powi( attempt as i32);
        Duration::from_millis( millis as u64)
    }
}

#[derive(Debug,Clone)]
pub struct SchedulerConfig {
    /// number of worker routines draining the queues
    pub worker_count: usize,

    /// deadline after which a warning is surfaced for a still-running task
    pub soft_deadline: Duration,

    /// deadline after which a task is terminated and recorded as failed
    pub hard_deadline: Duration,

    pub retry: RetryPolicy,

    /// how long shutdown waits for in-flight tasks before force-terminating
    pub grace: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            worker_count: default_worker_count(),
            soft_deadline: minutes(25),
            hard_deadline: minutes(30),
            retry: RetryPolicy::default(),
            grace: secs(5),
        }
    }
}

pub fn default_worker_count () -> usize {
    std::thread::available_parallelism().map( |n| n.get()).unwrap_or(2).max(2)
}

/// per-job aggregate bookkeeping, readable through [`JobScheduler::status_of`]
#[derive(Debug,Clone,Default)]
pub struct JobStatus {
    pub runs: u64,
    pub completed: u64,
    pub retried: u64,
    pub failed: u64,
    pub cancelled: u64,
    pub dropped_ticks: u64,
    pub last_started: Option<DateTime<Utc>>,
    pub last_outcome: Option<TaskOutcome>,
}

#[derive(Debug,Clone,Copy,PartialEq)]
pub enum SubmitOutcome {
    Queued,
    /// prior run for the same `(job,target)` not finished, or a conflicting
    /// job is in flight for the target - submission dropped, not queued
    Dropped,
}

/* #endregion config & status */

/* #region runtime **********************************************************************/

struct TaskItem {
    job: Arc<dyn PeriodicJob>,
    target: Option<String>,
}

impl TaskItem {
    fn key (&self) -> (String, Option<String>) {
        (self.job.name().to_string(), self.target.clone())
    }
}

struct RuntimeInner {
    jobs: Mutex<HashMap<String, Arc<dyn PeriodicJob>>>,
    senders: HashMap<QueueTag, AsyncSender<TaskItem>>,
    receivers: HashMap<QueueTag, AsyncReceiver<TaskItem>>,

    /// the `(job,target)` exclusivity map - keys are reserved at submission and
    /// released when the task (including retries) has finished
    in_flight: Mutex<HashSet<(String, Option<String>)>>,

    status: Mutex<HashMap<String, JobStatus>>,
    cancel: CancellationToken,
    config: SchedulerConfig,
}

impl RuntimeInner {
    fn job (&self, name: &str) -> Option<Arc<dyn PeriodicJob>> {
        self.jobs.lock().unwrap().get( name).cloned()
    }

    fn try_reserve (&self, job: &Arc<dyn PeriodicJob>, target: &Option<String>) -> bool {
        let key = (job.name().to_string(), target.clone());
        let mut in_flight = self.in_flight.lock().unwrap();

        if in_flight.contains( &key) { return false }

        if target.is_some() {
            for conflict in job.conflicts_with() {
                if in_flight.contains( &(conflict.to_string(), target.clone())) {
                    return false
                }
            }
        }

        in_flight.insert( key);
        true
    }

    fn release (&self, key: &(String, Option<String>)) {
        self.in_flight.lock().unwrap().remove( key);
    }

    fn record (&self, name: &str, f: impl FnOnce(&mut JobStatus)) {
        let mut status = self.status.lock().unwrap();
        f( status.entry( name.to_string()).or_default());
    }
}

/// cloneable submission handle, also used by tasks for follow-up submissions
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Arc<RuntimeInner>,
}

impl SchedulerHandle {
    pub async fn submit (&self, job_name: &str, target: Option<String>) -> Result<SubmitOutcome> {
        let job = self.inner.job( job_name).ok_or_else( || TcJobError::UnknownJob( job_name.to_string()))?;

        if !self.inner.try_reserve( &job, &target) {
            debug!("dropping {} [{:?}] - prior run unfinished or conflicting job in flight", job_name, target);
            self.inner.record( job_name, |s| s.dropped_ticks += 1);
            return Ok( SubmitOutcome::Dropped)
        }

        let sender = &self.inner.senders[&job.queue()];
        let item = TaskItem { job, target };
        let key = item.key();

        if sender.send( item).await.is_err() {
            self.inner.release( &key);
            return Err( TcJobError::QueueClosed)
        }
        Ok( SubmitOutcome::Queued)
    }
}

pub struct JobScheduler {
    inner: Arc<RuntimeInner>,
    workers: Vec<JoinHandle<()>>,
    tickers: Vec<JoinHandle<()>>,
    running: bool,
}

impl JobScheduler {
    pub fn new (config: SchedulerConfig) -> Self {
        let mut senders = HashMap::new();
        let mut receivers = HashMap::new();
        for tag in QueueTag::iter() {
            let (tx, rx) = unbounded_async::<TaskItem>();
            senders.insert( tag, tx);
            receivers.insert( tag, rx);
        }

        let inner = Arc::new( RuntimeInner {
            jobs: Mutex::new( HashMap::new()),
            senders,
            receivers,
            in_flight: Mutex::new( HashSet::new()),
            status: Mutex::new( HashMap::new()),
            cancel: CancellationToken::new(),
            config,
        });

        JobScheduler { inner, workers: Vec::new(), tickers: Vec::new(), running: false }
    }

    pub fn register (&mut self, job: Arc<dyn PeriodicJob>) {
        self.inner.jobs.lock().unwrap().insert( job.name().to_string(), job);
    }

    pub fn handle (&self) -> SchedulerHandle {
        SchedulerHandle { inner: self.inner.clone() }
    }

    pub fn status_of (&self, job_name: &str) -> Option<JobStatus> {
        self.inner.status.lock().unwrap().get( job_name).cloned()
    }

    /// spawn the worker pool and the per-job tickers. Each ticker fires the
    /// job's driver run on its period; the first tick goes out immediately.
    pub fn start (&mut self) -> Result<()> {
        if self.running { return Err( TcJobError::AlreadyRunning) }

        for i in 0..self.inner.config.worker_count {
            let inner = self.inner.clone();
            self.workers.push( tokio::spawn( worker_loop( i, inner)));
        }

        let jobs: Vec<Arc<dyn PeriodicJob>> = self.inner.jobs.lock().unwrap().values().cloned().collect();
        for job in jobs {
            let handle = self.handle();
            let cancel = self.inner.cancel.clone();
            let name = job.name();
            let period = job.period();

            self.tickers.push( tokio::spawn( async move {
                let mut interval = tokio::time::interval( period);
                interval.set_missed_tick_behavior( tokio::time::MissedTickBehavior::Skip);
                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            if let Err(e) = handle.submit( name, None).await {
                                warn!("ticker for {} stopping: {}", name, e);
                                break;
                            }
                        }
                        _ = cancel.cancelled() => break,
                    }
                }
            }));
        }

        self.running = true;
        info!("job scheduler started with {} workers", self.inner.config.worker_count);
        Ok(())
    }

    /// run one job inline (admin surface), honoring exclusivity but bypassing
    /// queues and tickers
    pub async fn run_now (&self, job_name: &str, target: Option<String>) -> Result<TaskOutcome> {
        let job = self.inner.job( job_name).ok_or_else( || TcJobError::UnknownJob( job_name.to_string()))?;

        if !self.inner.try_reserve( &job, &target) {
            return Ok( TaskOutcome::Retryable( "prior run still in flight".to_string()))
        }
        let key = (job.name().to_string(), target.clone());
        let outcome = execute_task( &self.inner, self.handle(), job, target).await;
        self.inner.release( &key);
        Ok( outcome)
    }

    /// cancel all in-flight tasks, give them the grace window to unwind, then
    /// force-terminate what is left
    pub async fn shutdown (&mut self) {
        info!("job scheduler shutting down");
        self.inner.cancel.cancel();

        for t in self.tickers.drain(..) { t.abort(); }

        let grace = self.inner.config.grace;
        let drain = futures::future::join_all( self.workers.drain(..));
        if tokio::time::timeout( grace, drain).await.is_err() {
            warn!("grace window expired, force terminating workers");
            // worker handles were consumed by join_all; in-flight futures die with the runtime
        }
        self.running = false;
    }
}

async fn worker_loop (id: usize, inner: Arc<RuntimeInner>) {
    let rx_default = inner.receivers[&QueueTag::Default].clone();
    let rx_ingest = inner.receivers[&QueueTag::Ingest].clone();
    let rx_forecast = inner.receivers[&QueueTag::Forecast].clone();
    let rx_zones = inner.receivers[&QueueTag::Zones].clone();
    let rx_alerts = inner.receivers[&QueueTag::Alerts].clone();

    let handle = SchedulerHandle { inner: inner.clone() };

    loop {
        let item: TaskItem = tokio::select! {
            biased;
            _ = inner.cancel.cancelled() => break,
            r = rx_default.recv() => match r { Ok(item) => item, Err(_) => break },
            r = rx_ingest.recv() => match r { Ok(item) => item, Err(_) => break },
            r = rx_forecast.recv() => match r { Ok(item) => item, Err(_) => break },
            r = rx_zones.recv() => match r { Ok(item) => item, Err(_) => break },
            r = rx_alerts.recv() => match r { Ok(item) => item, Err(_) => break },
        };

        let key = item.key();
        let TaskItem { job, target } = item;
        debug!("worker {} starting {} [{:?}]", id, job.name(), target);

        execute_task( &inner, handle.clone(), job, target).await;
        inner.release( &key);
    }
}

/// one task execution including retry, deadlines and status bookkeeping
async fn execute_task (
    inner: &Arc<RuntimeInner>,
    handle: SchedulerHandle,
    job: Arc<dyn PeriodicJob>,
    target: Option<String>,
) -> TaskOutcome {
    let name = job.name();
    let retry = inner.config.retry.clone();
    let hard_deadline = inner.config.hard_deadline;
    let soft_deadline = inner.config.soft_deadline;

    inner.record( name, |s| { s.runs += 1; s.last_started = Some( utc_now()); });

    let task_cancel = inner.cancel.child_token();
    let ctx = TaskCtx { cancel: task_cancel.clone(), target: target.clone(), handle };

    let started = Instant::now();
    let soft_watchdog = {
        let tgt = target.clone();
        tokio::spawn( async move {
            tokio::time::sleep( soft_deadline).await;
            warn!("{} [{:?}] exceeded soft deadline", name, tgt);
        })
    };

    let mut attempt: u32 = 0;
    let outcome = loop {
        let remaining = hard_deadline.saturating_sub( started.elapsed());
        if remaining.is_zero() {
            task_cancel.cancel();
            break TaskOutcome::Permanent( "hard deadline exceeded".to_string())
        }

        let run = job.run( ctx.clone());
        let outcome = match tokio::time::timeout( remaining, run).await {
            Ok(outcome) => outcome,
            Err(_) => {
                task_cancel.cancel();
                break TaskOutcome::Permanent( "hard deadline exceeded".to_string())
            }
        };

        match outcome {
            TaskOutcome::Retryable(reason) => {
                if inner.cancel.is_cancelled() {
                    break TaskOutcome::Cancelled
                }
                if attempt >= retry.max_retries {
                    break TaskOutcome::Retryable( reason)
                }
                let backoff = retry.backoff( attempt);
                debug!("{} [{:?}] retry {}/{} in {:?}: {}", name, target, attempt + 1, retry.max_retries, backoff, reason);
                inner.record( name, |s| s.retried += 1);
                tokio::time::sleep( backoff).await;
                attempt += 1;
            }
            other => break other,
        }
    };

    soft_watchdog.abort();

    match &outcome {
        TaskOutcome::Completed => inner.record( name, |s| { s.completed += 1; s.last_outcome = Some( outcome.clone()); }),
        TaskOutcome::Cancelled => inner.record( name, |s| { s.cancelled += 1; s.last_outcome = Some( outcome.clone()); }),
        TaskOutcome::Retryable(reason) => {
            warn!("{} [{:?}] failed after retries: {}", name, target, reason);
            inner.record( name, |s| { s.failed += 1; s.last_outcome = Some( outcome.clone()); });
        }
        TaskOutcome::Permanent(reason) => {
            error!("{} [{:?}] permanently failed: {}", name, target, reason);
            inner.record( name, |s| { s.failed += 1; s.last_outcome = Some( outcome.clone()); });
        }
    }

    outcome
}

/* #endregion runtime */

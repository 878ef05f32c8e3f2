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

//! the periodic jobs of the pipeline, wiring fetcher, parsers, store and event
//! bus together. Driver runs (no storm target) fan out to per-storm tasks via
//! the scheduler so the runtime's storm-key exclusivity and dependency edges
//! apply; per-storm runs do the actual fetch-parse-persist cycle in one store
//! transaction. Successful stages chain the dependent stage for the same storm
//! (ingest -> forecast -> zones) on top of the periodic ticks.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use tracing::{debug, info, warn};

use tc_adeck::{compute_mean_forecast, filter_ap_members, parse_adeck_file, storm_number};
use tc_cimss::{parse_detail_page, parse_index_page, HistoryParser, MATCH_TOLERANCE_SECS,
    parse_wind_radii_file};
use tc_common::datetime::{secs, utc_now};
use tc_common::net::{ConditionalFetcher, FetchOutcome};
use tc_job::{JobScheduler, PeriodicJob, QueueTag, SchedulerConfig, TaskCtx, TaskOutcome};
use tc_lifecycle::{check_archive, check_dormant, reactivate};
use tc_store::{EventBus, Storm, StormStatus, Store, TcEvent};
use tc_zones::{CoastSource, ZoneBuildOutcome, ZoneBuilder};

use crate::config::TctfsConfig;

pub const JOB_DISCOVER: &str = "discover";
pub const JOB_INGEST_OBSERVATIONS: &str = "ingest_observations";
pub const JOB_INGEST_RADII: &str = "ingest_radii";
pub const JOB_UPDATE_FORECAST: &str = "update_forecast";
pub const JOB_REGENERATE_ZONES: &str = "regenerate_zones";
pub const JOB_CHECK_DORMANT: &str = "check_dormant";
pub const JOB_CHECK_ARCHIVE: &str = "check_archive";
pub const JOB_HEALTH: &str = "health";

/// the composition root: every collaborator is constructed once and shared
pub struct App {
    pub config: TctfsConfig,
    pub store: Store,
    pub events: EventBus,
    pub fetcher: ConditionalFetcher,
    pub coast: CoastSource,
    pub zone_builder: ZoneBuilder,
}

pub type SharedApp = Arc<App>;

impl App {
    pub async fn create (config: TctfsConfig) -> anyhow::Result<SharedApp> {
        let store = Store::open( &config.database_url).await?;
        let fetcher = ConditionalFetcher::new( config.fetcher_config());

        let coast = match &config.coast_file {
            Some(path) => CoastSource::from_geojson_file( path)?,
            None => CoastSource::builtin(),
        };

        let zone_builder = ZoneBuilder::new( config.zones.clone(), config.radii_inference.clone());

        Ok( Arc::new( App {
            config,
            store,
            events: EventBus::default(),
            fetcher,
            coast,
            zone_builder,
        }))
    }
}

/// build the scheduler with all periodic jobs registered
pub fn build_scheduler (app: &SharedApp) -> JobScheduler {
    let mut scheduler = JobScheduler::new( SchedulerConfig {
        worker_count: app.config.effective_worker_count(),
        ..SchedulerConfig::default()
    });

    scheduler.register( Arc::new( DiscoverJob( app.clone())));
    scheduler.register( Arc::new( IngestObservationsJob( app.clone())));
    scheduler.register( Arc::new( IngestRadiiJob( app.clone())));
    scheduler.register( Arc::new( UpdateForecastJob( app.clone())));
    scheduler.register( Arc::new( RegenerateZonesJob( app.clone())));
    scheduler.register( Arc::new( CheckDormantJob( app.clone())));
    scheduler.register( Arc::new( CheckArchiveJob( app.clone())));
    scheduler.register( Arc::new( HealthJob( app.clone())));
    scheduler
}

/* #region shared task plumbing *********************************************************/

enum Fetched {
    Body( String ),
    NoChange,
    NoData,
}

/// fetch with the task control-flow mapping: 304 and 404 end the task normally,
/// transient trouble goes to the retry policy, everything checks cancellation
async fn fetch_text (app: &App, url: &str, ctx: &TaskCtx) -> Result<Fetched, TaskOutcome> {
    if ctx.is_cancelled() { return Err( TaskOutcome::Cancelled) }

    match app.fetcher.fetch_text( url, &ctx.cancel).await {
        FetchOutcome::Fetched { body, .. } => {
            if ctx.is_cancelled() { Err( TaskOutcome::Cancelled) } else { Ok( Fetched::Body( body)) }
        }
        FetchOutcome::NotModified => Ok( Fetched::NoChange),
        FetchOutcome::NotFound => Ok( Fetched::NoData),
        FetchOutcome::Transient { reason } => {
            if ctx.is_cancelled() { Err( TaskOutcome::Cancelled) } else { Err( TaskOutcome::Retryable( reason)) }
        }
        FetchOutcome::Permanent { reason } => Err( TaskOutcome::Permanent( reason)),
    }
}

fn db_outcome (e: impl std::fmt::Display) -> TaskOutcome {
    TaskOutcome::Retryable( format!("store: {e}"))
}

/// fan a driver run out to per-storm tasks. Dormant storms are included where
/// `include_dormant` - the observation ingest covers them so a late advisory
/// can reactivate the storm.
async fn fan_out (app: &App, ctx: &TaskCtx, job: &str, include_dormant: bool) -> TaskOutcome {
    let mut storms = match app.store.list_storms( StormStatus::Active).await {
        Ok(s) => s,
        Err(e) => return db_outcome( e),
    };
    if include_dormant {
        match app.store.list_storms( StormStatus::Dormant).await {
            Ok(mut s) => storms.append( &mut s),
            Err(e) => return db_outcome( e),
        }
    }

    for storm in storms {
        if ctx.is_cancelled() { return TaskOutcome::Cancelled }
        let _ = ctx.submit( job, Some( storm.code)).await;
    }
    TaskOutcome::Completed
}

/// resolve the per-storm target; vanished or archived storms end the task
async fn resolve_target (app: &App, ctx: &TaskCtx) -> Result<Storm, TaskOutcome> {
    let Some(code) = &ctx.target else {
        return Err( TaskOutcome::Permanent( "per-storm task without target".to_string()))
    };

    match app.store.get_storm_by_code( code).await {
        Ok( Some(storm)) if storm.status != StormStatus::Archived => Ok( storm),
        Ok( Some(_)) => {
            debug!("skipping archived storm {}", code);
            Err( TaskOutcome::Completed)
        }
        Ok( None) => {
            warn!("storm {} no longer known", code);
            Err( TaskOutcome::Completed)
        }
        Err(e) => Err( db_outcome( e)),
    }
}

/* #endregion shared task plumbing */

/* #region discover *********************************************************************/

pub struct DiscoverJob( pub SharedApp);

#[async_trait]
impl PeriodicJob for DiscoverJob {
    fn name (&self) -> &'static str { JOB_DISCOVER }
    fn queue (&self) -> QueueTag { QueueTag::Ingest }
    fn period (&self) -> Duration { secs( self.0.config.periods.discover_secs) }

    async fn run (&self, ctx: TaskCtx) -> TaskOutcome {
        let app = &self.0;

        let body = match fetch_text( app, &app.config.cimss.index_url(), &ctx).await {
            Ok( Fetched::Body(b)) => b,
            Ok( Fetched::NoChange) => { debug!("index unchanged"); return TaskOutcome::Completed }
            Ok( Fetched::NoData) => { warn!("index page absent upstream"); return TaskOutcome::Completed }
            Err(outcome) => return outcome,
        };

        let entries = parse_index_page( &body);
        info!("discovery found {} active storms upstream", entries.len());

        for entry in &entries {
            if ctx.is_cancelled() { return TaskOutcome::Cancelled }

            // per-storm detail failures are non-fatal: skip this cycle
            let detail = match fetch_text( app, &app.config.cimss.resolve( &entry.detail_href), &ctx).await {
                Ok( Fetched::Body(b)) => b,
                Ok(_) => { debug!("no detail page for {}", entry.code); continue }
                Err( TaskOutcome::Cancelled) => return TaskOutcome::Cancelled,
                Err(_) => { warn!("detail page fetch failed for {}", entry.code); continue }
            };

            let Some(discovered) = parse_detail_page( &detail, entry, &app.config.cimss) else {
                warn!("no history link for {}", entry.code);
                continue
            };

            if let Err(e) = self.persist( &discovered).await {
                warn!("could not persist discovered storm {}: {}", entry.code, e);
            }
        }
        TaskOutcome::Completed
    }
}

impl DiscoverJob {
    async fn persist (&self, d: &tc_cimss::DiscoveredStorm) -> tc_store::Result<()> {
        let app = &self.0;

        match app.store.get_storm_by_code( &d.upstream_code).await? {
            Some(existing) if existing.status == StormStatus::Archived => {
                // archived storms are terminal. The code only comes free for a
                // new-season storm once the old one is long past archival age.
                let reuse_after = chrono::Duration::hours( 2 * app.config.lifecycle.archive_hours);
                if utc_now() - existing.last_seen_utc > reuse_after {
                    let old_code = existing.code.clone();
                    app.store.requalify_archived_code( &existing).await?;
                    info!("code {} requalified for a new season storm", old_code);
                    self.create( d).await?;
                } else {
                    debug!("ignoring re-discovery of archived storm {}", d.upstream_code);
                }
            }
            Some(existing) => {
                app.store.touch_storm( existing.id, &d.display_name, &d.satellite_image_url).await?;
            }
            None => self.create( d).await?,
        }
        Ok(())
    }

    async fn create (&self, d: &tc_cimss::DiscoveredStorm) -> tc_store::Result<()> {
        let storm = self.0.store.insert_storm( &tc_store::NewStorm {
            code: d.upstream_code.clone(),
            basin: d.basin,
            name: d.display_name.clone(),
            history_url: d.history_url.clone(),
            satellite_image_url: d.satellite_image_url.clone(),
        }).await?;

        info!("created storm {} ({:?}) in {}", storm.code, storm.name, storm.basin);
        self.0.store.add_audit( &tc_store::AuditEntry {
            actor: "system".to_string(),
            action: "storm_discovered".to_string(),
            entity: format!("storm:{}", storm.id),
            details: serde_json::json!({ "code": storm.code, "basin": storm.basin, "name": storm.name }),
        }).await?;
        Ok(())
    }
}

/* #endregion discover */

/* #region observation ingest ***********************************************************/

pub struct IngestObservationsJob( pub SharedApp);

#[async_trait]
impl PeriodicJob for IngestObservationsJob {
    fn name (&self) -> &'static str { JOB_INGEST_OBSERVATIONS }
    fn queue (&self) -> QueueTag { QueueTag::Ingest }
    fn period (&self) -> Duration { secs( self.0.config.periods.ingest_observations_secs) }

    async fn run (&self, ctx: TaskCtx) -> TaskOutcome {
        let app = &self.0;

        if ctx.target.is_none() {
            return fan_out( app, &ctx, JOB_INGEST_OBSERVATIONS, true).await
        }
        let storm = match resolve_target( app, &ctx).await {
            Ok(s) => s, Err(outcome) => return outcome,
        };

        let body = match fetch_text( app, &storm.history_url, &ctx).await {
            Ok( Fetched::Body(b)) => b,
            Ok( Fetched::NoChange) => return TaskOutcome::Completed,
            Ok( Fetched::NoData) => { debug!("no history file for {}", storm.code); return TaskOutcome::Completed }
            Err(outcome) => return outcome,
        };

        let parser = HistoryParser::for_file( file_name_of( &storm.history_url), storm.basin);
        let report = parser.parse_file( &body);

        if report.failure_ratio_exceeded() {
            return TaskOutcome::Permanent( format!(
                "{}: {} of {} history lines unparseable",
                storm.code, report.errors.len(), report.errors.len() + report.records.len()))
        }

        let summary = match app.store.upsert_advisories( storm.id, &report.records).await {
            Ok(s) => s, Err(e) => return db_outcome( e),
        };

        info!("{}: {} advisories ({} new, {} dropped, {} parse errors)",
            storm.code, summary.total, summary.inserted_ids.len(), summary.dropped, report.errors.len());

        for advisory_id in &summary.inserted_ids {
            app.events.publish( TcEvent::AdvisoryIngested {
                storm_code: storm.code.clone(),
                advisory_id: *advisory_id,
            });
        }

        if !summary.inserted_ids.is_empty() {
            if storm.status == StormStatus::Dormant {
                if let Err(e) = reactivate( &app.store, &app.events, &storm).await {
                    warn!("could not reactivate {}: {}", storm.code, e);
                }
            }
            // fresh observations feed the dependent forecast stage
            let _ = ctx.submit( JOB_UPDATE_FORECAST, Some( storm.code.clone())).await;
        }
        TaskOutcome::Completed
    }
}

fn file_name_of (url: &str) -> &str {
    url.rsplit('/').next().unwrap_or( url)
}

/* #endregion observation ingest */

/* #region radii ingest *****************************************************************/

pub struct IngestRadiiJob( pub SharedApp);

#[async_trait]
impl PeriodicJob for IngestRadiiJob {
    fn name (&self) -> &'static str { JOB_INGEST_RADII }
    fn queue (&self) -> QueueTag { QueueTag::Ingest }
    fn period (&self) -> Duration { secs( self.0.config.periods.ingest_radii_secs) }

    async fn run (&self, ctx: TaskCtx) -> TaskOutcome {
        let app = &self.0;

        if ctx.target.is_none() {
            return fan_out( app, &ctx, JOB_INGEST_RADII, false).await
        }
        let storm = match resolve_target( app, &ctx).await {
            Ok(s) => s, Err(outcome) => return outcome,
        };

        let url = app.config.cimss.wind_radii_url( &storm.code);
        let body = match fetch_text( app, &url, &ctx).await {
            Ok( Fetched::Body(b)) => b,
            Ok( Fetched::NoChange) => return TaskOutcome::Completed,
            Ok( Fetched::NoData) => { debug!("no radii file for {}", storm.code); return TaskOutcome::Completed }
            Err(outcome) => return outcome,
        };

        let report = parse_wind_radii_file( &body);
        let mut matched = 0;
        let mut unmatched = 0;

        for record in &report.records {
            if ctx.is_cancelled() { return TaskOutcome::Cancelled }

            let advisory = match app.store.advisory_near( storm.id, record.timestamp, MATCH_TOLERANCE_SECS).await {
                Ok( Some(a)) => a,
                Ok( None) => { unmatched += 1; continue }
                Err(e) => return db_outcome( e),
            };

            for q in tc_store::Quadrant::ALL {
                let radii = record.radii.quadrant( q);
                if let Err(e) = app.store.upsert_radii( advisory.id, q, radii).await {
                    warn!("{}: radii upsert failed: {}", storm.code, e);
                }
            }
            matched += 1;
        }

        info!("{}: {} radii records matched, {} without advisory", storm.code, matched, unmatched);
        TaskOutcome::Completed
    }
}

/* #endregion radii ingest */

/* #region forecast update **************************************************************/

pub struct UpdateForecastJob( pub SharedApp);

#[async_trait]
impl PeriodicJob for UpdateForecastJob {
    fn name (&self) -> &'static str { JOB_UPDATE_FORECAST }
    fn queue (&self) -> QueueTag { QueueTag::Forecast }
    fn period (&self) -> Duration { secs( self.0.config.periods.update_forecast_secs) }

    async fn run (&self, ctx: TaskCtx) -> TaskOutcome {
        let app = &self.0;

        if ctx.target.is_none() {
            return fan_out( app, &ctx, JOB_UPDATE_FORECAST, false).await
        }
        let storm = match resolve_target( app, &ctx).await {
            Ok(s) => s, Err(outcome) => return outcome,
        };

        let Some(num) = storm_number( &storm.code) else {
            return TaskOutcome::Permanent( format!( "storm code {} carries no number", storm.code))
        };
        let url = app.config.adeck.adeck_url( storm.basin, num, utc_now().year());

        let body = match fetch_text( app, &url, &ctx).await {
            Ok( Fetched::Body(b)) => b,
            Ok( Fetched::NoChange) => return TaskOutcome::Completed,
            Ok( Fetched::NoData) => { debug!("no A-Deck for {}", storm.code); return TaskOutcome::Completed }
            Err(outcome) => return outcome,
        };

        let report = parse_adeck_file( &body);
        if report.failure_ratio_exceeded() {
            return TaskOutcome::Permanent( format!( "{}: A-Deck mostly unparseable", storm.code))
        }

        let members = filter_ap_members( report.records);
        if members.is_empty() {
            debug!("no AP ensemble members for {}", storm.code);
            return TaskOutcome::Completed
        }

        let mean = compute_mean_forecast( &members);
        if mean.is_empty() {
            return TaskOutcome::Completed
        }
        let issuance = mean[0].issuance_time_utc;

        match app.store.replace_final_forecast( storm.id, &mean).await {
            Ok(n) => info!("{}: installed {} mean forecast points at issuance {}", storm.code, n, issuance),
            Err(e) => return db_outcome( e),
        }

        app.events.publish( TcEvent::ForecastUpdated {
            storm_code: storm.code.clone(),
            issuance_time: issuance,
        });

        // a fresh forecast feeds the dependent zone stage
        let _ = ctx.submit( JOB_REGENERATE_ZONES, Some( storm.code.clone())).await;
        TaskOutcome::Completed
    }
}

/* #endregion forecast update */

/* #region zone regeneration ************************************************************/

pub struct RegenerateZonesJob( pub SharedApp);

#[async_trait]
impl PeriodicJob for RegenerateZonesJob {
    fn name (&self) -> &'static str { JOB_REGENERATE_ZONES }
    fn queue (&self) -> QueueTag { QueueTag::Zones }
    fn period (&self) -> Duration { secs( self.0.config.periods.regenerate_zones_secs) }

    /// zones must observe a settled forecast for the storm
    fn conflicts_with (&self) -> &'static [&'static str] { &[JOB_UPDATE_FORECAST] }

    async fn run (&self, ctx: TaskCtx) -> TaskOutcome {
        let app = &self.0;

        if ctx.target.is_none() {
            return fan_out( app, &ctx, JOB_REGENERATE_ZONES, false).await
        }
        let storm = match resolve_target( app, &ctx).await {
            Ok(s) => s, Err(outcome) => return outcome,
        };

        let track = match app.store.latest_final_forecast( storm.id).await {
            Ok(t) => t, Err(e) => return db_outcome( e),
        };
        let segments = app.coast.segments_for_basin( storm.basin);

        let outcome = match app.zone_builder.build( storm.basin, &track, &segments, utc_now()) {
            Ok(o) => o,
            // geometry trouble must not wipe the previously valid zone set
            Err(e) => return TaskOutcome::Permanent( format!( "{}: zone geometry failed: {}", storm.code, e)),
        };

        let zones = match outcome {
            ZoneBuildOutcome::NoForecast => {
                debug!("{}: no current forecast, keeping existing zones", storm.code);
                return TaskOutcome::Completed
            }
            ZoneBuildOutcome::Zones(z) => z,
        };

        if ctx.is_cancelled() { return TaskOutcome::Cancelled }

        let n = zones.len();
        match app.store.replace_zones( storm.id, &zones).await {
            Ok(_) => info!("{}: zone set replaced ({} polygons)", storm.code, n),
            Err(e) => return db_outcome( e),
        }

        app.events.publish( TcEvent::ZonesUpdated { storm_code: storm.code.clone() });

        if n > 0 {
            let payload = serde_json::json!({ "zones": n });
            if let Err(e) = app.store.add_alert_intent( storm.id, "zones_changed", &payload).await {
                warn!("{}: could not record alert intent: {}", storm.code, e);
            }
        }
        TaskOutcome::Completed
    }
}

/* #endregion zone regeneration */

/* #region lifecycle & health ***********************************************************/

pub struct CheckDormantJob( pub SharedApp);

#[async_trait]
impl PeriodicJob for CheckDormantJob {
    fn name (&self) -> &'static str { JOB_CHECK_DORMANT }
    fn period (&self) -> Duration { secs( self.0.config.periods.check_dormant_secs) }

    async fn run (&self, ctx: TaskCtx) -> TaskOutcome {
        let app = &self.0;
        match check_dormant( &app.store, &app.events, &app.config.lifecycle, utc_now()).await {
            Ok(codes) => {
                if !codes.is_empty() { info!("marked dormant: {:?}", codes) }
                TaskOutcome::Completed
            }
            Err(e) => TaskOutcome::Retryable( e.to_string()),
        }
    }
}

pub struct CheckArchiveJob( pub SharedApp);

#[async_trait]
impl PeriodicJob for CheckArchiveJob {
    fn name (&self) -> &'static str { JOB_CHECK_ARCHIVE }
    fn period (&self) -> Duration { secs( self.0.config.periods.check_archive_secs) }

    async fn run (&self, ctx: TaskCtx) -> TaskOutcome {
        let app = &self.0;
        match check_archive( &app.store, &app.events, &app.config.lifecycle, utc_now()).await {
            Ok(codes) => {
                for code in &codes {
                    self.flush_caches( code).await;
                }
                if !codes.is_empty() { info!("archived: {:?}", codes) }
                TaskOutcome::Completed
            }
            Err(e) => TaskOutcome::Retryable( e.to_string()),
        }
    }
}

impl CheckArchiveJob {
    /// archived storms poll no more - drop their validator cache entries
    async fn flush_caches (&self, code: &str) {
        let app = &self.0;
        if let Ok( Some(storm)) = app.store.get_storm_by_code( code).await {
            app.fetcher.forget( &storm.history_url);
            app.fetcher.forget( &app.config.cimss.wind_radii_url( code));
            if let Some(num) = storm_number( code) {
                app.fetcher.forget( &app.config.adeck.adeck_url( storm.basin, num, utc_now().year()));
            }
        }
    }
}

pub struct HealthJob( pub SharedApp);

#[async_trait]
impl PeriodicJob for HealthJob {
    fn name (&self) -> &'static str { JOB_HEALTH }
    fn period (&self) -> Duration { secs( self.0.config.periods.health_secs) }

    async fn run (&self, _ctx: TaskCtx) -> TaskOutcome {
        let app = &self.0;
        match app.store.health_check().await {
            Ok(n) => {
                debug!("health: {} storms, {} cached validators", n, app.fetcher.cache_len());
                TaskOutcome::Completed
            }
            Err(e) => TaskOutcome::Retryable( format!("health check failed: {e}")),
        }
    }
}

/* #endregion lifecycle & health */

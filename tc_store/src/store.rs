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

//! sqlite persistence for the pipeline data model. The write contract is one
//! transaction per storm cycle: each parse-then-write path goes through a
//! single method here that opens, fills and commits its own transaction, so a
//! cancelled or failed task never leaves partial rows behind. Replace-all
//! operations (forecast, zones) delete and insert inside that transaction -
//! readers never observe an empty intermediate set.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use geo::{BoundingRect, MultiPolygon};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, Transaction};
use tracing::{debug, info, warn};

use tc_common::datetime::utc_now;
use tc_common::geo::GeoPoint;

use crate::errors::{illegal_transition, invalid_value, Result, TcStoreError};
use crate::{
    Advisory, AdvisoryRecord, ArchivalStats, AuditEntry, Basin, ForecastPoint, ForecastPointRecord,
    QuadrantRadii, Quadrant, RadiiSet, Storm, StormStatus, Zone, ZoneRecord, ZoneType,
};

const SCHEMA: &str = include_str!("schema.sql");

/// summary of a per-storm advisory write cycle
#[derive(Debug,Clone,Default)]
pub struct AdvisoryUpsert {
    /// ids of rows that were newly inserted (not pre-existing upserts)
    pub inserted_ids: Vec<i64>,
    pub total: usize,
    /// records dropped by semantic validation
    pub dropped: usize,
    pub latest_issued_at: Option<DateTime<Utc>>,
}

/// fields needed to create a storm row at first discovery
#[derive(Debug,Clone)]
pub struct NewStorm {
    pub code: String,
    pub basin: Basin,
    pub name: Option<String>,
    pub history_url: String,
    pub satellite_image_url: Option<String>,
}

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// open (and create if missing) the database behind a `sqlite:` URL and
    /// apply the schema
    pub async fn open (database_url: &str) -> Result<Self> {
        let opts = SqliteConnectOptions::from_str( database_url)?
            .create_if_missing( true)
            .journal_mode( SqliteJournalMode::Wal)
            .foreign_keys( true);

        let pool = SqlitePoolOptions::new()
            .max_connections( 8)
            .connect_with( opts).await?;

        sqlx::raw_sql( SCHEMA).execute( &pool).await?;
        info!("store opened at {}", database_url);
        Ok( Store { pool })
    }

    /// private in-memory store (tests, health probes)
    pub async fn open_memory () -> Result<Self> {
        let opts = SqliteConnectOptions::from_str( "sqlite::memory:")?
            .foreign_keys( true);

        // a single connection so the in-memory database is shared
        let pool = SqlitePoolOptions::new()
            .max_connections( 1)
            .connect_with( opts).await?;

        sqlx::raw_sql( SCHEMA).execute( &pool).await?;
        Ok( Store { pool })
    }

    /// cheap liveness probe used by the health job
    pub async fn health_check (&self) -> Result<i64> {
        let row = sqlx::query( "SELECT count(*) AS n FROM storms").fetch_one( &self.pool).await?;
        Ok( row.get::<i64,_>( "n"))
    }

    /* #region storms *******************************************************************/

    pub async fn get_storm_by_code (&self, code: &str) -> Result<Option<Storm>> {
        let row = sqlx::query( "SELECT * FROM storms WHERE code = ?")
            .bind( code)
            .fetch_optional( &self.pool).await?;
        row.map( |r| storm_from_row( &r)).transpose()
    }

    pub async fn get_storm (&self, id: i64) -> Result<Option<Storm>> {
        let row = sqlx::query( "SELECT * FROM storms WHERE id = ?")
            .bind( id)
            .fetch_optional( &self.pool).await?;
        row.map( |r| storm_from_row( &r)).transpose()
    }

    pub async fn list_storms (&self, status: StormStatus) -> Result<Vec<Storm>> {
        let rows = sqlx::query( "SELECT * FROM storms WHERE status = ? ORDER BY code")
            .bind( status.to_string())
            .fetch_all( &self.pool).await?;
        rows.iter().map( storm_from_row).collect()
    }

    pub async fn insert_storm (&self, new: &NewStorm) -> Result<Storm> {
        let now = utc_now();
        let id = sqlx::query(
            "INSERT INTO storms (code, basin, name, status, first_seen_utc, last_seen_utc, last_status_change_utc, history_url, satellite_image_url) \
             VALUES (?,?,?,?,?,?,?,?,?)")
            .bind( &new.code)
            .bind( new.basin.to_string())
            .bind( &new.name)
            .bind( StormStatus::Active.to_string())
            .bind( now)
            .bind( now)
            .bind( now)
            .bind( &new.history_url)
            .bind( &new.satellite_image_url)
            .execute( &self.pool).await?
            .last_insert_rowid();

        self.get_storm( id).await?.ok_or_else( || TcStoreError::NoSuchStorm( new.code.clone()))
    }

    /// refresh discovery-sourced fields of an existing storm row
    pub async fn touch_storm (&self, id: i64, name: &Option<String>, satellite_image_url: &Option<String>) -> Result<()> {
        sqlx::query(
            "UPDATE storms SET \
               name = COALESCE(?, name), \
               satellite_image_url = COALESCE(?, satellite_image_url) \
             WHERE id = ?")
            .bind( name)
            .bind( satellite_image_url)
            .bind( id)
            .execute( &self.pool).await?;
        Ok(())
    }

    /// free an upstream code held by an archived storm so a new-season storm
    /// can reuse it: the archived row keeps its history under a
    /// season-qualified code. Returns the requalified code.
    pub async fn requalify_archived_code (&self, storm: &Storm) -> Result<String> {
        if storm.status != StormStatus::Archived {
            return Err( illegal_transition( format!( "{} is not archived", storm.code)))
        }
        let requalified = format!("{}-{}", storm.code, storm.last_seen_utc.format( "%Y"));

        let mut tx = self.pool.begin().await?;
        sqlx::query( "UPDATE storms SET code = ? WHERE id = ? AND status = 'archived'")
            .bind( &requalified)
            .bind( storm.id)
            .execute( &mut *tx).await?;

        let details = serde_json::json!({ "old_code": storm.code, "new_code": requalified });
        insert_audit( &mut tx, "system", "storm_code_requalified", &format!("storm:{}", storm.id), &details, utc_now()).await?;
        tx.commit().await?;

        Ok( requalified)
    }

    /// guarded state machine transition, with its audit row, in one transaction.
    /// The guard re-checks the `from` status inside the transaction so racing
    /// transitions cannot double-apply.
    pub async fn transition_status (
        &self,
        storm: &Storm,
        to: StormStatus,
        reason: &str,
        stats: Option<&ArchivalStats>,
    ) -> Result<()> {
        if !storm.status.can_transition_to( to) {
            return Err( illegal_transition( format!( "{} {} -> {}", storm.code, storm.status, to)))
        }

        let now = utc_now();
        let mut tx = self.pool.begin().await?;

        let archived_at = if to == StormStatus::Archived { Some(now) } else { None };
        let archival_reason = if to == StormStatus::Archived { Some( reason.to_string()) } else { None };

        let n = sqlx::query(
            "UPDATE storms SET status = ?, last_status_change_utc = ?, \
               archived_at_utc = COALESCE(?, archived_at_utc), \
               archival_reason = COALESCE(?, archival_reason) \
             WHERE id = ? AND status = ?")
            .bind( to.to_string())
            .bind( now)
            .bind( archived_at)
            .bind( archival_reason)
            .bind( storm.id)
            .bind( storm.status.to_string())
            .execute( &mut *tx).await?
            .rows_affected();

        if n != 1 {
            return Err( illegal_transition( format!( "{} no longer in status {}", storm.code, storm.status)))
        }

        let details = serde_json::json!({
            "storm_code": storm.code,
            "name": storm.name,
            "basin": storm.basin,
            "old_status": storm.status,
            "new_status": to,
            "reason": reason,
            "stats": stats,
        });

        insert_audit( &mut tx, "system", "storm_status_change", &format!("storm:{}", storm.id), &details, now).await?;
        tx.commit().await?;
        Ok(())
    }

    /* #endregion storms */

    /* #region advisories ***************************************************************/

    /// upsert a parsed advisory batch for one storm in a single transaction.
    /// Keyed on `(storm, issued_at)` - reprocessing the same upstream bytes is
    /// a no-op. Also advances `last_seen_utc` and the peak intensity cache.
    pub async fn upsert_advisories (&self, storm_id: i64, records: &[AdvisoryRecord]) -> Result<AdvisoryUpsert> {
        let mut summary = AdvisoryUpsert::default();
        let mut tx = self.pool.begin().await?;

        let mut peak: Option<f64> = None;

        for rec in records {
            // semantic validation: drop, count, continue
            if rec.vmax_kt.is_some_and( |v| v < 0.0) || rec.mslp_hpa.is_some_and( |p| p <= 0.0) {
                summary.dropped += 1;
                continue;
            }

            let existing: Option<i64> = sqlx::query(
                "SELECT id FROM advisories WHERE storm_id = ? AND issued_at_utc = ?")
                .bind( storm_id)
                .bind( rec.issued_at_utc)
                .fetch_optional( &mut *tx).await?
                .map( |r| r.get( "id"));

            let id = sqlx::query(
                "INSERT INTO advisories (storm_id, issued_at_utc, latitude, longitude, vmax_kt, mslp_hpa, \
                   motion_bearing_deg, motion_speed_kt, line_checksum, parser_version, raw_line) \
                 VALUES (?,?,?,?,?,?,?,?,?,?,?) \
                 ON CONFLICT(storm_id, issued_at_utc) DO UPDATE SET \
                   latitude = excluded.latitude, longitude = excluded.longitude, \
                   vmax_kt = excluded.vmax_kt, mslp_hpa = excluded.mslp_hpa, \
                   motion_bearing_deg = excluded.motion_bearing_deg, motion_speed_kt = excluded.motion_speed_kt, \
                   line_checksum = excluded.line_checksum, parser_version = excluded.parser_version, \
                   raw_line = excluded.raw_line")
                .bind( storm_id)
                .bind( rec.issued_at_utc)
                .bind( rec.position.lat_degrees())
                .bind( rec.position.lon_degrees())
                .bind( rec.vmax_kt)
                .bind( rec.mslp_hpa)
                .bind( rec.motion_bearing_deg)
                .bind( rec.motion_speed_kt)
                .bind( &rec.line_checksum)
                .bind( &rec.parser_version)
                .bind( &rec.raw_line)
                .execute( &mut *tx).await?
                .last_insert_rowid();

            if existing.is_none() {
                summary.inserted_ids.push( id);
            }
            summary.total += 1;

            if let Some(v) = rec.vmax_kt {
                peak = Some( peak.map_or( v, |p: f64| p.max(v)));
            }
            summary.latest_issued_at = summary.latest_issued_at.max( Some( rec.issued_at_utc));
        }

        if summary.total > 0 {
            // last/first seen track advisory recency, not wall clock - the
            // lifecycle staleness checks run off these
            sqlx::query(
                "UPDATE storms SET \
                   last_seen_utc = COALESCE((SELECT max(issued_at_utc) FROM advisories WHERE storm_id = ?), last_seen_utc), \
                   first_seen_utc = min( first_seen_utc, COALESCE((SELECT min(issued_at_utc) FROM advisories WHERE storm_id = ?), first_seen_utc)), \
                   peak_vmax_kt = CASE WHEN ? IS NULL THEN peak_vmax_kt ELSE max( COALESCE(peak_vmax_kt, 0.0), ?) END \
                 WHERE id = ?")
                .bind( storm_id)
                .bind( storm_id)
                .bind( peak)
                .bind( peak)
                .bind( storm_id)
                .execute( &mut *tx).await?;
        }

        tx.commit().await?;
        Ok( summary)
    }

    pub async fn advisories_for_storm (&self, storm_id: i64) -> Result<Vec<Advisory>> {
        let rows = sqlx::query( "SELECT * FROM advisories WHERE storm_id = ? ORDER BY issued_at_utc")
            .bind( storm_id)
            .fetch_all( &self.pool).await?;
        Ok( rows.iter().map( advisory_from_row).collect())
    }

    pub async fn latest_advisory (&self, storm_id: i64) -> Result<Option<Advisory>> {
        let row = sqlx::query(
            "SELECT * FROM advisories WHERE storm_id = ? ORDER BY issued_at_utc DESC LIMIT 1")
            .bind( storm_id)
            .fetch_optional( &self.pool).await?;
        Ok( row.map( |r| advisory_from_row( &r)))
    }

    /// nearest advisory within the tolerance window (radii matching)
    pub async fn advisory_near (&self, storm_id: i64, t: DateTime<Utc>, tolerance_secs: i64) -> Result<Option<Advisory>> {
        let lo = t - chrono::Duration::seconds( tolerance_secs);
        let hi = t + chrono::Duration::seconds( tolerance_secs);

        let rows = sqlx::query(
            "SELECT * FROM advisories WHERE storm_id = ? AND issued_at_utc BETWEEN ? AND ?")
            .bind( storm_id)
            .bind( lo)
            .bind( hi)
            .fetch_all( &self.pool).await?;

        let mut best: Option<Advisory> = None;
        let mut best_diff = i64::MAX;
        for r in &rows {
            let a = advisory_from_row( r);
            let diff = (a.issued_at_utc - t).num_seconds().abs();
            if diff < best_diff {
                best_diff = diff;
                best = Some(a);
            }
        }
        Ok( best)
    }

    /* #endregion advisories */

    /* #region radii ********************************************************************/

    pub async fn upsert_radii (&self, advisory_id: i64, quadrant: Quadrant, radii: &QuadrantRadii) -> Result<()> {
        if !radii.is_nested() {
            return Err( invalid_value( format!( "radii thresholds not nested for advisory {advisory_id} {quadrant}")))
        }

        sqlx::query(
            "INSERT INTO radii (advisory_id, quadrant, r34_nm, r50_nm, r64_nm) VALUES (?,?,?,?,?) \
             ON CONFLICT(advisory_id, quadrant) DO UPDATE SET \
               r34_nm = excluded.r34_nm, r50_nm = excluded.r50_nm, r64_nm = excluded.r64_nm")
            .bind( advisory_id)
            .bind( quadrant.to_string())
            .bind( radii.r34_nm)
            .bind( radii.r50_nm)
            .bind( radii.r64_nm)
            .execute( &self.pool).await?;
        Ok(())
    }

    pub async fn radii_for_advisory (&self, advisory_id: i64) -> Result<Option<RadiiSet>> {
        let rows = sqlx::query( "SELECT * FROM radii WHERE advisory_id = ?")
            .bind( advisory_id)
            .fetch_all( &self.pool).await?;

        if rows.is_empty() { return Ok( None) }

        let mut set = RadiiSet::default();
        for r in &rows {
            let q: Quadrant = r.get::<String,_>( "quadrant").parse()
                .map_err( |_| invalid_value( "bad quadrant in radii row"))?;
            *set.quadrant_mut( q) = QuadrantRadii {
                r34_nm: r.get( "r34_nm"),
                r50_nm: r.get( "r50_nm"),
                r64_nm: r.get( "r64_nm"),
            };
        }
        Ok( Some( set))
    }

    /* #endregion radii */

    /* #region forecast points **********************************************************/

    /// atomically install the ensemble-mean forecast for an issuance: rows of
    /// the same issuance are replaced, finals of older issuances are demoted to
    /// `is_final = 0` (kept for audit), and the new set is inserted as final.
    pub async fn replace_final_forecast (&self, storm_id: i64, points: &[ForecastPointRecord]) -> Result<usize> {
        let Some(issuance) = points.first().map( |p| p.issuance_time_utc) else { return Ok(0) };

        let mut tx = self.pool.begin().await?;

        sqlx::query( "DELETE FROM forecast_points WHERE storm_id = ? AND issuance_time_utc = ?")
            .bind( storm_id)
            .bind( issuance)
            .execute( &mut *tx).await?;

        sqlx::query( "UPDATE forecast_points SET is_final = 0 WHERE storm_id = ? AND is_final = 1")
            .bind( storm_id)
            .execute( &mut *tx).await?;

        let mut n = 0;
        for p in points {
            // semantic validation: negative leads and broken valid times are dropped
            if p.lead_hours < 0 { continue }
            if (p.valid_at_utc - p.issuance_time_utc).num_hours() != p.lead_hours { continue }
            if !(1..=30).contains( &p.member_count) { continue }

            let radii_json = p.radii.as_ref().map( |r| serde_json::to_string( r)).transpose()?;

            sqlx::query(
                "INSERT INTO forecast_points (storm_id, issuance_time_utc, valid_at_utc, lead_hours, \
                   latitude, longitude, vmax_kt, mslp_hpa, radii_json, member_count, source_tag, is_final) \
                 VALUES (?,?,?,?,?,?,?,?,?,?,?,1)")
                .bind( storm_id)
                .bind( p.issuance_time_utc)
                .bind( p.valid_at_utc)
                .bind( p.lead_hours)
                .bind( p.position.lat_degrees())
                .bind( p.position.lon_degrees())
                .bind( p.vmax_kt)
                .bind( p.mslp_hpa)
                .bind( radii_json)
                .bind( p.member_count)
                .bind( &p.source_tag)
                .execute( &mut *tx).await?;
            n += 1;
        }

        tx.commit().await?;
        Ok( n)
    }

    /// the current (final) forecast track in lead-time order
    pub async fn latest_final_forecast (&self, storm_id: i64) -> Result<Vec<ForecastPoint>> {
        let rows = sqlx::query(
            "SELECT * FROM forecast_points WHERE storm_id = ? AND is_final = 1 ORDER BY lead_hours")
            .bind( storm_id)
            .fetch_all( &self.pool).await?;
        rows.iter().map( forecast_point_from_row).collect()
    }

    /* #endregion forecast points */

    /* #region zones ********************************************************************/

    /// replace the whole zone set of a storm in one transaction
    pub async fn replace_zones (&self, storm_id: i64, zones: &[ZoneRecord]) -> Result<usize> {
        let now = utc_now();
        let mut tx = self.pool.begin().await?;

        sqlx::query( "DELETE FROM zones WHERE storm_id = ?")
            .bind( storm_id)
            .execute( &mut *tx).await?;

        let mut n = 0;
        for z in zones {
            if z.valid_to_utc <= z.valid_from_utc {
                return Err( invalid_value( "zone validity window is empty"))
            }
            let bbox = z.geometry.bounding_rect()
                .ok_or_else( || invalid_value( "zone geometry has no extent"))?;

            let geometry_json = multipolygon_to_geojson( &z.geometry)?;
            let parameters_json = serde_json::to_string( &z.parameters)?;

            sqlx::query(
                "INSERT INTO zones (storm_id, zone_type, generated_at_utc, valid_from_utc, valid_to_utc, \
                   geometry_json, method_version, parameters_json, min_lon, min_lat, max_lon, max_lat) \
                 VALUES (?,?,?,?,?,?,?,?,?,?,?,?)")
                .bind( storm_id)
                .bind( z.zone_type.to_string())
                .bind( now)
                .bind( z.valid_from_utc)
                .bind( z.valid_to_utc)
                .bind( geometry_json)
                .bind( &z.method_version)
                .bind( parameters_json)
                .bind( bbox.min().x)
                .bind( bbox.min().y)
                .bind( bbox.max().x)
                .bind( bbox.max().y)
                .execute( &mut *tx).await?;
            n += 1;
        }

        tx.commit().await?;
        Ok( n)
    }

    pub async fn zones_for_storm (&self, storm_id: i64) -> Result<Vec<Zone>> {
        let rows = sqlx::query(
            "SELECT * FROM zones WHERE storm_id = ? ORDER BY zone_type, valid_from_utc")
            .bind( storm_id)
            .fetch_all( &self.pool).await?;
        rows.iter().map( zone_from_row).collect()
    }

    /* #endregion zones */

    /* #region audit & alert intents ****************************************************/

    pub async fn add_audit (&self, entry: &AuditEntry) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        insert_audit( &mut tx, &entry.actor, &entry.action, &entry.entity, &entry.details, utc_now()).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn audit_entries_for (&self, entity: &str) -> Result<Vec<AuditEntry>> {
        let rows = sqlx::query(
            "SELECT * FROM audit_log WHERE entity = ? ORDER BY created_at_utc")
            .bind( entity)
            .fetch_all( &self.pool).await?;

        rows.iter().map( |r| {
            let details = r.get::<Option<String>,_>( "details_json")
                .map( |s| serde_json::from_str( &s)).transpose()?
                .unwrap_or( serde_json::Value::Null);
            Ok( AuditEntry {
                actor: r.get( "actor"),
                action: r.get( "action"),
                entity: r.get( "entity"),
                details,
            })
        }).collect()
    }

    pub async fn add_alert_intent (&self, storm_id: i64, kind: &str, payload: &serde_json::Value) -> Result<i64> {
        let id = sqlx::query(
            "INSERT INTO alert_intents (storm_id, kind, payload_json, delivery_status, created_at_utc) \
             VALUES (?,?,?,'pending',?)")
            .bind( storm_id)
            .bind( kind)
            .bind( serde_json::to_string( payload)?)
            .bind( utc_now())
            .execute( &self.pool).await?
            .last_insert_rowid();
        Ok( id)
    }

    /// intents not yet handed off by the external delivery layer - archival is
    /// blocked while any exist for the storm
    pub async fn count_pending_alert_intents (&self, storm_id: i64) -> Result<i64> {
        let row = sqlx::query(
            "SELECT count(*) AS n FROM alert_intents WHERE storm_id = ? AND delivery_status IN ('pending','sending')")
            .bind( storm_id)
            .fetch_one( &self.pool).await?;
        Ok( row.get( "n"))
    }

    /// called by the external delivery layer once intents are drained
    pub async fn mark_alert_intents_delivered (&self, storm_id: i64) -> Result<u64> {
        let n = sqlx::query(
            "UPDATE alert_intents SET delivery_status = 'delivered' WHERE storm_id = ? AND delivery_status IN ('pending','sending')")
            .bind( storm_id)
            .execute( &self.pool).await?
            .rows_affected();
        Ok( n)
    }

    /* #endregion audit & alert intents */
}

async fn insert_audit (
    tx: &mut Transaction<'_, Sqlite>,
    actor: &str, action: &str, entity: &str,
    details: &serde_json::Value,
    now: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO audit_log (actor, action, entity, details_json, created_at_utc) VALUES (?,?,?,?,?)")
        .bind( actor)
        .bind( action)
        .bind( entity)
        .bind( serde_json::to_string( details)?)
        .bind( now)
        .execute( &mut **tx).await?;
    Ok(())
}

/* #region row mapping ******************************************************************/

fn storm_from_row (r: &SqliteRow) -> Result<Storm> {
    let basin: Basin = r.get::<String,_>( "basin").parse()
        .map_err( |_| invalid_value( "bad basin in storm row"))?;
    let status: StormStatus = r.get::<String,_>( "status").parse()
        .map_err( |_| invalid_value( "bad status in storm row"))?;

    Ok( Storm {
        id: r.get( "id"),
        code: r.get( "code"),
        basin,
        name: r.get( "name"),
        status,
        first_seen_utc: r.get( "first_seen_utc"),
        last_seen_utc: r.get( "last_seen_utc"),
        last_status_change_utc: r.get( "last_status_change_utc"),
        history_url: r.get( "history_url"),
        satellite_image_url: r.get( "satellite_image_url"),
        peak_vmax_kt: r.get( "peak_vmax_kt"),
        archived_at_utc: r.get( "archived_at_utc"),
        archival_reason: r.get( "archival_reason"),
    })
}

fn advisory_from_row (r: &SqliteRow) -> Advisory {
    Advisory {
        id: r.get( "id"),
        storm_id: r.get( "storm_id"),
        issued_at_utc: r.get( "issued_at_utc"),
        position: GeoPoint::from_lon_lat_degrees( r.get( "longitude"), r.get( "latitude")),
        vmax_kt: r.get( "vmax_kt"),
        mslp_hpa: r.get( "mslp_hpa"),
        motion_bearing_deg: r.get( "motion_bearing_deg"),
        motion_speed_kt: r.get( "motion_speed_kt"),
        line_checksum: r.get( "line_checksum"),
        parser_version: r.get( "parser_version"),
        raw_line: r.get( "raw_line"),
    }
}

fn forecast_point_from_row (r: &SqliteRow) -> Result<ForecastPoint> {
    let radii = r.get::<Option<String>,_>( "radii_json")
        .map( |s| serde_json::from_str( &s)).transpose()?;

    Ok( ForecastPoint {
        id: r.get( "id"),
        storm_id: r.get( "storm_id"),
        issuance_time_utc: r.get( "issuance_time_utc"),
        valid_at_utc: r.get( "valid_at_utc"),
        lead_hours: r.get( "lead_hours"),
        position: GeoPoint::from_lon_lat_degrees( r.get( "longitude"), r.get( "latitude")),
        vmax_kt: r.get( "vmax_kt"),
        mslp_hpa: r.get( "mslp_hpa"),
        radii,
        member_count: r.get( "member_count"),
        source_tag: r.get( "source_tag"),
        is_final: r.get::<i64,_>( "is_final") != 0,
    })
}

fn zone_from_row (r: &SqliteRow) -> Result<Zone> {
    let zone_type: ZoneType = r.get::<String,_>( "zone_type").parse()
        .map_err( |_| invalid_value( "bad zone type in zone row"))?;
    let geometry = multipolygon_from_geojson( &r.get::<String,_>( "geometry_json"))?;
    let parameters = r.get::<Option<String>,_>( "parameters_json")
        .map( |s| serde_json::from_str( &s)).transpose()?
        .unwrap_or( serde_json::Value::Null);

    Ok( Zone {
        id: r.get( "id"),
        storm_id: r.get( "storm_id"),
        zone_type,
        generated_at_utc: r.get( "generated_at_utc"),
        valid_from_utc: r.get( "valid_from_utc"),
        valid_to_utc: r.get( "valid_to_utc"),
        geometry,
        method_version: r.get( "method_version"),
        parameters,
    })
}

pub fn multipolygon_to_geojson (mp: &MultiPolygon<f64>) -> Result<String> {
    let geom = geojson::Geometry::new( geojson::Value::from( mp));
    Ok( serde_json::to_string( &geom)?)
}

pub fn multipolygon_from_geojson (s: &str) -> Result<MultiPolygon<f64>> {
    let geom: geojson::Geometry = serde_json::from_str( s)?;
    MultiPolygon::try_from( geom.value)
        .map_err( |e| invalid_value( format!( "not a MultiPolygon: {e}")))
}

/* #endregion row mapping */

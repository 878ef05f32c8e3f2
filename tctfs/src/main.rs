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

//! the tctfs binary: `tctfs run` starts the pipeline daemon; the admin
//! subcommands drive single jobs inline. Exit codes: 0 success, 1 transient
//! failure, 2 permanent failure, 3 not found.

use std::path::PathBuf;
use std::process::ExitCode;

use structopt::StructOpt;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tc_job::TaskOutcome;
use tc_lifecycle::archive_storm;
use tctfs::{build_scheduler, App, TctfsConfig,
    JOB_DISCOVER, JOB_INGEST_OBSERVATIONS, JOB_REGENERATE_ZONES, JOB_UPDATE_FORECAST};

const EXIT_OK: u8 = 0;
const EXIT_TRANSIENT: u8 = 1;
const EXIT_PERMANENT: u8 = 2;
const EXIT_NOT_FOUND: u8 = 3;

#[derive(StructOpt)]
#[structopt(about = "tropical cyclone tracking and forecasting pipeline")]
struct Opt {
    /// pathname of a RON config file (environment variables override it)
    #[structopt(short, long)]
    config: Option<PathBuf>,

    #[structopt(subcommand)]
    command: Option<Command>,
}

#[derive(StructOpt)]
enum Command {
    /// run the pipeline daemon (default)
    Run,

    /// run one discovery cycle
    DiscoverNow,

    /// refetch and ingest the history file of one storm
    IngestNow { storm: String },

    /// drop the cached A-Deck validators and rebuild the mean forecast
    RebuildForecast { storm: String },

    /// recompute the watch/warning zones of one storm
    RegenerateZones { storm: String },

    /// archive one storm
    Archive {
        storm: String,
        #[structopt(long, default_value = "manual")]
        reason: String,
    },
}

#[tokio::main]
async fn main () -> ExitCode {
    let opt = Opt::from_args();

    let config = match TctfsConfig::load( opt.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            return ExitCode::from( EXIT_PERMANENT)
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter( EnvFilter::new( config.log_level.clone()))
        .init();

    let app = match App::create( config).await {
        Ok(app) => app,
        Err(e) => {
            error!("startup failed: {e}");
            return ExitCode::from( EXIT_TRANSIENT)
        }
    };

    match opt.command.unwrap_or( Command::Run) {
        Command::Run => run_daemon( app).await,
        Command::DiscoverNow => run_job( app, JOB_DISCOVER, None).await,
        Command::IngestNow { storm } => run_storm_job( app, JOB_INGEST_OBSERVATIONS, storm).await,
        Command::RebuildForecast { storm } => rebuild_forecast( app, storm).await,
        Command::RegenerateZones { storm } => run_storm_job( app, JOB_REGENERATE_ZONES, storm).await,
        Command::Archive { storm, reason } => archive_now( app, storm, reason).await,
    }
}

async fn run_daemon (app: tctfs::SharedApp) -> ExitCode {
    let mut scheduler = build_scheduler( &app);
    if let Err(e) = scheduler.start() {
        error!("scheduler start failed: {e}");
        return ExitCode::from( EXIT_PERMANENT)
    }
    info!("tctfs pipeline running");

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("signal wait failed: {e}");
    }
    scheduler.shutdown().await;
    ExitCode::from( EXIT_OK)
}

async fn run_job (app: tctfs::SharedApp, job: &str, target: Option<String>) -> ExitCode {
    let scheduler = build_scheduler( &app);
    match scheduler.run_now( job, target).await {
        Ok(outcome) => exit_for( &outcome),
        Err(e) => {
            error!("{job} failed: {e}");
            ExitCode::from( EXIT_PERMANENT)
        }
    }
}

async fn run_storm_job (app: tctfs::SharedApp, job: &str, storm: String) -> ExitCode {
    match app.store.get_storm_by_code( &storm).await {
        Ok( Some(_)) => run_job( app, job, Some( storm)).await,
        Ok( None) => {
            error!("no such storm {storm}");
            ExitCode::from( EXIT_NOT_FOUND)
        }
        Err(e) => {
            error!("store error: {e}");
            ExitCode::from( EXIT_TRANSIENT)
        }
    }
}

async fn rebuild_forecast (app: tctfs::SharedApp, storm: String) -> ExitCode {
    use chrono::Datelike;

    match app.store.get_storm_by_code( &storm).await {
        Ok( Some(s)) => {
            if let Some(num) = tc_adeck::storm_number( &s.code) {
                let url = app.config.adeck.adeck_url( s.basin, num, tc_common::datetime::utc_now().year());
                app.fetcher.forget( &url);
            }
            run_job( app, JOB_UPDATE_FORECAST, Some( storm)).await
        }
        Ok( None) => {
            error!("no such storm {storm}");
            ExitCode::from( EXIT_NOT_FOUND)
        }
        Err(e) => {
            error!("store error: {e}");
            ExitCode::from( EXIT_TRANSIENT)
        }
    }
}

async fn archive_now (app: tctfs::SharedApp, storm: String, reason: String) -> ExitCode {
    let storm = match app.store.get_storm_by_code( &storm).await {
        Ok( Some(s)) => s,
        Ok( None) => {
            error!("no such storm {storm}");
            return ExitCode::from( EXIT_NOT_FOUND)
        }
        Err(e) => {
            error!("store error: {e}");
            return ExitCode::from( EXIT_TRANSIENT)
        }
    };

    // manual archival of a still-active storm walks the legal edges
    let storm = if storm.status == tc_store::StormStatus::Active {
        if let Err(e) = app.store.transition_status( &storm, tc_store::StormStatus::Dormant, &reason, None).await {
            error!("cannot take {} dormant: {e}", storm.code);
            return ExitCode::from( EXIT_PERMANENT)
        }
        match app.store.get_storm( storm.id).await {
            Ok( Some(s)) => s,
            _ => return ExitCode::from( EXIT_TRANSIENT),
        }
    } else {
        storm
    };

    match archive_storm( &app.store, &app.events, &storm, &reason).await {
        Ok(stats) => {
            info!("archived {}: peak {:?}kt, ACE {:.2}", storm.code, stats.peak_vmax_kt, stats.ace);
            ExitCode::from( EXIT_OK)
        }
        Err(e) => {
            error!("archive failed: {e}");
            ExitCode::from( EXIT_PERMANENT)
        }
    }
}

fn exit_for (outcome: &TaskOutcome) -> ExitCode {
    match outcome {
        TaskOutcome::Completed => ExitCode::from( EXIT_OK),
        TaskOutcome::Retryable(_) | TaskOutcome::Cancelled => ExitCode::from( EXIT_TRANSIENT),
        TaskOutcome::Permanent(_) => ExitCode::from( EXIT_PERMANENT),
    }
}

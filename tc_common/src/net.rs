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

//! conditional HTTP GET support. The upstream observation site regenerates its
//! text products in place, so every poll goes out with the validators of the
//! previous fetch and a `304` short-circuits the whole pipeline cycle. The
//! validator cache is the only process wide mutable state of the fetch layer
//! and is owned by the fetcher instance - there are no module globals here.

use std::{collections::HashMap, sync::{Arc, Mutex}, time::Duration};

use chrono::{DateTime, Utc};
use reqwest::{header, Client, StatusCode};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::datetime::{secs, utc_now};

/// entity tag / modification time pair as reported by the origin
#[derive(Debug,Clone,Default,PartialEq)]
pub struct Validators {
    pub etag: Option<String>,
    pub last_modified: Option<String>,
}

impl Validators {
    pub fn is_empty (&self) -> bool { self.etag.is_none() && self.last_modified.is_none() }
}

/// what a conditional GET can come back with. Transient outcomes are eligible
/// for retry by the task runtime, permanent ones are not.
#[derive(Debug,Clone)]
pub enum FetchOutcome {
    /// origin reports no change since the cached validators
    NotModified,
    /// fresh body plus the validators to use next time
    Fetched { body: String, validators: Validators, fetched_at: DateTime<Utc> },
    /// origin reports the resource absent (a normal condition for per-storm files)
    NotFound,
    /// network trouble or 5xx - worth retrying
    Transient { reason: String },
    /// non-404 4xx or a malformed response - retrying won't help
    Permanent { reason: String },
}

impl FetchOutcome {
    pub fn is_transient (&self) -> bool { matches!( self, FetchOutcome::Transient{..}) }
}

#[derive(Debug,Clone)]
pub struct FetcherConfig {
    /// courtesy identification towards the (research) upstream
    pub user_agent: String,

    /// per-request timeout
    pub timeout: Duration,

    /// max concurrent connections per origin host
    pub max_per_origin: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        FetcherConfig {
            user_agent: "tctfs-rs/0.1 (tropical cyclone tracking pipeline)".to_string(),
            timeout: secs(30),
            max_per_origin: 1,
        }
    }
}

/// a reqwest wrapper that keeps per-URL validators and enforces a per-origin
/// connection cap. One instance is constructed at the composition root and
/// shared by all ingest tasks.
pub struct ConditionalFetcher {
    client: Client,
    validators: Mutex<HashMap<String,Validators>>,
    origins: Mutex<HashMap<String,Arc<Semaphore>>>,
    max_per_origin: usize,
}

impl ConditionalFetcher {
    pub fn new (config: FetcherConfig) -> Self {
        let client = Client::builder()
            .user_agent( config.user_agent.clone())
            .timeout( config.timeout)
            .build()
            .unwrap_or_else( |_| Client::new()); // builder only fails on TLS backend init

        ConditionalFetcher {
            client,
            validators: Mutex::new( HashMap::new()),
            origins: Mutex::new( HashMap::new()),
            max_per_origin: config.max_per_origin.max(1),
        }
    }

    /// conditional GET of a text resource. Checks the cancellation token around
    /// the request so a shutdown does not hang on a slow origin.
    pub async fn fetch_text (&self, url: &str, cancel: &CancellationToken) -> FetchOutcome {
        let _permit = {
            let sem = self.origin_semaphore( url);
            tokio::select! {
                p = sem.acquire_owned() => match p {
                    Ok(p) => p,
                    Err(_) => return FetchOutcome::Transient { reason: "origin limiter closed".to_string() },
                },
                _ = cancel.cancelled() => return FetchOutcome::Transient { reason: "cancelled".to_string() },
            }
        };

        let mut req = self.client.get( url);
        if let Some(vals) = self.cached_validators( url) {
            if let Some(etag) = &vals.etag { req = req.header( header::IF_NONE_MATCH, etag) }
            if let Some(lm) = &vals.last_modified { req = req.header( header::IF_MODIFIED_SINCE, lm) }
        }

        // the permit spans request and body read so one slow transfer cannot
        // stack further connections onto the origin
        let response = tokio::select! {
            r = req.send() => r,
            _ = cancel.cancelled() => return FetchOutcome::Transient { reason: "cancelled".to_string() },
        };

        let response = match response {
            Ok(r) => r,
            Err(e) => return classify_request_error( url, e),
        };

        match response.status() {
            StatusCode::NOT_MODIFIED => {
                debug!("{} not modified", url);
                FetchOutcome::NotModified
            }
            StatusCode::NOT_FOUND => {
                debug!("{} not found", url);
                FetchOutcome::NotFound
            }
            s if s.is_success() => {
                let validators = Validators {
                    etag: header_str( &response, header::ETAG),
                    last_modified: header_str( &response, header::LAST_MODIFIED),
                };
                match response.text().await {
                    Ok(body) => {
                        self.store_validators( url, validators.clone());
                        FetchOutcome::Fetched { body, validators, fetched_at: utc_now() }
                    }
                    Err(e) => FetchOutcome::Transient { reason: format!("body read failed: {e}") },
                }
            }
            s if s.is_server_error() => {
                warn!("{} upstream error {}", url, s);
                FetchOutcome::Transient { reason: format!("status {s}") }
            }
            s => FetchOutcome::Permanent { reason: format!("status {s}") },
        }
    }

    pub fn cached_validators (&self, url: &str) -> Option<Validators> {
        self.validators.lock().unwrap().get( url).cloned()
    }

    /// drop cached validators so the next poll re-fetches unconditionally
    /// (admin rebuild path)
    pub fn forget (&self, url: &str) {
        self.validators.lock().unwrap().remove( url);
    }

    pub fn cache_len (&self) -> usize {
        self.validators.lock().unwrap().len()
    }

    fn store_validators (&self, url: &str, vals: Validators) {
        if !vals.is_empty() {
            self.validators.lock().unwrap().insert( url.to_string(), vals);
        }
    }

    fn origin_semaphore (&self, url: &str) -> Arc<Semaphore> {
        let origin = Url::parse( url).ok()
            .and_then( |u| u.host_str().map( |h| h.to_string()))
            .unwrap_or_else( || url.to_string());

        let mut origins = self.origins.lock().unwrap();
        origins.entry( origin)
            .or_insert_with( || Arc::new( Semaphore::new( self.max_per_origin)))
            .clone()
    }
}

fn header_str (response: &reqwest::Response, name: header::HeaderName) -> Option<String> {
    response.headers().get( name).and_then( |v| v.to_str().ok()).map( |s| s.to_string())
}

fn classify_request_error (url: &str, e: reqwest::Error) -> FetchOutcome {
    if e.is_timeout() || e.is_connect() || e.is_request() {
        debug!("{} transient fetch error: {}", url, e);
        FetchOutcome::Transient { reason: e.to_string() }
    } else {
        warn!("{} permanent fetch error: {}", url, e);
        FetchOutcome::Permanent { reason: e.to_string() }
    }
}

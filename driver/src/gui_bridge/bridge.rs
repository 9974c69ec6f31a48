use crate::gui_bridge::model::VisualizationModel;
use crate::workflow::runner::Runner;
use anyhow::Result;
use aperturecore::{Profile, SweepConfig};
use log::{error, info, warn};
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, PoisonError, RwLock},
    thread,
};
use tokio::runtime::Builder;
use warp::{http::StatusCode, Filter};

pub fn gui_bind_address(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

#[derive(Debug)]
struct WarpError;

impl warp::reject::Reject for WarpError {}

/// Recomputes the sweep over `profile` and stores it; returns the entry and
/// point counts, mirrored copies included.
fn apply_sweep(
    state: &RwLock<VisualizationModel>,
    runner: &Runner,
    profile: &Profile,
    config: &SweepConfig,
) -> Result<(usize, usize)> {
    let sweep = runner.sweep(profile, config)?;
    let counts = (sweep.entries.len(), sweep.point_count());
    let mut guard = state.write().unwrap_or_else(PoisonError::into_inner);
    guard.style = config.style;
    guard.sweep = sweep;
    Ok(counts)
}

/// Holds the latest sweep for an external renderer and serves it over HTTP.
pub struct GuiBridge {
    state: Arc<RwLock<VisualizationModel>>,
    runner: Arc<Runner>,
    profile: Arc<Profile>,
}

impl GuiBridge {
    pub fn new(runner: Arc<Runner>, profile: Arc<Profile>) -> Self {
        Self {
            state: Arc::new(RwLock::new(VisualizationModel::default())),
            runner,
            profile,
        }
    }

    pub fn publish(&self, model: &VisualizationModel) -> Result<()> {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *guard = model.clone();
        info!(
            "[GUI] sweep entries: {}, points: {}, loss markers: {}",
            guard.sweep.entries.len(),
            guard.sweep.point_count(),
            guard.losses.len()
        );
        Ok(())
    }

    pub fn publish_status(&self, message: &str) {
        info!("[GUI] {}", message);
    }

    /// Starts the HTTP endpoint on its own thread and runtime.
    ///
    /// `GET /payload` returns the current model; `POST /sweep` takes a
    /// sweep configuration and recomputes over the loaded profile.
    pub fn serve(&self, address: SocketAddr) -> thread::JoinHandle<()> {
        let state = self.state.clone();
        let state_filter = warp::any().map(move || state.clone());
        let runner = self.runner.clone();
        let runner_filter = warp::any().map(move || runner.clone());
        let profile = self.profile.clone();
        let profile_filter = warp::any().map(move || profile.clone());

        let get_route = warp::path("payload")
            .and(warp::get())
            .and(state_filter.clone())
            .map(|state: Arc<RwLock<VisualizationModel>>| {
                warp::reply::json(&*state.read().unwrap_or_else(PoisonError::into_inner))
            });

        let sweep_route = warp::path("sweep")
            .and(warp::post())
            .and(warp::body::json())
            .and(state_filter)
            .and(runner_filter)
            .and(profile_filter)
            .and_then(
                |config: SweepConfig,
                 state: Arc<RwLock<VisualizationModel>>,
                 runner: Arc<Runner>,
                 profile: Arc<Profile>| async move {
                    match apply_sweep(&state, &runner, &profile, &config) {
                        Ok((entries, points)) => Ok::<_, warp::Rejection>(warp::reply::with_status(
                            warp::reply::json(&json!({
                                "status": "ok",
                                "entries": entries,
                                "points": points
                            })),
                            StatusCode::OK,
                        )),
                        Err(err) => {
                            warn!("sweep request failed: {err:#}");
                            Err(warp::reject::custom(WarpError))
                        }
                    }
                },
            );

        thread::spawn(move || {
            let routes = get_route.or(sweep_route);
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!("failed to build bridge runtime: {err}");
                    return;
                }
            };
            runtime.block_on(async move {
                warp::serve(routes).run(address).await;
            });
        })
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> VisualizationModel {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

use std::time::Duration;

use geo_types::Point;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::entities::{Coordinates, RouteGeometry};

/// Routes shorter than this are treated as "already there": the marker is
/// placed at the start and no animation frames are scheduled.
pub const MIN_ROUTE_KM: f64 = 0.001;

/// Wall-clock length of the full marker animation, independent of any real
/// movement telemetry. This is a demo-grade projection, not GPS tracking.
pub const ANIMATION_DURATION_SECS: u64 = 30;

const FRAME_INTERVAL_MS: u64 = 50;
const EARTH_RADIUS_KM: f64 = 6371.0;

pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let from: Point<f64> = a.into();
    let to: Point<f64> = b.into();

    let lat_a = from.y().to_radians();
    let lat_b = to.y().to_radians();
    let d_lat = (to.y() - from.y()).to_radians();
    let d_lon = (to.x() - from.x()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

pub fn path_length_km(points: &[Coordinates]) -> f64 {
    points
        .windows(2)
        .map(|pair| haversine_km(pair[0], pair[1]))
        .sum()
}

/// Distance covered along the route after `elapsed` seconds of a
/// `duration`-second animation: `total * min(elapsed / duration, 1)`.
pub fn distance_at(elapsed_secs: f64, duration_secs: f64, total_km: f64) -> f64 {
    if duration_secs <= 0.0 {
        return total_km;
    }

    total_km * (elapsed_secs / duration_secs).min(1.0)
}

/// Resamples the point on the polyline at `distance_km` from its start,
/// interpolating linearly within a segment. Clamps to the endpoints.
pub fn point_at_distance(points: &[Coordinates], distance_km: f64) -> Option<Coordinates> {
    let first = points.first()?;

    if distance_km <= 0.0 {
        return Some(*first);
    }

    let mut covered = 0.0;

    for pair in points.windows(2) {
        let segment = haversine_km(pair[0], pair[1]);

        if covered + segment >= distance_km && segment > 0.0 {
            let fraction = (distance_km - covered) / segment;

            let from: Point<f64> = pair[0].into();
            let to: Point<f64> = pair[1].into();

            return Some(Coordinates {
                latitude: from.y() + (to.y() - from.y()) * fraction,
                longitude: from.x() + (to.x() - from.x()) * fraction,
            });
        }

        covered += segment;
    }

    points.last().copied()
}

/// A running marker animation. The frame task is the scoped resource here:
/// it is aborted when the projection is dropped, so replacing a projection
/// for a new start/destination pair always cancels the in-flight one.
pub struct Projection {
    position: watch::Receiver<Coordinates>,
    handle: Option<JoinHandle<()>>,
}

impl Projection {
    #[tracing::instrument(skip(route))]
    pub fn start(route: RouteGeometry, duration: Duration) -> Self {
        let start = route.points.first().copied().unwrap_or(Coordinates {
            latitude: 0.0,
            longitude: 0.0,
        });

        let (sender, receiver) = watch::channel(start);

        let total_km = path_length_km(&route.points);

        if total_km < MIN_ROUTE_KM {
            tracing::info!("route is degenerate, placing marker at start");

            return Self {
                position: receiver,
                handle: None,
            };
        }

        let handle = tokio::spawn(async move {
            let started = tokio::time::Instant::now();
            let mut frames =
                tokio::time::interval(Duration::from_millis(FRAME_INTERVAL_MS));

            loop {
                frames.tick().await;

                let elapsed = started.elapsed().as_secs_f64();
                let covered = distance_at(elapsed, duration.as_secs_f64(), total_km);

                let marker = match point_at_distance(&route.points, covered) {
                    Some(marker) => marker,
                    None => break,
                };

                if sender.send(marker).is_err() {
                    break;
                }

                if elapsed >= duration.as_secs_f64() {
                    break;
                }
            }
        });

        Self {
            position: receiver,
            handle: Some(handle),
        }
    }

    pub fn position(&self) -> watch::Receiver<Coordinates> {
        self.position.clone()
    }

    pub fn is_animating(&self) -> bool {
        match &self.handle {
            Some(handle) => !handle.is_finished(),
            None => false,
        }
    }
}

impl Drop for Projection {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

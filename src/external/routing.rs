use serde::{Deserialize, Serialize};
use std::env;

use crate::{
    entities::{Coordinates, RouteGeometry},
    error::{invalid_input_error, upstream_error, Error},
};

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Response {
    code: String,
    routes: Option<Vec<RouteLeg>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct RouteLeg {
    // meters
    distance: f64,
    geometry: Geometry,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Geometry {
    // geojson order: [longitude, latitude]
    coordinates: Vec<[f64; 2]>,
}

/// Fetches the driving polyline between two points from the routing
/// provider. Only the ordered geometry and the total distance are consumed;
/// turn-by-turn data is ignored.
#[tracing::instrument]
pub async fn fetch_route(
    origin: Coordinates,
    destination: Coordinates,
) -> Result<RouteGeometry, Error> {
    let api_base = env::var("ROUTING_API_BASE")?;
    let key = env::var("ROUTING_API_KEY")?;

    let url = format!(
        "https://{}/route/v1/driving/{},{};{},{}",
        api_base,
        origin.longitude,
        origin.latitude,
        destination.longitude,
        destination.latitude
    );

    let res = reqwest::Client::new()
        .get(url)
        .query(&[("key", key)])
        .query(&[("geometries", "geojson"), ("overview", "full")])
        .send()
        .await?;

    let status_code = res.status().as_u16();

    if status_code >= 400 && status_code < 500 {
        return Err(invalid_input_error());
    } else if status_code != 200 {
        return Err(upstream_error());
    }

    let data: Response = res.json().await?;

    geometry_from(data)
}

fn geometry_from(data: Response) -> Result<RouteGeometry, Error> {
    if data.code != "Ok" {
        return Err(upstream_error());
    }

    let leg = data
        .routes
        .and_then(|mut routes| {
            if routes.is_empty() {
                None
            } else {
                Some(routes.remove(0))
            }
        })
        .ok_or_else(|| upstream_error())?;

    let points = leg
        .geometry
        .coordinates
        .iter()
        .map(|pair| Coordinates {
            latitude: pair[1],
            longitude: pair[0],
        })
        .collect();

    Ok(RouteGeometry::new(points, leg.distance / 1000.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_geojson_coordinate_order_and_meters() {
        let data: Response = serde_json::from_value(serde_json::json!({
            "code": "Ok",
            "routes": [{
                "distance": 2500.0,
                "geometry": {
                    "coordinates": [[-74.0, 40.72], [-73.99, 40.73]]
                }
            }]
        }))
        .unwrap();

        let route = geometry_from(data).unwrap();

        assert_eq!(route.distance_km, 2.5);
        assert_eq!(route.points[0].latitude, 40.72);
        assert_eq!(route.points[0].longitude, -74.0);
    }

    #[test]
    fn refuses_an_unroutable_response() {
        let data: Response = serde_json::from_value(serde_json::json!({
            "code": "NoRoute",
            "routes": []
        }))
        .unwrap();

        assert!(geometry_from(data).is_err());
    }
}

//! HTTP handler functions for the proximity API.

use actix_web::{HttpResponse, web};
use proximity_amenity_models::AmenityCategory;
use proximity_crossfilter::{CrossfilterError, Stimulus};
use proximity_dataset::geometry::to_feature_collection;
use proximity_server_models::{ApiAmenity, ApiDispatchResponse, ApiError, ApiEvent, ApiHealth};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/amenities`
///
/// Returns the amenity dropdown entries in display order.
pub async fn amenities() -> HttpResponse {
    let entries: Vec<ApiAmenity> = AmenityCategory::all()
        .iter()
        .copied()
        .map(ApiAmenity::from)
        .collect();

    HttpResponse::Ok().json(entries)
}

/// `GET /api/selection`
pub async fn selection(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.controller().selection())
}

/// `GET /api/map`
///
/// Returns the current choropleth values, highlight mask and destination
/// markers.
pub async fn map(state: web::Data<AppState>) -> HttpResponse {
    let controller = state.controller();
    HttpResponse::Ok().json(controller.map())
}

/// `GET /api/distribution`
///
/// Returns the ECDF curve for the selected amenity.
pub async fn distribution(state: web::Data<AppState>) -> HttpResponse {
    let controller = state.controller();
    HttpResponse::Ok().json(controller.distribution())
}

/// `GET /api/blocks`
///
/// Returns block outlines as a `GeoJSON` `FeatureCollection` keyed by GEOID.
pub async fn blocks(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(to_feature_collection(state.store.geometry()))
}

/// `POST /api/events`
///
/// Applies a batch of UI events. Every event is validated before any is
/// applied, so a bad event rejects the whole batch and leaves the
/// selection untouched.
pub async fn events(
    state: web::Data<AppState>,
    body: web::Json<Vec<ApiEvent>>,
) -> HttpResponse {
    let stimuli = match body
        .into_inner()
        .into_iter()
        .map(ApiEvent::into_stimulus)
        .collect::<Result<Vec<Stimulus>, _>>()
    {
        Ok(stimuli) => stimuli,
        Err(e) => {
            log::warn!("Rejected event batch: {e}");
            return error_response(&e);
        }
    };

    let mut controller = state.controller();
    match controller.dispatch_batch(&stimuli) {
        Ok(rebuilt) => HttpResponse::Ok().json(ApiDispatchResponse {
            selection: controller.selection(),
            rebuilt,
        }),
        Err(e) => {
            log::error!("Failed to apply event batch: {e}");
            error_response(&e)
        }
    }
}

fn error_response(e: &CrossfilterError) -> HttpResponse {
    let body = ApiError {
        error: e.to_string(),
    };
    if e.is_validation() {
        HttpResponse::BadRequest().json(body)
    } else {
        HttpResponse::InternalServerError().json(body)
    }
}

//! API-facing request/response models.
//!
//! A transport-neutral JSON surface: hosts put these types behind whatever
//! HTTP layer they run and map [`ApiError::http_status`] onto the response.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{
    Alert, AlertFilter, AlertSummary, EngineError, EquipmentStore, ErrorKind, MaintenanceEngine,
    MeterState, PartInstance, ServiceCompletion, ServiceHistory, ServiceRecord, UnitId, UnitKey,
    UnitKind,
};

/// Service completion payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteServiceRequest {
    /// Kind of the serviced unit.
    pub unit_kind: UnitKind,
    /// Identifier of the serviced unit.
    pub unit_id: UnitId,
    /// Meter value at the time of service.
    pub service_meter: f64,
    /// Next threshold; omitted or null clears scheduling.
    #[serde(default)]
    pub next_threshold: Option<f64>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Who performed the service.
    pub performed_by: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub service_date: String,
}

impl From<CompleteServiceRequest> for ServiceCompletion {
    fn from(req: CompleteServiceRequest) -> Self {
        Self {
            unit: UnitKey::new(req.unit_kind, req.unit_id),
            service_meter: req.service_meter,
            next_threshold: req.next_threshold,
            notes: req.notes,
            performed_by: req.performed_by,
            service_date: req.service_date,
        }
    }
}

/// One API call, tagged by `op`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ApiRequest {
    /// Log a service and rebase the unit.
    CompleteService(CompleteServiceRequest),
    /// Attach a part instance to a vehicle.
    FitItem {
        /// Part instance.
        instance_id: UnitId,
        /// Target vehicle.
        vehicle_id: UnitId,
    },
    /// Return a part instance to stock.
    UnfitItem {
        /// Part instance.
        instance_id: UnitId,
    },
    /// Full sorted alert list.
    ListAlerts(AlertFilter),
    /// Urgent alert feed.
    ListUrgentAlerts,
    /// Alert counts per kind.
    AlertSummary,
    /// Meter fields of one unit.
    GetMeterState {
        /// Unit kind.
        unit_kind: UnitKind,
        /// Unit identifier.
        unit_id: UnitId,
    },
    /// Move a meter forward.
    AdvanceMeter {
        /// Unit kind.
        unit_kind: UnitKind,
        /// Unit identifier.
        unit_id: UnitId,
        /// New reading.
        new_reading: f64,
    },
    /// Replace or clear a threshold.
    SetThreshold {
        /// Unit kind.
        unit_kind: UnitKind,
        /// Unit identifier.
        unit_id: UnitId,
        /// New threshold; null clears it.
        #[serde(default)]
        threshold: Option<f64>,
    },
    /// In-stock part instances.
    ListAvailable,
    /// Part instances fitted to a vehicle.
    ListFittedTo {
        /// Vehicle identifier.
        vehicle_id: UnitId,
    },
    /// Liveness check.
    Health,
}

/// Alert listing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsResponse {
    /// Number of alerts.
    pub count: usize,
    /// Sorted alerts.
    pub alerts: Vec<Alert>,
}

impl From<Vec<Alert>> for AlertsResponse {
    fn from(alerts: Vec<Alert>) -> Self {
        Self {
            count: alerts.len(),
            alerts,
        }
    }
}

/// Error body returned to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error kind tag.
    pub kind: ErrorKind,
    /// Human-readable context.
    pub message: String,
    /// HTTP status code for this kind.
    pub http_status: u16,
}

impl ApiError {
    /// HTTP status code for an error kind.
    pub const fn status_for(kind: ErrorKind) -> u16 {
        match kind {
            ErrorKind::InvalidArgument => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::InvalidState => 422,
            ErrorKind::Backend => 500,
        }
    }

    fn malformed(message: String) -> Self {
        Self {
            kind: ErrorKind::InvalidArgument,
            message,
            http_status: Self::status_for(ErrorKind::InvalidArgument),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        let kind = err.kind();
        Self {
            kind,
            message: err.to_string(),
            http_status: Self::status_for(kind),
        }
    }
}

/// Response envelope: status code plus JSON body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// JSON body: the result on success, an [`ApiError`] otherwise.
    pub body: Value,
}

/// Health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// Healthy flag.
    pub ok: bool,
}

/// Return a health payload.
pub const fn health() -> Health {
    Health { ok: true }
}

/// Log a service.
///
/// # Errors
///
/// The engine error mapped to an [`ApiError`].
pub fn complete_service<S, H>(
    engine: &MaintenanceEngine<S, H>,
    req: CompleteServiceRequest,
) -> Result<ServiceRecord, ApiError>
where
    S: EquipmentStore,
    H: ServiceHistory,
{
    Ok(engine.complete_service(&req.into())?)
}

/// Fit a part instance.
///
/// # Errors
///
/// The engine error mapped to an [`ApiError`].
pub fn fit_item<S, H>(
    engine: &MaintenanceEngine<S, H>,
    instance_id: &str,
    vehicle_id: &str,
) -> Result<PartInstance, ApiError>
where
    S: EquipmentStore,
    H: ServiceHistory,
{
    Ok(engine.fit_item(instance_id, vehicle_id)?)
}

/// Unfit a part instance.
///
/// # Errors
///
/// The engine error mapped to an [`ApiError`].
pub fn unfit_item<S, H>(
    engine: &MaintenanceEngine<S, H>,
    instance_id: &str,
) -> Result<PartInstance, ApiError>
where
    S: EquipmentStore,
    H: ServiceHistory,
{
    Ok(engine.unfit_item(instance_id)?)
}

/// Full alert list.
pub fn list_alerts<S, H>(engine: &MaintenanceEngine<S, H>, filter: &AlertFilter) -> AlertsResponse
where
    S: EquipmentStore,
    H: ServiceHistory,
{
    engine.list_alerts(filter).into()
}

/// Urgent alert feed.
pub fn list_urgent_alerts<S, H>(engine: &MaintenanceEngine<S, H>) -> AlertsResponse
where
    S: EquipmentStore,
    H: ServiceHistory,
{
    engine.list_urgent_alerts().into()
}

fn to_body<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError {
        kind: ErrorKind::Backend,
        message: format!("cannot encode response: {e}"),
        http_status: ApiError::status_for(ErrorKind::Backend),
    })
}

/// Execute one request against the engine.
///
/// # Errors
///
/// The engine error mapped to an [`ApiError`].
pub fn handle<S, H>(engine: &MaintenanceEngine<S, H>, req: ApiRequest) -> Result<Value, ApiError>
where
    S: EquipmentStore,
    H: ServiceHistory,
{
    match req {
        ApiRequest::CompleteService(body) => to_body(&complete_service(engine, body)?),
        ApiRequest::FitItem {
            instance_id,
            vehicle_id,
        } => to_body(&fit_item(engine, &instance_id, &vehicle_id)?),
        ApiRequest::UnfitItem { instance_id } => to_body(&unfit_item(engine, &instance_id)?),
        ApiRequest::ListAlerts(filter) => to_body(&list_alerts(engine, &filter)),
        ApiRequest::ListUrgentAlerts => to_body(&list_urgent_alerts(engine)),
        ApiRequest::AlertSummary => to_body::<AlertSummary>(&engine.alert_summary()),
        ApiRequest::GetMeterState { unit_kind, unit_id } => {
            let state: MeterState = engine.get_meter_state(&UnitKey::new(unit_kind, unit_id))?;
            to_body(&state)
        }
        ApiRequest::AdvanceMeter {
            unit_kind,
            unit_id,
            new_reading,
        } => to_body(&engine.advance_meter(&UnitKey::new(unit_kind, unit_id), new_reading)?),
        ApiRequest::SetThreshold {
            unit_kind,
            unit_id,
            threshold,
        } => to_body(&engine.set_threshold(&UnitKey::new(unit_kind, unit_id), threshold)?),
        ApiRequest::ListAvailable => to_body(&engine.list_available()),
        ApiRequest::ListFittedTo { vehicle_id } => to_body(&engine.list_fitted_to(&vehicle_id)),
        ApiRequest::Health => to_body(&health()),
    }
}

/// Decode a JSON request, execute it, and encode the outcome.
pub fn handle_json<S, H>(engine: &MaintenanceEngine<S, H>, body: &str) -> ApiResponse
where
    S: EquipmentStore,
    H: ServiceHistory,
{
    let outcome = serde_json::from_str::<ApiRequest>(body)
        .map_err(|e| ApiError::malformed(format!("malformed request: {e}")))
        .and_then(|req| handle(engine, req));

    match outcome {
        Ok(body) => ApiResponse { status: 200, body },
        Err(err) => ApiResponse {
            status: err.http_status,
            body: serde_json::to_value(&err).unwrap_or(Value::Null),
        },
    }
}

use crate::db::VehicleStore;
use crate::service::{ServiceError, VehicleService};
use crate::types::Vehicle;
use log::{debug, error, info, warn};
use percent_encoding::percent_decode_str;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::Mutex;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

pub type SharedService<S> = Arc<Mutex<VehicleService<S>>>;

const MAX_BODY_BYTES: u64 = 16 * 1024;

impl warp::reject::Reject for ServiceError {}

#[derive(Debug)]
struct InvalidVehicle(&'static str);

impl warp::reject::Reject for InvalidVehicle {}

#[derive(Serialize)]
struct ErrorBody {
    erro: String,
}

pub fn routes<S>(
    service: SharedService<S>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone
where
    S: VehicleStore + Send + 'static,
{
    let list = warp::path!("api" / "veiculos")
        .and(warp::get())
        .and(with_service(service.clone()))
        .and_then(list_vehicles);
    let find = warp::path!("api" / "veiculos" / String)
        .and(warp::get())
        .and(with_service(service.clone()))
        .and_then(find_vehicle);
    let create = warp::path!("api" / "veiculos")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with_service(service.clone()))
        .and_then(create_vehicle);
    let delete = warp::path!("api" / "veiculos" / String)
        .and(warp::delete())
        .and(with_service(service.clone()))
        .and_then(delete_vehicle);
    let fine = warp::path!("api" / "veiculos" / String / "multas")
        .and(warp::put())
        .and(with_service(service))
        .and_then(add_fine);

    list.or(find)
        .or(create)
        .or(delete)
        .or(fine)
        .recover(handle_rejection)
}

/// Plates arrive as raw path segments; `ABC%201234` names the plate `ABC 1234`.
fn decode_plate(raw: &str) -> Result<String, Rejection> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|plate| plate.into_owned())
        .map_err(|_| warp::reject::custom(InvalidVehicle("placa não é UTF-8 válido")))
}

fn with_service<S: Send>(
    service: SharedService<S>,
) -> impl Filter<Extract = (SharedService<S>,), Error = Infallible> + Clone {
    warp::any().map(move || service.clone())
}

async fn list_vehicles<S: VehicleStore>(
    service: SharedService<S>,
) -> Result<impl Reply, Rejection> {
    debug!("Listing all registered vehicles");
    let vehicles = service
        .lock()
        .await
        .list_all()
        .map_err(warp::reject::custom)?;
    info!("{} vehicle(s) registered", vehicles.len());
    Ok(warp::reply::json(&vehicles))
}

async fn find_vehicle<S: VehicleStore>(
    plate: String,
    service: SharedService<S>,
) -> Result<impl Reply, Rejection> {
    let plate = decode_plate(&plate)?;
    let vehicles = service
        .lock()
        .await
        .find_by_plate(&plate)
        .map_err(warp::reject::custom)?;
    debug!("Looked up vehicle {:?}", vehicles);
    Ok(warp::reply::json(&vehicles))
}

async fn create_vehicle<S: VehicleStore>(
    vehicle: Vehicle,
    service: SharedService<S>,
) -> Result<impl Reply, Rejection> {
    debug!("Vehicle to register: {:?}", vehicle);
    if vehicle.plate.trim().is_empty() {
        return Err(warp::reject::custom(InvalidVehicle("placa é obrigatória")));
    }
    // The plate is echoed back in the Location header.
    if vehicle.plate.chars().any(char::is_control) {
        return Err(warp::reject::custom(InvalidVehicle(
            "placa contém caracteres de controle",
        )));
    }
    let vehicle = service
        .lock()
        .await
        .create(vehicle)
        .map_err(warp::reject::custom)?;
    info!("Vehicle registered: {:?}", vehicle);
    let reply = warp::reply::with_status(warp::reply::json(&vehicle), StatusCode::CREATED);
    Ok(warp::reply::with_header(reply, "location", vehicle.plate))
}

async fn delete_vehicle<S: VehicleStore>(
    plate: String,
    service: SharedService<S>,
) -> Result<impl Reply, Rejection> {
    let plate = decode_plate(&plate)?;
    service
        .lock()
        .await
        .delete(&plate)
        .map_err(warp::reject::custom)?;
    debug!("Vehicle deleted: {}", plate);
    Ok(StatusCode::NO_CONTENT)
}

async fn add_fine<S: VehicleStore>(
    plate: String,
    service: SharedService<S>,
) -> Result<impl Reply, Rejection> {
    let plate = decode_plate(&plate)?;
    let vehicle = service
        .lock()
        .await
        .add_fine(&plate)
        .map_err(warp::reject::custom)?;
    debug!("Fine added to vehicle: {:?}", vehicle);
    Ok(warp::reply::json(&vehicle))
}

/// Translates every rejection into a status code and an `{"erro": ...}` body.
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if let Some(e) = err.find::<ServiceError>() {
        match e {
            ServiceError::AlreadyExists(_) => {
                (StatusCode::CONFLICT, "Registro já cadastrado!".to_string())
            }
            ServiceError::NotFound(_) => {
                (StatusCode::NOT_FOUND, "Registro não encontrado!".to_string())
            }
            ServiceError::HasFines(_) => (
                StatusCode::LOCKED,
                "Veículo possui multas e não pode ser excluído!".to_string(),
            ),
            ServiceError::FineLimit(_) => (
                StatusCode::CONFLICT,
                "Limite de multas do veículo atingido!".to_string(),
            ),
            ServiceError::Storage(cause) => {
                error!("Storage failure: {}", cause);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Erro interno!".to_string(),
                )
            }
        }
    } else if let Some(InvalidVehicle(detail)) = err.find::<InvalidVehicle>() {
        (
            StatusCode::BAD_REQUEST,
            format!("Requisição inválida: {}", detail),
        )
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        warn!("Rejected request body: {}", e);
        (
            StatusCode::BAD_REQUEST,
            format!("Requisição inválida: {}", e),
        )
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Recurso não encontrado!".to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "Método não permitido!".to_string(),
        )
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            "Requisição muito grande!".to_string(),
        )
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        (
            StatusCode::LENGTH_REQUIRED,
            "Cabeçalho Content-Length obrigatório!".to_string(),
        )
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Tipo de conteúdo não suportado!".to_string(),
        )
    } else {
        error!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Erro interno!".to_string(),
        )
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&ErrorBody { erro: message }),
        status,
    ))
}

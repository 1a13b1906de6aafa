use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};

use serde::Deserialize;
use rs_seg_core::io::list_files;
use rs_seg_core::io::{load_binary, load_text};
use rs_seg_core::model::hierarchy::Hierarchy;
use rs_seg_core::model::segmentation_input::SegmentationInput;
use rs_seg_core::model::segmenter::Segmenter;

/// Struct representing query parameters for the `/v1/train` endpoint
#[derive(Deserialize)]
struct TrainParams {
	name: String,
	depth: Option<usize>,
	binary: Option<bool>,
}

/// Struct representing query parameters for the `/v1/predict` endpoint
#[derive(Deserialize)]
struct PredictParams {
	context: String,
}

/// Struct representing query parameters for the `/v1/evaluate` endpoint
#[derive(Deserialize)]
struct EvaluateParams {
	name: String,
	binary: Option<bool>,
	limit: Option<usize>,
}

struct SharedData {
	hierarchy: Option<Hierarchy>,
}

/// Builds a segmenter from optional query parameters.
fn make_segmenter(depth: Option<usize>, binary: bool, limit: Option<usize>) -> Result<Segmenter, String> {
	let mut input = SegmentationInput::new();
	if let Some(depth) = depth {
		input.set_max_depth(depth)?;
	}
	if let Some(limit) = limit {
		input.eval_limit = limit;
	}
	input.binary = binary;
	Ok(Segmenter::new(input))
}

/// HTTP PUT endpoint `/v1/train`
///
/// Builds a hierarchy from a corpus in `./data` (reusing the postcard cache
/// when one exists) and installs it as the shared model.
#[put("/v1/train")]
async fn put_train(data: web::Data<Mutex<SharedData>>, query: web::Query<TrainParams>) -> impl Responder {
	let binary = query.binary.unwrap_or(false);

	let segmenter = match make_segmenter(query.depth, binary, None) {
		Ok(s) => s,
		Err(e) => return HttpResponse::BadRequest().body(e),
	};

	let corpus_path = format!("./data/{}.txt", query.name);
	let hierarchy = match segmenter.load_or_build(&corpus_path) {
		Ok(h) => h,
		Err(e) => return HttpResponse::InternalServerError().body(format!("Failed to build hierarchy: {e}")),
	};

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Hierarchy lock failed"),
	};
	shared_data.hierarchy = Some(hierarchy);

	HttpResponse::Ok().body("Hierarchy trained successfully")
}

/// HTTP GET endpoint `/v1/predict`
///
/// Predicts the next symbol after an ongoing context. A trained hierarchy
/// that abstains yields 404 so callers can treat it as a non-match.
#[get("/v1/predict")]
async fn get_predict(data: web::Data<Mutex<SharedData>>, query: web::Query<PredictParams>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Hierarchy lock failed"),
	};

	let hierarchy = match &shared_data.hierarchy {
		Some(h) => h,
		None => return HttpResponse::BadRequest().body("No hierarchy trained"),
	};

	match hierarchy.predict(&query.context) {
		Some(symbol) => HttpResponse::Ok().body(symbol.to_string()),
		None => HttpResponse::NotFound().body("No prediction"),
	}
}

/// HTTP GET endpoint `/v1/evaluate`
///
/// Evaluates the trained hierarchy against a held-out corpus from `./data`
/// and reports the match count and proportion.
#[get("/v1/evaluate")]
async fn get_evaluate(data: web::Data<Mutex<SharedData>>, query: web::Query<EvaluateParams>) -> impl Responder {
	let binary = query.binary.unwrap_or(false);

	let segmenter = match make_segmenter(None, binary, query.limit) {
		Ok(s) => s,
		Err(e) => return HttpResponse::BadRequest().body(e),
	};

	let corpus_path = format!("./data/{}.txt", query.name);
	let held_out = if binary {
		load_binary(&corpus_path)
	} else {
		load_text(&corpus_path)
	};
	let held_out = match held_out {
		Ok(d) => d,
		Err(e) => return HttpResponse::InternalServerError().body(format!("Failed to load corpus: {e}")),
	};

	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Hierarchy lock failed"),
	};

	let hierarchy = match &shared_data.hierarchy {
		Some(h) => h,
		None => return HttpResponse::BadRequest().body("No hierarchy trained"),
	};

	match segmenter.prediction(&held_out, hierarchy) {
		Ok(outcome) => HttpResponse::Ok().body(format!(
			"Matches: {}\nProportion: {}",
			outcome.matches, outcome.proportion
		)),
		Err(e) => HttpResponse::InternalServerError().body(e),
	}
}

/// HTTP GET endpoint `/v1/levels`
///
/// Per-tier diagnostics of the trained hierarchy: tier index, distinct
/// symbol count, and resulting sequence length.
#[get("/v1/levels")]
async fn get_levels(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Hierarchy lock failed"),
	};

	let hierarchy = match &shared_data.hierarchy {
		Some(h) => h,
		None => return HttpResponse::BadRequest().body("No hierarchy trained"),
	};

	let lines: Vec<String> = hierarchy
		.levels()
		.iter()
		.enumerate()
		.map(|(stage, level)| {
			format!(
				"stage {}: {} symbols, sequence of {}",
				stage,
				level.symbols().len(),
				level.segmented().len()
			)
		})
		.collect();

	HttpResponse::Ok().body(lines.join("\n"))
}

#[get("/v1/models")]
async fn get_models() -> impl Responder {
	match list_files("./data", "txt") {
		Ok(files) => HttpResponse::Ok().body(files.join("\n").replace(".txt", "")),
		Err(_) => HttpResponse::InternalServerError().body("Failed to list corpora"),
	}
}

/// Main entry point for the server.
///
/// Wraps an initially empty hierarchy slot in a `Mutex` for thread safety
/// and starts an Actix-web HTTP server.
///
/// # Notes
/// - The server binds to 127.0.0.1:5000.
/// - Corpora are read from `./data/<name>.txt`.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();

	let shared_data = SharedData { hierarchy: None };
	let shared_model = web::Data::new(Mutex::new(shared_data));

	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_model.clone())
			.service(put_train)
			.service(get_predict)
			.service(get_evaluate)
			.service(get_levels)
			.service(get_models)
	})
		.bind(("127.0.0.1", 5000))?
		.run()
		.await
}

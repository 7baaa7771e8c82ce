use std::env;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use actix_cors::Cors;
use actix_web::{get, middleware, put, web, App, HttpResponse, HttpServer, Responder};

use log::{info, warn};
use serde::Deserialize;
use name_gen_core::io::list_files;
use name_gen_core::model::{GenerationInput, Generator, RngSource, StartSeed, WalkEnd};
use name_gen_core::Error;

const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_BIND: &str = "127.0.0.1:5000";
const DEFAULT_NGRAM_SIZE: usize = 2;
const MAX_NB_TRY: usize = 1000;

/// Struct representing query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	nb_try: Option<usize>,
	max_tokens: Option<usize>,
	walk_end: Option<WalkEnd>,
	seed: Option<String> // uppercase, any or token:<word>
}

#[derive(Deserialize)]
struct CorpusQuery {
	names: Option<String>,
	ngram_size: Option<usize>
}

/// Server settings, read once from the environment.
struct Settings {
	data_dir: PathBuf,
	bind: String,
	ngram_size: usize
}

impl Settings {
	/// Reads `NAME_GEN_DATA_DIR`, `NAME_GEN_BIND` and `NAME_GEN_NGRAM`.
	fn from_env() -> Result<Self, String> {
		let ngram_size = match env::var("NAME_GEN_NGRAM") {
			Ok(value) => value.parse::<usize>().map_err(|_| format!("NAME_GEN_NGRAM must be an integer, got {value}"))?,
			Err(_) => DEFAULT_NGRAM_SIZE,
		};
		Ok(Self {
			data_dir: env::var("NAME_GEN_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_owned()).into(),
			bind: env::var("NAME_GEN_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_owned()),
			ngram_size
		})
	}
}

struct SharedData {
	data_dir: PathBuf,
	generator: RwLock<Generator>
}

impl GenerateParams {
	/// Determines the start prefix strategy.
	fn start_seed(&self) -> Result<StartSeed, String> {
		match &self.seed {
			None => Ok(StartSeed::Uppercase),
			Some(s) if s.eq_ignore_ascii_case("uppercase") => Ok(StartSeed::Uppercase),
			Some(s) if s.eq_ignore_ascii_case("any") => Ok(StartSeed::Any),
			Some(s) => match s.split_once(':') {
				Some((kind, value)) if kind.eq_ignore_ascii_case("token") => {
					if value.is_empty() {
						Err("Token seed cannot be empty".into())
					} else {
						Ok(StartSeed::Token(value.to_owned()))
					}
				}
				_ => Err("Seed must be 'uppercase', 'any' or start with 'token:'".into()),
			},
		}
	}

	/// Builds the generation input, validating every parameter.
	fn generation_input(&self) -> Result<GenerationInput, String> {
		let mut input = GenerationInput::default();
		if let Some(nb_try) = self.nb_try {
			if nb_try > MAX_NB_TRY {
				return Err(format!("nb_try must be at most {MAX_NB_TRY}"));
			}
			input.nb_try = nb_try;
		}
		if let Some(max_tokens) = self.max_tokens {
			input.set_max_tokens(max_tokens).map_err(|e| e.to_string())?;
		}
		if let Some(walk_end) = self.walk_end {
			input.walk_end = walk_end;
		}
		input.start_seed = self.start_seed()?;
		Ok(input)
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates one entry with the loaded corpora, based on query parameters.
/// Returns the entry as JSON: `{"name": ..., "description": ...}`.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<SharedData>, query: web::Query<GenerateParams>) -> impl Responder {
	let input = match query.generation_input() {
		Ok(input) => input,
		Err(e) => return HttpResponse::BadRequest().body(e)
	};

	let generator = match data.generator.read() {
		Ok(g) => g,
		Err(_) => return HttpResponse::InternalServerError().body("Generator lock failed"),
	};

	match generator.predict(&input, &mut RngSource::thread()) {
		Ok(entry) => HttpResponse::Ok().json(entry),
		Err(Error::NoValidStart) => HttpResponse::BadRequest().body(Error::NoValidStart.to_string()),
		Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
	}
}

/// Names of the corpora of `data_dir`: its `.dat` files without the extension.
fn corpus_names(data_dir: &Path) -> std::io::Result<Vec<String>> {
	let files = list_files(data_dir, "dat")?;
	Ok(files.iter().filter_map(|file| file.strip_suffix(".dat")).map(str::to_owned).collect())
}

/// Resolves comma-separated corpus names to their files. Only the corpora
/// listed in `data_dir` are accepted, so a name can never leave it.
fn corpus_paths(data_dir: &Path, names: &str) -> Result<Vec<PathBuf>, String> {
	let available = corpus_names(data_dir).map_err(|e| format!("Failed to list corpora: {e}"))?;
	names
		.split(',')
		.map(|s| s.trim())
		.filter(|s| !s.is_empty())
		.map(|name| {
			if available.iter().any(|known| known == name) {
				Ok(data_dir.join(format!("{name}.dat")))
			} else {
				Err(format!("Unknown corpus: {name}"))
			}
		})
		.collect()
}

#[get("/v1/corpora")]
async fn get_corpora(data: web::Data<SharedData>) -> impl Responder {
	match corpus_names(&data.data_dir) {
		Ok(names) => HttpResponse::Ok().body(names.join("\n")),
		Err(_) => HttpResponse::InternalServerError().body("Failed to list corpora")
	}
}

#[get("/v1/loaded_corpora")]
async fn get_loaded_corpora(data: web::Data<SharedData>) -> impl Responder {
	let generator = match data.generator.read() {
		Ok(g) => g,
		Err(_) => return HttpResponse::InternalServerError().body("Generator lock failed"),
	};
	HttpResponse::Ok().body(generator.corpus_names().join("\n"))
}

#[put("/v1/load_corpora")]
async fn put_corpora(data: web::Data<SharedData>, query: web::Query<CorpusQuery>) -> impl Responder {
	let query_names = match &query.names {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty corpus name"),
	};

	let ngram_size = match data.generator.read() {
		Ok(g) => query.ngram_size.unwrap_or(g.model().ngram_size()),
		Err(_) => return HttpResponse::InternalServerError().body("Generator lock failed"),
	};

	let paths = match corpus_paths(&data.data_dir, query_names) {
		Ok(paths) => paths,
		Err(e) => return HttpResponse::BadRequest().body(e),
	};

	// Build outside the lock: generation keeps running meanwhile
	let generator = match Generator::from_files(&paths, ngram_size) {
		Ok(g) => g,
		Err(e @ Error::InvalidNgramSize(_)) => return HttpResponse::BadRequest().body(e.to_string()),
		Err(e) => return HttpResponse::InternalServerError().body(format!("Failed to load corpora: {e}"))
	};

	match data.generator.write() {
		Ok(mut shared) => *shared = generator,
		Err(_) => return HttpResponse::InternalServerError().body("Generator lock failed"),
	}
	info!("loaded corpora {query_names} with ngram size {ngram_size}");

	HttpResponse::Ok().body("Corpora loaded successfully")
}

/// Main entry point for the server.
///
/// Loads every corpus of the data directory, wraps the generator in a
/// `RwLock` (generation only needs read access) and starts an Actix-web
/// HTTP server.
///
/// # Notes
/// - `NAME_GEN_DATA_DIR` (default `./data`) holds the `.dat` corpora.
/// - `NAME_GEN_BIND` (default `127.0.0.1:5000`) is the listen address.
/// - `NAME_GEN_NGRAM` (default 2) is the initial n-gram size.
/// - Starts with an empty generator if the data directory has no corpus.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let settings = Settings::from_env().map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
	let invalid = |e: Error| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string());

	let generator = match Generator::from_directory(&settings.data_dir, settings.ngram_size) {
		Ok(g) => g,
		Err(Error::InvalidInput(reason)) => {
			warn!("starting without corpus: {reason}");
			Generator::empty(settings.ngram_size).map_err(invalid)?
		}
		Err(e) => return Err(invalid(e)),
	};
	info!("serving corpora {:?} on {}", generator.corpus_names(), settings.bind);

	let shared_data = web::Data::new(SharedData {
		data_dir: settings.data_dir,
		generator: RwLock::new(generator),
	});

	HttpServer::new(move || {
		App::new()
			.wrap(middleware::Logger::default())
			.wrap(Cors::permissive())
			.app_data(shared_data.clone())
			.service(get_generated)
			.service(get_corpora)
			.service(put_corpora)
			.service(get_loaded_corpora)
	})
		.bind(settings.bind)?
		.run()
		.await
}

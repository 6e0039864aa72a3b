use actix_web::{App, HttpResponse, HttpServer, Responder, web};
use bounce_parser::{classify, parse_email};
use env_logger::Env;
use serde::Deserialize;

#[derive(Deserialize)]
struct ClassifyRequest {
    raw_email: String, // full RFC 5322 bounce message
}

async fn classify_bounce(req: web::Json<ClassifyRequest>) -> impl Responder {
    let parsed = match parse_email(req.raw_email.as_bytes()) {
        Ok(p) => p,
        Err(e) => return HttpResponse::BadRequest().body(format!("Failed to parse email: {}", e)),
    };

    let record = classify(&parsed);
    log::info!(
        "Classified bounce: server={} outcome={}",
        record.handling_server(),
        record.outcome()
    );
    HttpResponse::Ok().json(record)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    log::info!("Starting Bounce Classification Service");

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Binding to {}:{}", host, port);

    HttpServer::new(|| {
        App::new()
            .route("/classify", web::post().to(classify_bounce))
            .wrap(actix_web::middleware::Logger::default())
    })
        .workers(num_cpus::get())
        .keep_alive(std::time::Duration::from_secs(75))
        .max_connections(1_000)
        .bind((host.as_str(), port))?
        .run()
        .await
}
